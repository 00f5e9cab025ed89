use std::time::Duration;

use super::types::{PositiveU64, PositiveUsize, StepSequence};
use crate::error::{AppError, AppResult, ValidationError};

pub(crate) fn parse_header(s: &str) -> Result<(String, String), ValidationError> {
    match s.split_once(':') {
        Some((key, value)) => Ok((key.trim().to_owned(), value.trim().to_owned())),
        None => Err(ValidationError::InvalidHeaderFormat {
            value: s.to_owned(),
        }),
    }
}

pub(super) fn parse_positive_u64(s: &str) -> AppResult<PositiveU64> {
    s.parse::<PositiveU64>().map_err(AppError::from)
}

pub(super) fn parse_positive_usize(s: &str) -> AppResult<PositiveUsize> {
    s.parse::<PositiveUsize>().map_err(AppError::from)
}

pub(super) fn parse_step_sequence(s: &str) -> AppResult<StepSequence> {
    s.parse::<StepSequence>().map_err(AppError::from)
}

pub(crate) fn parse_duration_arg(s: &str) -> AppResult<Duration> {
    parse_duration(s).map_err(AppError::from)
}

/// Parses `<digits><unit>` where unit is `ms`, `s` (default), `m` or `h`.
pub(crate) fn parse_duration(s: &str) -> Result<Duration, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let digits_len = value.chars().take_while(char::is_ascii_digit).count();
    if digits_len == 0 {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 = num_part
        .parse()
        .map_err(|err| ValidationError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })?;

    let unit = if unit_part.is_empty() { "s" } else { unit_part };
    let duration = match unit {
        "ms" => Duration::from_millis(number),
        "s" => Duration::from_secs(number),
        "m" => {
            let secs = number
                .checked_mul(60)
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        "h" => {
            let secs = number
                .checked_mul(60)
                .and_then(|seconds| seconds.checked_mul(60))
                .ok_or(ValidationError::DurationOverflow)?;
            Duration::from_secs(secs)
        }
        _ => {
            return Err(ValidationError::InvalidDurationUnit {
                unit: unit.to_owned(),
            });
        }
    };

    if duration.is_zero() {
        return Err(ValidationError::DurationZero);
    }

    Ok(duration)
}
