use url::Url;

use crate::args::PositiveU64;
use crate::error::{InputError, LineError};

const HTTP_PREFIX: &str = "http://";
const HTTPS_PREFIX: &str = "https://";

/// Ensures the URL carries an `http://` or `https://` scheme, prefixing
/// `http://` otherwise. Already-normalized input is returned unchanged.
#[must_use]
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if has_scheme(trimmed, HTTP_PREFIX) || has_scheme(trimmed, HTTPS_PREFIX) {
        return trimmed.to_owned();
    }
    format!("{}{}", HTTP_PREFIX, trimmed)
}

fn has_scheme(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// One URL plus the number of requests to send to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    url: String,
    parsed: Url,
    repeat_count: PositiveU64,
}

impl Target {
    /// Normalizes and validates `raw_url`.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is empty, unparsable or has no host.
    pub fn new(raw_url: &str, repeat_count: PositiveU64) -> Result<Self, InputError> {
        if raw_url.trim().is_empty() {
            return Err(InputError::EmptyUrl);
        }
        let url = normalize_url(raw_url);
        let parsed = Url::parse(&url).map_err(|err| InputError::InvalidUrl {
            url: url.clone(),
            source: err,
        })?;
        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(InputError::UrlMissingHost { url });
        }
        Ok(Self {
            url,
            parsed,
            repeat_count,
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub const fn parsed_url(&self) -> &Url {
        &self.parsed
    }

    #[must_use]
    pub const fn repeat_count(&self) -> u64 {
        self.repeat_count.get()
    }
}

/// Parses a `<url> <repeatCount>` line.
///
/// # Errors
///
/// Returns an error when the count is missing, not a number, not positive, or
/// when the URL is invalid.
pub fn parse_target_line(line: &str) -> Result<Target, InputError> {
    let trimmed = line.trim();
    let Some((url, count)) = trimmed.split_once(char::is_whitespace) else {
        return Err(InputError::MissingRepeatCount {
            content: trimmed.to_owned(),
        });
    };
    let count = count.trim();
    let repeat_count = match count.parse::<u64>() {
        Ok(value) => PositiveU64::try_from(value).map_err(|_err| {
            InputError::NonPositiveRepeatCount {
                value: count.to_owned(),
            }
        })?,
        Err(_) if count.parse::<i64>().is_ok_and(|value| value <= 0) => {
            return Err(InputError::NonPositiveRepeatCount {
                value: count.to_owned(),
            });
        }
        Err(err) => {
            return Err(InputError::InvalidRepeatCount {
                value: count.to_owned(),
                source: err,
            });
        }
    };
    Target::new(url, repeat_count)
}

/// Targets parsed from a file plus the lines that were skipped.
#[derive(Debug, Default)]
pub struct ParsedTargets {
    pub targets: Vec<Target>,
    pub errors: Vec<LineError>,
}

/// Parses every line of a target file. Blank lines and `#` comments are
/// ignored; a bad line is recorded and parsing continues.
#[must_use]
pub fn parse_target_lines(content: &str) -> ParsedTargets {
    let mut parsed = ParsedTargets::default();
    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match parse_target_line(trimmed) {
            Ok(target) => parsed.targets.push(target),
            Err(err) => parsed.errors.push(err.at_line(idx.saturating_add(1))),
        }
    }
    parsed
}
