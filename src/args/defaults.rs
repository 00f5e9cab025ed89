use std::time::Duration;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("hpstress/", env!("CARGO_PKG_VERSION"));

/// Directory holding `<url> <count>` target files.
pub(crate) const DEFAULT_TARGETS_DIR: &str = "executable";

/// Ramp increments, coarse to fine.
pub(crate) const DEFAULT_STEPS: [u64; 5] = [100, 50, 10, 5, 1];

/// Idle connections kept per host in keep-alive mode.
pub(crate) const DEFAULT_POOL_MAX_IDLE_PER_HOST: usize = 10;

/// How long an idle keep-alive connection may be reused.
pub(crate) const DEFAULT_POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Config filenames checked when `--config` is not given.
pub(crate) const DEFAULT_CONFIG_FILES: [&str; 2] = ["hpstress.toml", "hpstress.json"];
