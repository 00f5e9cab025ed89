//! Target parsing, URL normalization and target-file persistence.
mod store;
mod target;


pub use store::TargetStore;
pub use target::{ParsedTargets, Target, normalize_url, parse_target_line, parse_target_lines};
