use crate::args::OutputFormat;
use crate::error::AppResult;
use crate::metrics::{AggregateSummary, summary_lines};

/// Prints a summary as text lines or as a single JSON line.
pub(crate) fn print_summary(summary: &AggregateSummary, format: OutputFormat) -> AppResult<()> {
    match format {
        OutputFormat::Text => {
            for line in summary_lines(summary) {
                println!("{}", line);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(summary)?),
    }
    Ok(())
}
