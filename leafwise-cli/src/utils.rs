//! Common helpers shared across CLI commands.

use chrono::{DateTime, Utc};
use colored::{ColoredString, Colorize};

/// Format a timestamp as a human-readable UTC string.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Render a confidence score as a colored percentage.
///
/// Green at 80% and above, yellow at 50%, red below.
pub fn format_confidence(score: f32) -> ColoredString {
    let percent = format!("{}%", (score * 100.0).round() as u32);
    if score >= 0.8 {
        percent.green()
    } else if score >= 0.5 {
        percent.yellow()
    } else {
        percent.red()
    }
}
