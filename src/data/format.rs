use chrono::{DateTime, Local, Utc};

/// Format a latency in seconds for display.
///
/// Sub-second values render as whole milliseconds, anything else as seconds
/// with two decimals.
pub fn format_latency(seconds: f64) -> String {
    if seconds < 1.0 {
        format!("{}ms", (seconds * 1000.0).round() as u64)
    } else {
        format!("{:.2}s", seconds)
    }
}

/// Format an uptime percentage (already rounded to one decimal).
pub fn format_uptime(pct: f64) -> String {
    format!("{:.1}%", pct)
}

/// Format a timestamp as local wall-clock time, e.g. "14:05".
pub fn format_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M").to_string()
}

/// Format a timestamp as a short local date and time, e.g. "Mar 1, 14:05".
pub fn format_date(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%b %-d, %H:%M").to_string()
}
