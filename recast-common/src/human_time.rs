//! Human-readable time formatting
//!
//! Consistent clock-style display for schedule listings and progress
//! readouts. Durations under an hour render as `M:SS`, longer ones as
//! `H:MM:SS`.

/// Format a duration in seconds as `M:SS` or `H:MM:SS`.
///
/// Fractional seconds are truncated. Negative inputs (clock skew, probe
/// artifacts) are prefixed with a minus sign.
pub fn format_clock(seconds: f64) -> String {
    let is_negative = seconds < 0.0;
    let total = seconds.abs() as i64;

    let hours = total / 3600;
    let mins = (total % 3600) / 60;
    let secs = total % 60;

    let formatted = if hours > 0 {
        format!("{}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{}:{:02}", mins, secs)
    };

    if is_negative {
        format!("-{}", formatted)
    } else {
        formatted
    }
}

/// Format an optional duration, rendering unknown values as `--:--`.
pub fn format_clock_opt(seconds: Option<f64>) -> String {
    match seconds {
        Some(secs) => format_clock(secs),
        None => "--:--".to_string(),
    }
}
