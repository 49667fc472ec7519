//! # Presentation Formatting
//!
//! Small helpers for the values the core hands to the presenter.

/// Formats the round countdown: `m:ss` above one minute, bare seconds
/// below.
///
/// The displayed value rounds up so a freshly started 60-second round
/// never flashes `59`.
///
/// # Examples
///
/// ```
/// use forage::utils::format_countdown;
///
/// assert_eq!(format_countdown(65.0), "1:06");
/// assert_eq!(format_countdown(59.2), "1:00");
/// assert_eq!(format_countdown(58.9), "59s");
/// assert_eq!(format_countdown(0.4), "1s");
/// ```
pub fn format_countdown(time_left: f32) -> String {
    let total = time_left.max(0.0) as i32 + 1;
    let minutes = total / 60;
    let seconds = total % 60;
    if minutes > 0 {
        format!("{minutes}:{seconds:02}")
    } else {
        format!("{seconds}s")
    }
}

/// Abbreviates a score for display: `987`, `1.2k`, `3.4M`.
///
/// # Examples
///
/// ```
/// use forage::utils::abbreviate;
///
/// assert_eq!(abbreviate(987.0), "987");
/// assert_eq!(abbreviate(1234.0), "1.2k");
/// assert_eq!(abbreviate(2000.0), "2k");
/// assert_eq!(abbreviate(3_400_000.0), "3.4M");
/// ```
pub fn abbreviate(value: f32) -> String {
    let value = value as i64;
    if value >= 1_000_000 {
        trim_decimal(value as f64 / 1_000_000.0, "M")
    } else if value >= 1_000 {
        trim_decimal(value as f64 / 1_000.0, "k")
    } else {
        value.to_string()
    }
}

fn trim_decimal(value: f64, suffix: &str) -> String {
    // One decimal place, dropped when it is zero: 2.0k renders as 2k.
    let scaled = (value * 10.0).floor() / 10.0;
    if scaled.fract() == 0.0 {
        format!("{}{suffix}", scaled as i64)
    } else {
        format!("{scaled:.1}{suffix}")
    }
}
