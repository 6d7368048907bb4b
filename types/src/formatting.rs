//! Timer display formatting.
//!
//! Stopwatch, countdown and marathon overlays all render their clock through
//! this module so every frontend shows the same text.

const SECOND: i64 = 1_000;
const MINUTE: i64 = 60 * SECOND;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Format milliseconds as `[Dd ]HH:MM:SS[.mmm]`.
///
/// Negative values are clamped to zero. Days are only shown when non-zero.
///
/// # Examples
/// ```
/// use alertcast_types::formatting::format_clock;
/// assert_eq!(format_clock(0, false), "00:00:00");
/// assert_eq!(format_clock(61_500, true), "00:01:01.500");
/// assert_eq!(format_clock(90_061_000, false), "1d 01:01:01");
/// ```
pub fn format_clock(millis: i64, show_millis: bool) -> String {
    let millis = millis.max(0);
    let days = millis / DAY;
    let hours = (millis % DAY) / HOUR;
    let minutes = (millis % HOUR) / MINUTE;
    let seconds = (millis % MINUTE) / SECOND;
    let ms = millis % SECOND;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{}d ", days));
    }
    out.push_str(&format!("{:02}:{:02}:{:02}", hours, minutes, seconds));
    if show_millis {
        out.push_str(&format!(".{:03}", ms));
    }
    out
}
