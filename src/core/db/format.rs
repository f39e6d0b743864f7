//! Display formatting for database sizes and durations
//!
//! Byte counts are shown with exactly two decimals. Ties round up (`0.125`
//! becomes `0.13`), which is what browser clients display for the same value.
//! Hour conversion truncates instead of rounding.

const BYTES_PER_KB: f64 = 1024.0;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Format `value` with two decimals, rounding ties away from zero
///
/// # Examples
/// - `1.0` → `"1.00"`
/// - `1.4305114746` → `"1.43"`
/// - `0.125` → `"0.13"`
pub fn fixed_two(value: f64) -> String {
    if !value.is_finite() {
        return if value.is_nan() {
            "NaN".to_string()
        } else if value > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        };
    }

    let negative = value < 0.0;
    let scaled = value.abs() * 100.0;
    let whole = scaled.floor();
    let hundredths = if scaled - whole >= 0.5 { whole + 1.0 } else { whole };

    let hundredths = hundredths as u128;
    let sign = if negative && hundredths != 0 { "-" } else { "" };
    format!("{}{}.{:02}", sign, hundredths / 100, hundredths % 100)
}

/// Bytes → `"<n.nn> MB"` (divisor 1,048,576)
///
/// # Examples
/// - `1_048_576` → `"1.00 MB"`
/// - `1_500_000` → `"1.43 MB"`
pub fn megabytes(bytes: f64) -> String {
    format!("{} MB", fixed_two(bytes / BYTES_PER_MB))
}

/// Bytes → `"<n.nn> KB"` (divisor 1024)
pub fn kilobytes(bytes: f64) -> String {
    format!("{} KB", fixed_two(bytes / BYTES_PER_KB))
}

/// Seconds → `"<h> hours"`, truncating partial hours
///
/// `7384` seconds is `"2 hours"`, not `2.05`.
pub fn uptime_hours(seconds: f64) -> String {
    format!("{} hours", (seconds / SECONDS_PER_HOUR).floor() as i64)
}

/// Already-in-megabytes value with the literal suffix, number printed as-is
pub fn with_mb_suffix(value: &serde_json::Number) -> String {
    format!("{} MB", value)
}
