//! Activation window parsing and formatting.
//!
//! Accepted forms: `""` (default), a bare integer meaning whole hours
//! (`"3"` is 180 minutes), or unit-suffixed parts such as `"1h30m"`,
//! `"1.5h"`, `"90m"`. Units are case-insensitive and spaces are ignored.

use crate::error::PimError;

pub const DEFAULT_MINUTES: u32 = 60;
pub const MIN_MINUTES: u32 = 30;
pub const MAX_MINUTES: u32 = 480;
pub const STEP_MINUTES: u32 = 30;

/// Parse duration text into minutes.
pub fn parse_duration(text: &str) -> Result<u32, PimError> {
    let input = text.trim();
    if input.is_empty() {
        return Ok(DEFAULT_MINUTES);
    }

    let has_unit = input.chars().any(|c| matches!(c, 'h' | 'H' | 'm' | 'M'));
    if !has_unit {
        if let Ok(hours) = input.parse::<i64>() {
            if hours <= 0 {
                return Err(invalid(text, "duration must be positive"));
            }
            return u32::try_from(hours * 60).map_err(|_| invalid(text, "duration is too large"));
        }
    }

    let mut total = 0.0_f64;
    let mut buffer = String::new();

    for c in input.chars() {
        match c {
            ' ' => continue,
            '0'..='9' => buffer.push(c),
            '.' => {
                if buffer.contains('.') {
                    return Err(invalid(text, "more than one decimal point"));
                }
                buffer.push(c);
            }
            'h' | 'H' | 'm' | 'M' => {
                if buffer.is_empty() {
                    return Err(invalid(text, "unit without a number"));
                }
                let value: f64 = buffer
                    .parse()
                    .map_err(|_| invalid(text, "malformed number"))?;
                total += if c.eq_ignore_ascii_case(&'h') { value * 60.0 } else { value };
                buffer.clear();
            }
            other => {
                return Err(invalid(text, &format!("unexpected character '{}'", other)));
            }
        }
    }

    if !buffer.is_empty() {
        return Err(invalid(text, "number without a unit (use h or m)"));
    }
    let minutes = total.round();
    if minutes <= 0.0 {
        return Err(invalid(text, "duration must be at least one minute"));
    }
    if minutes > f64::from(u32::MAX) {
        return Err(invalid(text, "duration is too large"));
    }

    Ok(minutes as u32)
}

fn invalid(text: &str, reason: &str) -> PimError {
    PimError::validation(format!("invalid duration {:?}: {}", text, reason))
}

/// Strict check for operator-supplied durations: within range and an exact
/// multiple of the step.
pub fn validate_minutes(minutes: u32) -> Result<u32, PimError> {
    if !(MIN_MINUTES..=MAX_MINUTES).contains(&minutes) {
        return Err(PimError::validation(format!(
            "duration must be between {} and {}",
            format_minutes(MIN_MINUTES),
            format_minutes(MAX_MINUTES)
        )));
    }
    if minutes % STEP_MINUTES != 0 {
        return Err(PimError::validation(format!(
            "duration must be a multiple of {} minutes (got {})",
            STEP_MINUTES, minutes
        )));
    }
    Ok(minutes)
}

/// Lenient normalization for internally chosen defaults: rounded to the
/// nearest step and clamped into range.
pub fn normalize_default(minutes: u32) -> u32 {
    let clamped = minutes.clamp(MIN_MINUTES, MAX_MINUTES);
    let rounded = (clamped + STEP_MINUTES / 2) / STEP_MINUTES * STEP_MINUTES;
    rounded.clamp(MIN_MINUTES, MAX_MINUTES)
}

/// Human-readable form, e.g. "1 hour(s) 30 minute(s)".
pub fn format_minutes(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    match (hours, mins) {
        (h, 0) => format!("{} hour(s)", h),
        (0, m) => format!("{} minute(s)", m),
        (h, m) => format!("{} hour(s) {} minute(s)", h, m),
    }
}

/// ISO-8601 duration as used by schedule expirations, e.g. "PT1H30M".
pub fn iso8601(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    match (hours, mins) {
        (0, m) => format!("PT{}M", m),
        (h, 0) => format!("PT{}H", h),
        (h, m) => format!("PT{}H{}M", h, m),
    }
}
