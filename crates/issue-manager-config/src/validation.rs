//! Configuration validation

use crate::schema::{RawConfig, RawDuration, RawPolicy};
use crate::{DEFAULT_DELAY_SECS, DEFAULT_REMINDER_DELAY_SECS};
use chrono::TimeDelta;
use issue_manager_util::format_delay;
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Policy '{keyword}': {message}")]
    PolicyError { keyword: String, message: String },

    #[error("Invalid duration '{value}' for policy '{keyword}': {message}")]
    InvalidDuration {
        keyword: String,
        value: String,
        message: String,
    },

    #[error("Reminder delay {reminder} >= close delay {delay} for policy '{keyword}'")]
    ReminderExceedsDelay {
        keyword: String,
        reminder: String,
        delay: String,
    },

    #[error("Global config error: {0}")]
    GlobalError(String),
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.policies.is_empty() {
        errors.push(ValidationError::GlobalError(
            "no keyword policies configured".into(),
        ));
    }

    for (keyword, policy) in &config.policies {
        errors.extend(validate_policy(keyword, policy));
    }

    errors
}

fn validate_policy(keyword: &str, policy: &RawPolicy) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if keyword.trim().is_empty() {
        errors.push(ValidationError::PolicyError {
            keyword: keyword.to_string(),
            message: "keyword cannot be empty".into(),
        });
    }

    if let Some(message) = &policy.message
        && message.trim().is_empty()
    {
        errors.push(ValidationError::PolicyError {
            keyword: keyword.to_string(),
            message: "message cannot be empty".into(),
        });
    }

    if policy.users.iter().any(|u| u.trim().is_empty()) {
        errors.push(ValidationError::PolicyError {
            keyword: keyword.to_string(),
            message: "users cannot contain empty logins".into(),
        });
    }

    let delay = match checked_delay(keyword, policy.delay.as_ref(), DEFAULT_DELAY_SECS) {
        Ok(d) => Some(d),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    let Some(reminder) = &policy.reminder else {
        return errors;
    };

    if let Some(message) = &reminder.message
        && message.trim().is_empty()
    {
        errors.push(ValidationError::PolicyError {
            keyword: keyword.to_string(),
            message: "reminder message cannot be empty".into(),
        });
    }

    let reminder_delay = match checked_delay(
        keyword,
        reminder.delay.as_ref(),
        DEFAULT_REMINDER_DELAY_SECS,
    ) {
        Ok(d) => Some(d),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    // A reminder scheduled at or before the label was applied would never
    // precede the close.
    if let (Some(delay), Some(reminder_delay)) = (delay, reminder_delay)
        && reminder_delay >= delay
    {
        errors.push(ValidationError::ReminderExceedsDelay {
            keyword: keyword.to_string(),
            reminder: format_delay(reminder_delay),
            delay: format_delay(delay),
        });
    }

    errors
}

/// Longest accepted delay, about 100 years
pub const MAX_DELAY_DAYS: i64 = 36_500;

fn checked_delay(
    keyword: &str,
    raw: Option<&RawDuration>,
    default_secs: i64,
) -> Result<TimeDelta, ValidationError> {
    let Some(raw) = raw else {
        return Ok(TimeDelta::seconds(default_secs));
    };

    let delay = parse_duration(raw).map_err(|message| ValidationError::InvalidDuration {
        keyword: keyword.to_string(),
        value: raw.to_string(),
        message,
    })?;

    if delay <= TimeDelta::zero() {
        return Err(ValidationError::InvalidDuration {
            keyword: keyword.to_string(),
            value: raw.to_string(),
            message: "duration must be positive".into(),
        });
    }

    if delay > TimeDelta::days(MAX_DELAY_DAYS) {
        return Err(ValidationError::InvalidDuration {
            keyword: keyword.to_string(),
            value: raw.to_string(),
            message: format!("duration must not exceed {} days", MAX_DELAY_DAYS),
        });
    }

    Ok(delay)
}

/// Parse a configured duration
pub fn parse_duration(raw: &RawDuration) -> Result<TimeDelta, String> {
    match raw {
        RawDuration::Seconds(secs) => i64::try_from(*secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(|| "Duration out of range".to_string()),
        RawDuration::Fractional(secs) => seconds_to_delta(*secs),
        RawDuration::Text(text) => parse_duration_str(text),
    }
}

/// Parse ISO-8601 (`P1DT2H`) or `[N day[s][,]] [[HH:]MM:]SS`
pub fn parse_duration_str(s: &str) -> Result<TimeDelta, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Empty duration".into());
    }

    if s.starts_with(['P', 'p']) {
        parse_iso8601(&s[1..])
    } else {
        parse_clock(s)
    }
}

fn parse_iso8601(body: &str) -> Result<TimeDelta, String> {
    if body.is_empty() {
        return Err("ISO-8601 duration has no components".into());
    }

    let (date_part, time_part) = match body.split_once(['T', 't']) {
        Some((date, time)) => {
            if time.is_empty() {
                return Err("ISO-8601 duration has an empty time part".into());
            }
            (date, Some(time))
        }
        None => (body, None),
    };

    let mut total_secs = 0.0_f64;
    for (value, unit) in split_units(date_part)? {
        total_secs += value
            * match unit {
                'W' => 7.0 * 86_400.0,
                'D' => 86_400.0,
                'Y' | 'M' => return Err("Years and months are not supported".into()),
                other => return Err(format!("Unknown date unit '{}'", other)),
            };
    }

    if let Some(time) = time_part {
        for (value, unit) in split_units(time)? {
            total_secs += value
                * match unit {
                    'H' => 3600.0,
                    'M' => 60.0,
                    'S' => 1.0,
                    other => return Err(format!("Unknown time unit '{}'", other)),
                };
        }
    }

    seconds_to_delta(total_secs)
}

fn split_units(s: &str) -> Result<Vec<(f64, char)>, String> {
    let mut units = Vec::new();
    let mut number = String::new();

    for c in s.chars() {
        if c.is_ascii_digit() || c == '.' {
            number.push(c);
            continue;
        }
        if number.is_empty() {
            return Err(format!("Missing value before '{}'", c));
        }
        let value: f64 = number
            .parse()
            .map_err(|_| format!("Invalid number '{}'", number))?;
        units.push((value, c.to_ascii_uppercase()));
        number.clear();
    }

    if !number.is_empty() {
        return Err(format!("Value '{}' has no unit", number));
    }

    Ok(units)
}

fn parse_clock(s: &str) -> Result<TimeDelta, String> {
    let (days, rest) = match s.find("day") {
        Some(idx) => {
            let days: u32 = s[..idx]
                .trim()
                .parse()
                .map_err(|_| "Invalid day count".to_string())?;
            let rest = s[idx..]
                .trim_start_matches("days")
                .trim_start_matches("day")
                .trim_start_matches(',')
                .trim();
            (days, rest)
        }
        None => (0, s),
    };

    let mut secs = f64::from(days) * 86_400.0;
    if rest.is_empty() {
        return seconds_to_delta(secs);
    }

    let parts: Vec<&str> = rest.split(':').collect();
    if parts.len() > 3 {
        return Err("Expected [[HH:]MM:]SS".into());
    }

    let multipliers = [1.0, 60.0, 3600.0];
    for (part, multiplier) in parts.iter().rev().zip(multipliers) {
        let value: f64 = part
            .trim()
            .parse()
            .map_err(|_| format!("Invalid time component '{}'", part))?;
        if value.is_sign_negative() {
            return Err("Negative time component".into());
        }
        secs += value * multiplier;
    }

    seconds_to_delta(secs)
}

fn seconds_to_delta(secs: f64) -> Result<TimeDelta, String> {
    if !secs.is_finite() || secs < 0.0 {
        return Err("Duration must be a finite, non-negative number of seconds".into());
    }
    let millis = (secs * 1000.0).round();
    if millis > i64::MAX as f64 {
        return Err("Duration out of range".into());
    }
    TimeDelta::try_milliseconds(millis as i64).ok_or_else(|| "Duration out of range".into())
}
