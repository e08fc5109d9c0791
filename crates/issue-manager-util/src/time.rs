//! Time utilities for issue-manager
//!
//! All decisions are made against UTC wall-clock time.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `ISSUE_MANAGER_MOCK_TIME` environment variable can be
//! set to override the current time. This is useful for dry-running a policy
//! set against a repository as if it were a later date.
//!
//! Format: RFC 3339 (e.g., `2025-12-25T14:30:00Z`)
//!
//! Example:
//! ```bash
//! ISSUE_MANAGER_MOCK_TIME="2025-12-25T14:30:00Z" issue-manager --dry-run
//! ```

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::OnceLock;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "ISSUE_MANAGER_MOCK_TIME";

/// Offset between mock time and real time at process start, so mock time
/// advances naturally.
static MOCK_TIME_OFFSET: OnceLock<Option<TimeDelta>> = OnceLock::new();

#[allow(clippy::disallowed_methods)] // Wraps Utc::now()
fn get_mock_time_offset() -> Option<TimeDelta> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                match parse_mock_time(&mock_time_str) {
                    Some(mock_dt) => {
                        let offset = mock_dt.signed_duration_since(Utc::now());
                        tracing::info!(
                            mock_time = %mock_time_str,
                            offset_secs = offset.num_seconds(),
                            "Mock time enabled"
                        );
                        return Some(offset);
                    }
                    None => {
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            expected_format = "RFC 3339",
                            "Invalid mock time format"
                        );
                    }
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

fn parse_mock_time(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current UTC time, respecting mock time settings in debug builds.
#[allow(clippy::disallowed_methods)] // The wrapper that provides mock time support
pub fn now() -> DateTime<Utc> {
    let real_now = Utc::now();

    if let Some(offset) = get_mock_time_offset() {
        real_now + offset
    } else {
        real_now
    }
}

/// Format a delay in human-readable form for logs
pub fn format_delay(d: TimeDelta) -> String {
    let total_secs = d.num_seconds();
    let sign = if total_secs < 0 { "-" } else { "" };
    let total_secs = total_secs.unsigned_abs();
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if days > 0 {
        format!("{sign}{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{sign}{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{sign}{}m {}s", minutes, seconds)
    } else {
        format!("{sign}{}s", seconds)
    }
}
