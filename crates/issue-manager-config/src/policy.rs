//! Validated policy structures

use crate::schema::{RawConfig, RawDuration, RawPolicy, RawReminder};
use crate::validation::parse_duration;
use crate::{
    DEFAULT_CLOSE_MESSAGE, DEFAULT_DELAY_SECS, DEFAULT_REMINDER_DELAY_SECS,
    DEFAULT_REMINDER_MESSAGE,
};
use chrono::TimeDelta;
use issue_manager_util::Keyword;

/// Validated policy set ready for use by the decision engine.
///
/// Policies keep the order they were configured in.
#[derive(Debug, Clone, Default)]
pub struct PolicySet {
    pub policies: Vec<KeywordPolicy>,
}

impl PolicySet {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        let policies = raw
            .policies
            .into_iter()
            .map(|(keyword, policy)| KeywordPolicy::from_raw(keyword, policy))
            .collect();

        Self { policies }
    }

    /// Get policy by keyword
    pub fn get(&self, keyword: &str) -> Option<&KeywordPolicy> {
        self.policies.iter().find(|p| p.keyword.as_str() == keyword)
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeywordPolicy> {
        self.policies.iter()
    }

    pub fn keywords(&self) -> impl Iterator<Item = &Keyword> {
        self.policies.iter().map(|p| &p.keyword)
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

/// Rule applied to issues carrying one label
#[derive(Debug, Clone)]
pub struct KeywordPolicy {
    pub keyword: Keyword,
    /// Inactivity required before closing
    pub delay: TimeDelta,
    /// Posted verbatim when closing
    pub message: String,
    pub remove_label_on_comment: bool,
    pub remove_label_on_close: bool,
    pub reminder: Option<ReminderPolicy>,
    /// Logins (besides the repository owner) allowed to close by directive comment
    pub users: Vec<String>,
}

impl KeywordPolicy {
    /// A policy with default settings for `keyword`
    pub fn new(keyword: impl Into<Keyword>) -> Self {
        Self::from_raw(keyword.into().to_string(), RawPolicy::default())
    }

    fn from_raw(keyword: String, raw: RawPolicy) -> Self {
        Self {
            keyword: Keyword::new(keyword),
            delay: convert_delay(raw.delay.as_ref(), DEFAULT_DELAY_SECS),
            message: raw
                .message
                .unwrap_or_else(|| DEFAULT_CLOSE_MESSAGE.to_string()),
            remove_label_on_comment: raw.remove_label_on_comment.unwrap_or(true),
            remove_label_on_close: raw.remove_label_on_close.unwrap_or(false),
            reminder: raw.reminder.map(convert_reminder),
            users: raw.users,
        }
    }

    /// Marker that, placed in a comment by an allowed user, asks for a close
    pub fn directive(&self) -> String {
        format!("<!-- issue-manager: {} -->", self.keyword)
    }
}

/// Reminder posted ahead of the scheduled close
#[derive(Debug, Clone)]
pub struct ReminderPolicy {
    /// Lead time before the scheduled close
    pub delay: TimeDelta,
    pub message: String,
}

// Conversion helpers

fn convert_delay(raw: Option<&RawDuration>, default_secs: i64) -> TimeDelta {
    raw.and_then(|d| parse_duration(d).ok())
        .unwrap_or_else(|| TimeDelta::seconds(default_secs))
}

fn convert_reminder(raw: RawReminder) -> ReminderPolicy {
    ReminderPolicy {
        delay: convert_delay(raw.delay.as_ref(), DEFAULT_REMINDER_DELAY_SECS),
        message: raw
            .message
            .unwrap_or_else(|| DEFAULT_REMINDER_MESSAGE.to_string()),
    }
}
