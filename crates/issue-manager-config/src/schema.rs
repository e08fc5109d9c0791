//! Raw configuration schema (as parsed from JSON or TOML)

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Raw configuration: a mapping from keyword (label name) to policy.
///
/// Key order is preserved; it decides which policy wins when an issue
/// carries more than one configured label.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawConfig {
    /// Schema pointer for editor tooling, never a policy
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Policies keyed by keyword
    #[serde(flatten)]
    pub policies: IndexMap<String, RawPolicy>,
}

/// Raw policy for one keyword
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawPolicy {
    /// Time without activity before closing (default: 10 days)
    #[serde(default)]
    pub delay: Option<RawDuration>,

    /// Comment posted when closing
    #[serde(default)]
    pub message: Option<String>,

    /// Remove the label when someone comments after it was added (default: true)
    #[serde(default, alias = "removeLabelOnComment", alias = "remove_label")]
    pub remove_label_on_comment: Option<bool>,

    /// Remove the label when closing (default: false)
    #[serde(
        default,
        alias = "removeLabelOnCloseOut",
        alias = "remove_label_on_close_out",
        alias = "removeLabelOnClose"
    )]
    pub remove_label_on_close: Option<bool>,

    /// Optional reminder posted before closing
    #[serde(default)]
    pub reminder: Option<RawReminder>,

    /// Logins allowed to close with a `<!-- issue-manager: keyword -->` comment
    #[serde(default)]
    pub users: Vec<String>,
}

/// Raw reminder configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawReminder {
    /// How long before the scheduled close the reminder is posted (default: 1 day)
    #[serde(default, alias = "before")]
    pub delay: Option<RawDuration>,

    /// Reminder text
    #[serde(default)]
    pub message: Option<String>,
}

/// Duration as written in config: seconds or a string form
/// (ISO-8601 `P10D`, or `[N day[s][,]] [[HH:]MM:]SS`)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawDuration {
    Seconds(u64),
    Fractional(f64),
    Text(String),
}

impl std::fmt::Display for RawDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawDuration::Seconds(s) => write!(f, "{}", s),
            RawDuration::Fractional(s) => write!(f, "{}", s),
            RawDuration::Text(s) => write!(f, "{}", s),
        }
    }
}
