//! Actions emitted by the decision engine

use issue_manager_util::Keyword;

/// Prefix that marks a comment as a reminder written by issue-manager
pub const REMINDER_MARKER: &str = "<!-- reminder -->";

/// Single step decided for an issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Remove the policy's label (activity after labeling, or close cleanup)
    RemoveLabel { keyword: Keyword },

    /// Warn that the issue will be closed soon
    SendReminder { keyword: Keyword, message: String },

    /// Post `message` and close the issue
    Close { keyword: Keyword, message: String },
}

impl Action {
    /// Reminder and close end evaluation of the issue for this run
    pub fn is_terminal(&self) -> bool {
        matches!(self, Action::SendReminder { .. } | Action::Close { .. })
    }

    pub fn keyword(&self) -> &Keyword {
        match self {
            Action::RemoveLabel { keyword }
            | Action::SendReminder { keyword, .. }
            | Action::Close { keyword, .. } => keyword,
        }
    }
}

/// Body of a reminder comment
pub fn reminder_body(message: &str) -> String {
    format!("{}\n{}", REMINDER_MARKER, message)
}
