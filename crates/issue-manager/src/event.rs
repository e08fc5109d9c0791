//! Event payload handling

use anyhow::{Context, Result};
use issue_manager_core::Trigger;
use issue_manager_util::IssueNumber;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Default, Deserialize)]
struct EventPayload {
    #[serde(default)]
    issue: Option<NumberedItem>,
    #[serde(default)]
    pull_request: Option<NumberedItem>,
}

#[derive(Debug, Deserialize)]
struct NumberedItem {
    #[serde(default)]
    number: Option<u64>,
}

/// Work out the run trigger from the webhook payload.
///
/// A payload naming an issue or pull request targets just that one; anything
/// else (no path, no file, no number) is a sweep. `event_name` is only
/// logged and does not affect the selection.
pub fn trigger_from_event(path: Option<&Path>, event_name: Option<&str>) -> Result<Trigger> {
    let Some(path) = path else {
        debug!("No event payload configured");
        return Ok(Trigger::Sweep);
    };

    if !path.exists() {
        debug!(path = %path.display(), "Event payload not found");
        return Ok(Trigger::Sweep);
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read event payload {:?}", path))?;
    let trigger = parse_trigger(&content)
        .with_context(|| format!("Failed to parse event payload {:?}", path))?;

    info!(
        event = event_name.unwrap_or("<unknown>"),
        trigger = ?trigger,
        "Event payload loaded"
    );
    Ok(trigger)
}

/// Trigger for a payload already in memory
pub fn parse_trigger(content: &str) -> Result<Trigger> {
    let payload: EventPayload = serde_json::from_str(content)?;

    let number = payload
        .issue
        .and_then(|i| i.number)
        .or_else(|| payload.pull_request.and_then(|p| p.number));

    Ok(match number {
        Some(n) => Trigger::SingleIssue(IssueNumber::new(n)),
        None => Trigger::Sweep,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn issue_comment_event() {
        let trigger =
            parse_trigger(r#"{"action": "created", "issue": {"number": 42, "title": "x"}}"#)
                .unwrap();
        assert_eq!(trigger, Trigger::SingleIssue(IssueNumber::new(42)));
    }

    #[test]
    fn pull_request_event() {
        let trigger =
            parse_trigger(r#"{"action": "synchronize", "pull_request": {"number": 7}}"#).unwrap();
        assert_eq!(trigger, Trigger::SingleIssue(IssueNumber::new(7)));
    }

    #[test]
    fn schedule_event_sweeps() {
        let trigger = parse_trigger(r#"{"schedule": "0 0 * * *"}"#).unwrap();
        assert_eq!(trigger, Trigger::Sweep);
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(parse_trigger("{not json").is_err());
    }

    #[test]
    fn missing_file_sweeps() {
        let trigger = trigger_from_event(
            Some(Path::new("/nonexistent/event.json")),
            Some("schedule"),
        )
        .unwrap();
        assert_eq!(trigger, Trigger::Sweep);
        assert_eq!(trigger_from_event(None, None).unwrap(), Trigger::Sweep);
    }

    #[test]
    fn payload_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"issue": {{"number": 3}}}}"#).unwrap();

        let trigger = trigger_from_event(Some(file.path()), Some("issue_comment")).unwrap();
        assert_eq!(trigger, Trigger::SingleIssue(IssueNumber::new(3)));
    }
}
