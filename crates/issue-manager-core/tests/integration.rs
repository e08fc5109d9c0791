//! Integration tests for issue-manager-core
//!
//! These tests drive whole runs against the mock tracker.

use chrono::{DateTime, TimeDelta, Utc};
use issue_manager_config::{
    DEFAULT_CLOSE_MESSAGE, ConfigFormat, KeywordPolicy, PolicySet, ReminderPolicy, parse_config,
};
use issue_manager_core::{
    DecisionEngine, ExecutionMode, REMINDER_MARKER, RunOrchestrator, RunSummary, Trigger,
};
use issue_manager_tracker_api::{MockIssue, MockTracker, TrackerCall};
use issue_manager_util::IssueNumber;
use std::sync::Arc;

fn base() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-06-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn day(days: f64) -> DateTime<Utc> {
    base() + TimeDelta::seconds((days * 86_400.0) as i64)
}

fn make_test_policies() -> PolicySet {
    let mut waiting = KeywordPolicy::new("waiting");
    waiting.reminder = Some(ReminderPolicy {
        delay: TimeDelta::days(2),
        message: "This will be closed in two days.".into(),
    });

    let question = KeywordPolicy::new("question");

    PolicySet {
        policies: vec![waiting, question],
    }
}

/// Open issue labeled with `label` at day 0
fn labeled_issue(number: u64, label: &str) -> MockIssue {
    MockIssue::open(number, &[label]).labeled(label, day(0.0))
}

fn make_orchestrator(tracker: &Arc<MockTracker>, policies: PolicySet) -> RunOrchestrator {
    let engine = DecisionEngine::new(policies, Some("octo-org".into()));
    RunOrchestrator::new(tracker.clone(), engine, ExecutionMode::Live)
}

async fn run_single(orchestrator: &RunOrchestrator, number: u64, now: DateTime<Utc>) -> RunSummary {
    orchestrator
        .run(Trigger::SingleIssue(IssueNumber::new(number)), now)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_close_after_delay() {
    let tracker = Arc::new(MockTracker::new().with_issue(labeled_issue(1, "question")));
    let orchestrator = make_orchestrator(&tracker, make_test_policies());

    let summary = run_single(&orchestrator, 1, day(11.0)).await;
    assert_eq!(summary.closed, 1);

    let number = IssueNumber::new(1);
    assert_eq!(
        tracker.write_calls(),
        vec![
            TrackerCall::AddComment {
                number,
                body: DEFAULT_CLOSE_MESSAGE.into()
            },
            TrackerCall::CloseIssue { number },
        ]
    );
    assert!(!tracker.issue(1).unwrap().issue.is_open());
}

#[tokio::test]
async fn test_comment_after_label_removes_label() {
    let tracker = Arc::new(
        MockTracker::new().with_issue(
            MockIssue::open(2, &["question"])
                .labeled("question", day(0.0))
                .comment("reporter", "Here is the stack trace", day(9.0)),
        ),
    );
    let orchestrator = make_orchestrator(&tracker, make_test_policies());

    let summary = run_single(&orchestrator, 2, day(11.0)).await;
    assert_eq!(summary.labels_removed, 1);
    assert_eq!(summary.closed, 0);

    assert_eq!(
        tracker.write_calls(),
        vec![TrackerCall::RemoveLabel {
            number: IssueNumber::new(2),
            label: "question".into()
        }]
    );
    let stored = tracker.issue(2).unwrap();
    assert!(stored.issue.is_open());
    assert!(stored.issue.labels.is_empty());
}

#[tokio::test]
async fn test_reminder_then_close() {
    let tracker = Arc::new(MockTracker::new().with_issue(labeled_issue(3, "waiting")));
    let orchestrator = make_orchestrator(&tracker, make_test_policies());

    // Reminder threshold is day 8, close threshold day 10
    tracker.set_clock(day(8.5));
    let summary = run_single(&orchestrator, 3, day(8.5)).await;
    assert_eq!(summary.reminded, 1);
    assert_eq!(summary.closed, 0);

    let comments = tracker.issue(3).unwrap().comments;
    assert_eq!(comments.len(), 1);
    assert!(comments[0].body.starts_with(REMINDER_MARKER));
    assert!(comments[0].body.ends_with("This will be closed in two days."));

    // The reminder is not activity and is not sent twice
    tracker.clear_calls();
    let summary = run_single(&orchestrator, 3, day(9.0)).await;
    assert_eq!(summary.evaluated, 1);
    assert!(tracker.write_calls().is_empty());

    let summary = run_single(&orchestrator, 3, day(10.5)).await;
    assert_eq!(summary.closed, 1);
    assert!(!tracker.issue(3).unwrap().issue.is_open());
}

#[tokio::test]
async fn test_existing_reminder_blocks_early_close() {
    let tracker = Arc::new(
        MockTracker::new().with_issue(
            MockIssue::open(4, &["waiting"])
                .labeled("waiting", day(0.0))
                .comment(
                    "issue-manager[bot]",
                    &format!("{}\nThis will be closed in two days.", REMINDER_MARKER),
                    day(8.2),
                ),
        ),
    );
    let orchestrator = make_orchestrator(&tracker, make_test_policies());

    let summary = run_single(&orchestrator, 4, day(8.5)).await;
    assert_eq!(summary.evaluated, 1);
    assert_eq!(summary.reminded + summary.closed, 0);
    assert!(tracker.write_calls().is_empty());
}

#[tokio::test]
async fn test_pull_request_commit_resets_clock() {
    let tracker = Arc::new(
        MockTracker::new().with_issue(
            MockIssue::open(5, &["question"])
                .pull_request()
                .labeled("question", day(0.0))
                .commit("f00dfeed", day(3.0)),
        ),
    );
    let orchestrator = make_orchestrator(&tracker, make_test_policies());

    let summary = run_single(&orchestrator, 5, day(11.0)).await;
    assert_eq!(summary.labels_removed, 1);
    assert_eq!(summary.closed, 0);
    assert!(
        tracker
            .calls()
            .contains(&TrackerCall::ListCommits {
                number: IssueNumber::new(5)
            })
    );
}

#[tokio::test]
async fn test_sweep_evaluates_each_issue_once() {
    let tracker = Arc::new(
        MockTracker::new()
            .with_issue(
                MockIssue::open(6, &["waiting", "question"])
                    .labeled("waiting", day(0.0))
                    .labeled("question", day(0.0)),
            )
            .with_issue(MockIssue::open(7, &["question"]).labeled("question", day(5.0)))
            .with_issue(MockIssue::open(8, &["bug"]))
            .with_issue(labeled_issue(9, "question").closed()),
    );
    let orchestrator = make_orchestrator(&tracker, make_test_policies());

    let summary = orchestrator.run(Trigger::Sweep, day(20.0)).await.unwrap();

    // #6 gets the "waiting" reminder; "question" is never reached for it
    assert_eq!(summary.evaluated, 2);
    assert_eq!(summary.reminded, 1);
    assert_eq!(summary.closed, 1);

    let comments_on_6 = tracker
        .write_calls()
        .into_iter()
        .filter(|c| {
            matches!(c, TrackerCall::AddComment { number, .. } if *number == IssueNumber::new(6))
        })
        .count();
    assert_eq!(comments_on_6, 1);

    let closes: Vec<_> = tracker
        .write_calls()
        .into_iter()
        .filter(|c| matches!(c, TrackerCall::CloseIssue { .. }))
        .collect();
    assert_eq!(
        closes,
        vec![TrackerCall::CloseIssue {
            number: IssueNumber::new(7)
        }]
    );
    assert!(tracker.issue(8).unwrap().issue.is_open());
}

#[tokio::test]
async fn test_rerun_on_closed_issue_is_noop() {
    let tracker = Arc::new(MockTracker::new().with_issue(labeled_issue(10, "question")));
    let orchestrator = make_orchestrator(&tracker, make_test_policies());

    run_single(&orchestrator, 10, day(11.0)).await;
    tracker.clear_calls();

    let summary = run_single(&orchestrator, 10, day(12.0)).await;
    assert_eq!(summary.skipped, 1);
    assert!(tracker.write_calls().is_empty());
}

#[tokio::test]
async fn test_unlabeled_issue_untouched() {
    let tracker = Arc::new(MockTracker::new().with_issue(MockIssue::open(11, &[])));
    let orchestrator = make_orchestrator(&tracker, make_test_policies());

    let summary = run_single(&orchestrator, 11, day(100.0)).await;
    assert_eq!(summary.evaluated, 1);
    assert!(tracker.write_calls().is_empty());
}

#[tokio::test]
async fn test_write_failure_aborts_run() {
    let tracker = Arc::new(MockTracker::new().with_issue(labeled_issue(12, "question")));
    *tracker.fail_writes.lock().unwrap() = true;
    let orchestrator = make_orchestrator(&tracker, make_test_policies());

    let result = orchestrator
        .run(Trigger::SingleIssue(IssueNumber::new(12)), day(11.0))
        .await;
    assert!(result.is_err());
    assert!(tracker.issue(12).unwrap().issue.is_open());
}

#[tokio::test]
async fn test_dry_run_leaves_tracker_untouched() {
    let tracker = Arc::new(MockTracker::new().with_issue(labeled_issue(13, "question")));
    let engine = DecisionEngine::new(make_test_policies(), None);
    let orchestrator = RunOrchestrator::new(tracker.clone(), engine, ExecutionMode::DryRun);

    let summary = run_single(&orchestrator, 13, day(11.0)).await;
    assert_eq!(summary.closed, 1);
    assert!(tracker.write_calls().is_empty());
}

#[tokio::test]
async fn test_directive_comment_closes() {
    let tracker = Arc::new(
        MockTracker::new().with_issue(MockIssue::open(14, &[]).comment(
            "octo-org",
            "Answered in the docs. <!-- issue-manager: question -->",
            day(0.0),
        )),
    );
    let orchestrator = make_orchestrator(&tracker, make_test_policies());

    let summary = run_single(&orchestrator, 14, day(11.0)).await;
    assert_eq!(summary.closed, 1);
    assert!(!tracker.issue(14).unwrap().issue.is_open());
}

#[tokio::test]
async fn test_policies_from_config_text() {
    let config = r#"{
        "$schema": "https://example.org/issue-manager.schema.json",
        "waiting": {
            "delay": "P3D",
            "message": "Closing: no reply in three days.",
            "removeLabelOnCloseOut": true
        }
    }"#;
    let policies = parse_config(config, ConfigFormat::Json).unwrap();

    let tracker = Arc::new(MockTracker::new().with_issue(labeled_issue(15, "waiting")));
    let orchestrator = make_orchestrator(&tracker, policies);

    run_single(&orchestrator, 15, day(4.0)).await;

    let number = IssueNumber::new(15);
    assert_eq!(
        tracker.write_calls(),
        vec![
            TrackerCall::AddComment {
                number,
                body: "Closing: no reply in three days.".into()
            },
            TrackerCall::CloseIssue { number },
            TrackerCall::RemoveLabel {
                number,
                label: "waiting".into()
            },
        ]
    );
}

#[tokio::test]
async fn test_directive_on_labeled_issue() {
    let tracker = Arc::new(MockTracker::new().with_issue(labeled_issue(16, "question").comment(
        "octo-org",
        "Fixed in the latest release. <!-- issue-manager: question -->",
        day(1.0),
    )));
    let orchestrator = make_orchestrator(&tracker, make_test_policies());

    let summary = run_single(&orchestrator, 16, day(12.0)).await;
    assert_eq!(summary.labels_removed, 1);
    assert_eq!(summary.closed, 1);

    let number = IssueNumber::new(16);
    assert_eq!(
        tracker.write_calls(),
        vec![
            TrackerCall::RemoveLabel {
                number,
                label: "question".into()
            },
            TrackerCall::AddComment {
                number,
                body: DEFAULT_CLOSE_MESSAGE.into()
            },
            TrackerCall::CloseIssue { number },
        ]
    );
}

#[tokio::test]
async fn test_directive_keeps_label_when_removal_disabled() {
    let mut policy = KeywordPolicy::new("question");
    policy.remove_label_on_comment = false;
    let tracker = Arc::new(MockTracker::new().with_issue(labeled_issue(17, "question").comment(
        "octo-org",
        "<!-- issue-manager: question -->",
        day(1.0),
    )));
    let orchestrator = make_orchestrator(
        &tracker,
        PolicySet {
            policies: vec![policy],
        },
    );

    let summary = run_single(&orchestrator, 17, day(12.0)).await;
    assert_eq!(summary.labels_removed, 0);
    assert_eq!(summary.closed, 1);

    let stored = tracker.issue(17).unwrap();
    assert!(!stored.issue.is_open());
    assert_eq!(stored.issue.labels, vec!["question".to_string()]);
}

#[tokio::test]
async fn test_missing_label_event_uses_inactivity() {
    // Label present but its labeled event is not in the history
    let tracker = Arc::new(
        MockTracker::new()
            .with_issue(MockIssue::open(18, &["waiting"]).comment("reporter", "ping", day(0.0)))
            .with_issue(MockIssue::open(19, &["waiting"]).comment("reporter", "ping", day(5.0))),
    );
    let orchestrator = make_orchestrator(&tracker, make_test_policies());

    let summary = orchestrator.run(Trigger::Sweep, day(11.0)).await.unwrap();
    assert_eq!(summary.evaluated, 2);
    assert_eq!(summary.closed, 1);
    // No reminder and no label removal without a labeling time
    assert_eq!(summary.reminded, 0);
    assert_eq!(summary.labels_removed, 0);

    assert!(!tracker.issue(18).unwrap().issue.is_open());
    assert!(tracker.issue(19).unwrap().issue.is_open());
}
