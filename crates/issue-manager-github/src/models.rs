//! GitHub REST payloads and their conversion into tracker types

use chrono::{DateTime, Utc};
use issue_manager_tracker_api::{
    Comment, Commit, Issue, IssueEvent, IssueEventKind, IssueState, Review,
};
use issue_manager_util::IssueNumber;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct GithubUser {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GithubLabel {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GithubIssue {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    pub state: String,
    #[serde(default)]
    pub labels: Vec<GithubLabel>,
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

impl From<GithubIssue> for Issue {
    fn from(raw: GithubIssue) -> Self {
        Issue {
            number: IssueNumber::new(raw.number),
            title: raw.title,
            state: if raw.state.eq_ignore_ascii_case("open") {
                IssueState::Open
            } else {
                IssueState::Closed
            },
            labels: raw.labels.into_iter().map(|l| l.name).collect(),
            is_pull_request: raw.pull_request.is_some(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GithubIssueEvent {
    pub event: String,
    #[serde(default)]
    pub label: Option<GithubLabel>,
    pub created_at: DateTime<Utc>,
}

impl From<GithubIssueEvent> for IssueEvent {
    fn from(raw: GithubIssueEvent) -> Self {
        let kind = match (raw.event.as_str(), raw.label) {
            ("labeled", Some(label)) => IssueEventKind::Labeled { label: label.name },
            ("unlabeled", Some(label)) => IssueEventKind::Unlabeled { label: label.name },
            (name, _) => IssueEventKind::Other {
                name: name.to_string(),
            },
        };
        IssueEvent {
            kind,
            created_at: raw.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GithubComment {
    pub id: u64,
    #[serde(default)]
    pub user: Option<GithubUser>,
    #[serde(default)]
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<GithubComment> for Comment {
    fn from(raw: GithubComment) -> Self {
        Comment {
            id: raw.id,
            author: raw.user.map(|u| u.login),
            body: raw.body.unwrap_or_default(),
            created_at: raw.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GithubGitActor {
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GithubCommitDetail {
    #[serde(default)]
    pub author: Option<GithubGitActor>,
    #[serde(default)]
    pub committer: Option<GithubGitActor>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GithubCommit {
    pub sha: String,
    pub commit: GithubCommitDetail,
}

impl From<GithubCommit> for Commit {
    fn from(raw: GithubCommit) -> Self {
        let committed_at = raw
            .commit
            .committer
            .and_then(|c| c.date)
            .or_else(|| raw.commit.author.and_then(|a| a.date));
        Commit {
            sha: raw.sha,
            committed_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GithubReview {
    pub id: u64,
    #[serde(default)]
    pub user: Option<GithubUser>,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl From<GithubReview> for Review {
    fn from(raw: GithubReview) -> Self {
        Review {
            id: raw.id,
            author: raw.user.map(|u| u.login),
            submitted_at: raw.submitted_at,
        }
    }
}
