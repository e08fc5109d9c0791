//! GitHub API client

use async_trait::async_trait;
use issue_manager_tracker_api::{
    Comment, Commit, Issue, IssueEvent, Review, Tracker, TrackerError, TrackerResult,
};
use issue_manager_util::IssueNumber;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::models::{
    GithubComment, GithubCommit, GithubIssue, GithubIssueEvent, GithubReview,
};
use crate::{GithubToken, RepoRef};

/// Public GitHub API endpoint
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const PER_PAGE: usize = 100;

/// Connection settings for [`GithubTracker`]
#[derive(Debug, Clone)]
pub struct GithubConfig {
    pub api_base: String,
    pub token: GithubToken,
    pub repo: RepoRef,
    pub request_timeout: Duration,
}

/// Tracker backed by the GitHub REST API
#[derive(Clone)]
pub struct GithubTracker {
    http: reqwest::Client,
    api_base: Url,
    repo: RepoRef,
}

impl GithubTracker {
    pub fn new(config: GithubConfig) -> TrackerResult<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("issue-manager"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            reqwest::header::HeaderValue::from_static("2022-11-28"),
        );
        let auth_header = format!("Bearer {}", config.token.expose().trim());
        let mut auth_value = reqwest::header::HeaderValue::from_str(&auth_header)
            .map_err(|_| TrackerError::Internal("invalid github authorization header".into()))?;
        auth_value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth_value);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout.max(Duration::from_millis(1)))
            .build()
            .map_err(|e| TrackerError::Internal(format!("failed to create github client: {e}")))?;

        let api_base = Url::parse(config.api_base.trim_end_matches('/')).map_err(|e| {
            TrackerError::Internal(format!("invalid api base '{}': {e}", config.api_base))
        })?;

        Ok(Self {
            http,
            api_base,
            repo: config.repo,
        })
    }

    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }

    /// URL for `/repos/{owner}/{name}/{segments...}`, each segment escaped
    fn repo_url(&self, segments: &[&str]) -> TrackerResult<Url> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| TrackerError::Internal("api base cannot be a base url".into()))?
            .pop_if_empty()
            .extend(["repos", self.repo.owner.as_str(), self.repo.name.as_str()])
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> TrackerResult<reqwest::Response> {
        let response = request.send().await.map_err(|e| TrackerError::Transport {
            operation: operation.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(TrackerError::Api {
            operation: operation.to_string(),
            status: status.as_u16(),
            message: truncate_for_error(&body, 800),
        })
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> TrackerResult<T> {
        self.send(operation, request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| TrackerError::Decode {
                operation: operation.to_string(),
                message: e.to_string(),
            })
    }

    /// Follow page numbers until a short page is returned
    async fn list_paginated<T: DeserializeOwned>(
        &self,
        operation: &str,
        url: Url,
        query: &[(&str, &str)],
    ) -> TrackerResult<Vec<T>> {
        let mut page = 1_u32;
        let mut rows = Vec::new();
        loop {
            let page_value = page.to_string();
            let per_page = PER_PAGE.to_string();
            let request = self
                .http
                .get(url.clone())
                .query(query)
                .query(&[("per_page", per_page.as_str()), ("page", page_value.as_str())]);
            let chunk: Vec<T> = self.request_json(operation, request).await?;
            let chunk_len = chunk.len();
            rows.extend(chunk);
            if chunk_len < PER_PAGE {
                break;
            }
            page = page.saturating_add(1);
        }
        debug!(operation, count = rows.len(), "Listed");
        Ok(rows)
    }

    fn number_segment(number: IssueNumber) -> String {
        number.get().to_string()
    }
}

#[async_trait]
impl Tracker for GithubTracker {
    async fn list_open_issues(&self, label: Option<&str>) -> TrackerResult<Vec<Issue>> {
        let url = self.repo_url(&["issues"])?;
        let mut query = vec![("state", "open"), ("direction", "asc")];
        if let Some(label) = label {
            query.push(("labels", label));
        }
        let rows: Vec<GithubIssue> = self.list_paginated("list issues", url, &query).await?;
        Ok(rows.into_iter().map(Issue::from).collect())
    }

    async fn get_issue(&self, number: IssueNumber) -> TrackerResult<Issue> {
        let url = self.repo_url(&["issues", &Self::number_segment(number)])?;
        match self
            .request_json::<GithubIssue>("get issue", self.http.get(url))
            .await
        {
            Ok(raw) => Ok(raw.into()),
            Err(TrackerError::Api { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Err(TrackerError::IssueNotFound(number))
            }
            Err(e) => Err(e),
        }
    }

    async fn list_events(&self, number: IssueNumber) -> TrackerResult<Vec<IssueEvent>> {
        let url = self.repo_url(&["issues", &Self::number_segment(number), "events"])?;
        let rows: Vec<GithubIssueEvent> = self.list_paginated("list issue events", url, &[]).await?;
        Ok(rows.into_iter().map(IssueEvent::from).collect())
    }

    async fn list_comments(&self, number: IssueNumber) -> TrackerResult<Vec<Comment>> {
        let url = self.repo_url(&["issues", &Self::number_segment(number), "comments"])?;
        let rows: Vec<GithubComment> = self
            .list_paginated("list issue comments", url, &[])
            .await?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn list_commits(&self, number: IssueNumber) -> TrackerResult<Vec<Commit>> {
        let url = self.repo_url(&["pulls", &Self::number_segment(number), "commits"])?;
        let rows: Vec<GithubCommit> = self
            .list_paginated("list pull request commits", url, &[])
            .await?;
        Ok(rows.into_iter().map(Commit::from).collect())
    }

    async fn list_reviews(&self, number: IssueNumber) -> TrackerResult<Vec<Review>> {
        let url = self.repo_url(&["pulls", &Self::number_segment(number), "reviews"])?;
        let rows: Vec<GithubReview> = self
            .list_paginated("list pull request reviews", url, &[])
            .await?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    async fn list_review_comments(&self, number: IssueNumber) -> TrackerResult<Vec<Comment>> {
        let url = self.repo_url(&["pulls", &Self::number_segment(number), "comments"])?;
        let rows: Vec<GithubComment> = self
            .list_paginated("list review comments", url, &[])
            .await?;
        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn add_comment(&self, number: IssueNumber, body: &str) -> TrackerResult<()> {
        let url = self.repo_url(&["issues", &Self::number_segment(number), "comments"])?;
        let request = self.http.post(url).json(&json!({ "body": body }));
        self.send("create issue comment", request).await?;
        Ok(())
    }

    async fn close_issue(&self, number: IssueNumber) -> TrackerResult<()> {
        let url = self.repo_url(&["issues", &Self::number_segment(number)])?;
        let request = self
            .http
            .request(Method::PATCH, url)
            .json(&json!({ "state": "closed" }));
        self.send("close issue", request).await?;
        Ok(())
    }

    async fn remove_label(&self, number: IssueNumber, label: &str) -> TrackerResult<()> {
        let url = self.repo_url(&[
            "issues",
            &Self::number_segment(number),
            "labels",
            label,
        ])?;
        match self.send("remove label", self.http.delete(url)).await {
            Ok(_) => Ok(()),
            Err(TrackerError::Api { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                debug!(issue = %number, label, "Label already absent");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

fn truncate_for_error(body: &str, max_chars: usize) -> String {
    if body.chars().count() <= max_chars {
        return body.to_string();
    }
    let truncated: String = body.chars().take(max_chars).collect();
    format!("{truncated}...")
}
