//! GitHub REST implementation of [`PullRequestSource`].
//!
//! Endpoints used:
//! - `GET  /repos/{owner}/{repo}/pulls/{n}`
//! - `GET  /repos/{owner}/{repo}/pulls/{n}/files` (paginated)
//! - `GET  {raw_url}`
//! - `GET  /repos/{owner}/{repo}/issues/{n}/comments` (paginated)
//! - `POST /repos/{owner}/{repo}/issues/{n}/comments`

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{EscalationConfig, GitHubConfig};
use crate::domain::{ChangedFile, PriorFeedback, PullRequestInfo};
use crate::error::{HerdError, Result};
use crate::source::PullRequestSource;

const PER_PAGE: usize = 100;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct UserWire {
    login: String,
}

#[derive(Debug, Deserialize)]
struct RepoWire {
    full_name: String,
}

#[derive(Debug, Deserialize)]
struct BranchWire {
    repo: Option<RepoWire>,
}

#[derive(Debug, Deserialize)]
struct PullWire {
    number: u64,
    user: UserWire,
    head: BranchWire,
    base: BranchWire,
}

#[derive(Debug, Deserialize)]
struct FileWire {
    filename: String,
    raw_url: String,
    /// `added`, `modified`, `removed`, `renamed`, ...
    #[serde(default)]
    status: Option<String>,
}

impl FileWire {
    /// Removed files are not part of the submission.
    fn is_removed(&self) -> bool {
        self.status.as_deref() == Some("removed")
    }
}

#[derive(Debug, Deserialize)]
struct CommentWire {
    user: Option<UserWire>,
    #[serde(default)]
    body: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
struct NewComment<'a> {
    body: &'a str,
}

impl PullWire {
    fn into_info(self) -> Result<PullRequestInfo> {
        let base_repo = self
            .base
            .repo
            .map(|r| r.full_name)
            .ok_or_else(|| HerdError::Http("pull request has no base repository".to_string()))?;
        Ok(PullRequestInfo {
            number: self.number,
            author: self.user.login,
            head_repo: self.head.repo.map(|r| r.full_name),
            base_repo,
        })
    }
}

/// Reduce a comment to the two facts escalation needs.
///
/// Only comments authored by the configured validator login count as
/// automated; other apps (coverage, dependency bots) are ignored.
fn classify_comment(comment: &CommentWire, escalation: &EscalationConfig) -> PriorFeedback {
    let is_automated = comment
        .user
        .as_ref()
        .is_some_and(|u| u.login == escalation.bot_login);
    let contains_failure_marker = comment
        .body
        .as_deref()
        .is_some_and(|b| b.contains(&escalation.failure_marker));

    PriorFeedback {
        is_automated,
        contains_failure_marker,
        posted_at: comment.created_at,
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// GitHub REST client bound to one repository.
pub struct GitHubClient {
    repository: String,
    api_url: String,
    escalation: EscalationConfig,
    http_client: reqwest::Client,
}

impl GitHubClient {
    /// Create a client for `repository` (`owner/name`) authenticated with
    /// `token`.
    pub fn new(
        repository: &str,
        token: &str,
        github: &GitHubConfig,
        escalation: &EscalationConfig,
    ) -> Result<Self> {
        validate_repository(repository)?;
        if token.is_empty() {
            return Err(HerdError::MissingCredential("GITHUB_TOKEN"));
        }

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| HerdError::Config("token contains invalid header characters".to_string()))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );

        let http_client = reqwest::Client::builder()
            .user_agent(github.user_agent.as_str())
            .default_headers(headers)
            .timeout(Duration::from_secs(github.timeout_secs))
            .build()?;

        Ok(Self {
            repository: repository.to_string(),
            api_url: github.api_url.trim_end_matches('/').to_string(),
            escalation: escalation.clone(),
            http_client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/repos/{}/{}", self.api_url, self.repository, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url = %url, "GET");
        let response = self.http_client.get(url).send().await?.error_for_status()?;
        Ok(response.json::<T>().await?)
    }

    /// Fetch every page of a list endpoint.
    async fn get_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let url = format!("{}?per_page={}&page={}", self.endpoint(path), PER_PAGE, page);
            let batch: Vec<T> = self.get_json(&url).await?;
            let len = batch.len();
            items.extend(batch);
            if len < PER_PAGE {
                break;
            }
            page += 1;
        }
        Ok(items)
    }
}

/// Require the `owner/name` shape.
pub fn validate_repository(repository: &str) -> Result<()> {
    match repository.split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok(())
        }
        _ => Err(HerdError::InvalidRepository(repository.to_string())),
    }
}

#[async_trait]
impl PullRequestSource for GitHubClient {
    fn repository(&self) -> &str {
        &self.repository
    }

    async fn fetch_pull_request(&self, number: u64) -> Result<PullRequestInfo> {
        let pull: PullWire = self
            .get_json(&self.endpoint(&format!("pulls/{}", number)))
            .await?;
        pull.into_info()
    }

    async fn fetch_changed_files(&self, number: u64) -> Result<Vec<ChangedFile>> {
        let files: Vec<FileWire> = self.get_all(&format!("pulls/{}/files", number)).await?;
        Ok(files
            .into_iter()
            .filter(|f| !f.is_removed())
            .map(|f| ChangedFile::new(f.filename, f.raw_url))
            .collect())
    }

    async fn fetch_raw_content(&self, raw_url: &str) -> Result<String> {
        debug!(url = %raw_url, "GET raw");
        let response = self
            .http_client
            .get(raw_url)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    async fn fetch_prior_feedback(&self, number: u64) -> Result<Vec<PriorFeedback>> {
        let comments: Vec<CommentWire> =
            self.get_all(&format!("issues/{}/comments", number)).await?;
        Ok(comments
            .iter()
            .map(|c| classify_comment(c, &self.escalation))
            .collect())
    }

    async fn post_feedback(&self, number: u64, body: &str) -> Result<()> {
        let url = self.endpoint(&format!("issues/{}/comments", number));
        debug!(url = %url, "POST comment");
        self.http_client
            .post(&url)
            .json(&NewComment { body })
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
