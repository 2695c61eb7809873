//! Collaborator interface to the code-hosting platform.
//!
//! The engine needs exactly these operations; everything else about the
//! platform (auth, pagination, comment metadata) stays behind the trait.
//! [`GitHubClient`](crate::github::GitHubClient) talks to the GitHub REST
//! API; [`MemoryPullRequestSource`](crate::fakes::MemoryPullRequestSource)
//! serves tests.

use async_trait::async_trait;

use crate::domain::{ChangedFile, PriorFeedback, PullRequestInfo};
use crate::error::Result;

/// Pull request access for one repository.
///
/// Guarantees expected of implementations:
/// - `fetch_changed_files` returns every file in the changeset, in the
///   platform's order.
/// - `fetch_raw_content` returns the file text unmodified (no line-ending
///   or encoding normalisation).
/// - `post_feedback` posts one comment per call.
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// `owner/name` of the repository the PRs belong to.
    fn repository(&self) -> &str;

    async fn fetch_pull_request(&self, number: u64) -> Result<PullRequestInfo>;

    async fn fetch_changed_files(&self, number: u64) -> Result<Vec<ChangedFile>>;

    async fn fetch_raw_content(&self, raw_url: &str) -> Result<String>;

    /// Earlier comments on the PR, classified for escalation.
    async fn fetch_prior_feedback(&self, number: u64) -> Result<Vec<PriorFeedback>>;

    async fn post_feedback(&self, number: u64, body: &str) -> Result<()>;
}
