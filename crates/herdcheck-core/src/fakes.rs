//! In-memory fake of [`PullRequestSource`] (testing only)
//!
//! Holds one pull request, its changed files, raw contents keyed by URL and
//! prior feedback. Posted comments and raw fetches are recorded so tests can
//! assert on the run's side effects.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{ChangedFile, PriorFeedback, PullRequestInfo};
use crate::error::{HerdError, Result};
use crate::source::PullRequestSource;

#[derive(Debug)]
pub struct MemoryPullRequestSource {
    repository: String,
    pull_request: PullRequestInfo,
    files: Vec<ChangedFile>,
    contents: HashMap<String, String>,
    feedback: Vec<PriorFeedback>,
    posted: Mutex<Vec<(u64, String)>>,
    raw_fetches: Mutex<Vec<String>>,
}

impl MemoryPullRequestSource {
    /// A source whose single PR comes from `head` into `base`.
    pub fn new(number: u64, head: Option<&str>, base: &str) -> Self {
        Self {
            repository: base.to_string(),
            pull_request: PullRequestInfo {
                number,
                author: "contributor".to_string(),
                head_repo: head.map(str::to_string),
                base_repo: base.to_string(),
            },
            files: Vec::new(),
            contents: HashMap::new(),
            feedback: Vec::new(),
            posted: Mutex::new(Vec::new()),
            raw_fetches: Mutex::new(Vec::new()),
        }
    }

    /// Add a changed file with content served at `raw://<path>`.
    pub fn with_file(mut self, path: &str, content: &str) -> Self {
        let raw_url = format!("raw://{}", path);
        self.contents.insert(raw_url.clone(), content.to_string());
        self.files.push(ChangedFile::new(path, raw_url));
        self
    }

    /// Add a changed file whose content cannot be fetched.
    pub fn with_unreachable_file(mut self, path: &str) -> Self {
        self.files
            .push(ChangedFile::new(path, format!("unreachable://{}", path)));
        self
    }

    pub fn with_feedback(mut self, feedback: PriorFeedback) -> Self {
        self.feedback.push(feedback);
        self
    }

    /// Add `count` earlier automated rejections.
    pub fn with_prior_failures(mut self, count: usize) -> Self {
        for _ in 0..count {
            self.feedback.push(PriorFeedback::new(true, true));
        }
        self
    }

    /// Comments posted so far, as `(pr, body)`.
    pub fn posted(&self) -> Vec<(u64, String)> {
        self.posted.lock().unwrap().clone()
    }

    /// URLs passed to `fetch_raw_content`, in call order.
    pub fn raw_fetches(&self) -> Vec<String> {
        self.raw_fetches.lock().unwrap().clone()
    }

    fn check_number(&self, number: u64) -> Result<()> {
        if number == self.pull_request.number {
            Ok(())
        } else {
            Err(HerdError::Api {
                status: 404,
                url: format!("memory://{}/pulls/{}", self.repository, number),
            })
        }
    }
}

#[async_trait]
impl PullRequestSource for MemoryPullRequestSource {
    fn repository(&self) -> &str {
        &self.repository
    }

    async fn fetch_pull_request(&self, number: u64) -> Result<PullRequestInfo> {
        self.check_number(number)?;
        Ok(self.pull_request.clone())
    }

    async fn fetch_changed_files(&self, number: u64) -> Result<Vec<ChangedFile>> {
        self.check_number(number)?;
        Ok(self.files.clone())
    }

    async fn fetch_raw_content(&self, raw_url: &str) -> Result<String> {
        self.raw_fetches.lock().unwrap().push(raw_url.to_string());
        self.contents
            .get(raw_url)
            .cloned()
            .ok_or_else(|| HerdError::Http(format!("connection refused: {}", raw_url)))
    }

    async fn fetch_prior_feedback(&self, number: u64) -> Result<Vec<PriorFeedback>> {
        self.check_number(number)?;
        Ok(self.feedback.clone())
    }

    async fn post_feedback(&self, number: u64, body: &str) -> Result<()> {
        self.check_number(number)?;
        self.posted.lock().unwrap().push((number, body.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_serves_files_and_records_posts() {
        let source = MemoryPullRequestSource::new(4, Some("a/cows"), "herd/cows")
            .with_file("a.json", "{}")
            .with_prior_failures(2);

        let files = source.fetch_changed_files(4).await.expect("files");
        assert_eq!(files.len(), 1);
        let raw = source
            .fetch_raw_content(&files[0].raw_url)
            .await
            .expect("raw");
        assert_eq!(raw, "{}");
        assert_eq!(source.fetch_prior_feedback(4).await.expect("feedback").len(), 2);

        source.post_feedback(4, "hello").await.expect("post");
        assert_eq!(source.posted(), vec![(4, "hello".to_string())]);
        assert_eq!(source.raw_fetches(), vec!["raw://a.json".to_string()]);
    }

    #[tokio::test]
    async fn test_fake_unknown_pr_is_api_error() {
        let source = MemoryPullRequestSource::new(4, None, "herd/cows");
        let err = source.fetch_pull_request(5).await.unwrap_err();
        assert!(matches!(err, HerdError::Api { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fake_unreachable_content() {
        let source =
            MemoryPullRequestSource::new(4, None, "herd/cows").with_unreachable_file("a.json");
        let files = source.fetch_changed_files(4).await.expect("files");
        assert!(source.fetch_raw_content(&files[0].raw_url).await.is_err());
    }
}
