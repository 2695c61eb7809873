//! Pull request metadata as seen by the validation engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity of the pull request under validation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequestInfo {
    pub number: u64,
    /// Login of the PR author.
    pub author: String,
    /// `owner/name` of the head repository. `None` when the source fork has
    /// been deleted.
    pub head_repo: Option<String>,
    /// `owner/name` of the base repository.
    pub base_repo: String,
}

/// One file touched by the changeset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ChangedFile {
    /// Repository-relative path.
    pub path: String,
    /// Locator from which the file's raw content can be fetched.
    pub raw_url: String,
}

impl ChangedFile {
    pub fn new(path: impl Into<String>, raw_url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            raw_url: raw_url.into(),
        }
    }
}

/// A previously posted comment, reduced to what escalation needs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriorFeedback {
    pub is_automated: bool,
    pub contains_failure_marker: bool,
    pub posted_at: Option<DateTime<Utc>>,
}

impl PriorFeedback {
    pub fn new(is_automated: bool, contains_failure_marker: bool) -> Self {
        Self {
            is_automated,
            contains_failure_marker,
            posted_at: None,
        }
    }

    /// An automated comment reporting a failed validation.
    pub fn is_automated_rejection(&self) -> bool {
        self.is_automated && self.contains_failure_marker
    }
}

/// How often this PR has already been rejected by the bot.
///
/// Rebuilt from [`PriorFeedback`] on every run; it only ever feeds the
/// escalation notice, never the verdict.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FailureHistory {
    pub prior_failures: u32,
    pub last_failure_at: Option<DateTime<Utc>>,
}

impl FailureHistory {
    pub fn new(prior_failures: u32) -> Self {
        Self {
            prior_failures,
            last_failure_at: None,
        }
    }

    pub fn from_feedback(feedback: &[PriorFeedback]) -> Self {
        let rejections: Vec<&PriorFeedback> = feedback
            .iter()
            .filter(|f| f.is_automated_rejection())
            .collect();

        Self {
            prior_failures: u32::try_from(rejections.len()).unwrap_or(u32::MAX),
            last_failure_at: rejections.iter().filter_map(|f| f.posted_at).max(),
        }
    }

    /// Whether the count has reached an escalation threshold.
    pub fn reaches(&self, threshold: u32) -> bool {
        self.prior_failures >= threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_history_counts_only_automated_rejections() {
        let feedback = vec![
            PriorFeedback::new(true, true),
            PriorFeedback::new(true, false),
            PriorFeedback::new(false, true),
            PriorFeedback::new(true, true),
        ];
        let history = FailureHistory::from_feedback(&feedback);
        assert_eq!(history.prior_failures, 2);
    }

    #[test]
    fn test_history_empty_feedback() {
        let history = FailureHistory::from_feedback(&[]);
        assert_eq!(history, FailureHistory::default());
        assert!(!history.reaches(3));
    }

    #[test]
    fn test_history_threshold_is_inclusive() {
        assert!(!FailureHistory::new(2).reaches(3));
        assert!(FailureHistory::new(3).reaches(3));
        assert!(FailureHistory::new(4).reaches(3));
    }

    #[test]
    fn test_history_tracks_latest_rejection() {
        let early = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap();
        let feedback = vec![
            PriorFeedback {
                is_automated: true,
                contains_failure_marker: true,
                posted_at: Some(late),
            },
            PriorFeedback {
                is_automated: true,
                contains_failure_marker: true,
                posted_at: Some(early),
            },
            PriorFeedback {
                is_automated: false,
                contains_failure_marker: true,
                posted_at: Some(late + chrono::Duration::days(1)),
            },
        ];
        let history = FailureHistory::from_feedback(&feedback);
        assert_eq!(history.last_failure_at, Some(late));
    }
}
