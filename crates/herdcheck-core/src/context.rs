//! The immutable bundle every rule is evaluated against.

use std::collections::BTreeSet;

use crate::domain::{PullRequestInfo, Submission};

/// Everything a rule may look at. Built once per run after the pre-check
/// gate admits the submission; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationContext {
    head_repo: Option<String>,
    base_repo: String,
    data_file: String,
    submission: Submission,
    raw: String,
    assets: BTreeSet<String>,
    image_reference_resolves: bool,
}

impl EvaluationContext {
    pub fn new(
        pr: &PullRequestInfo,
        data_file: impl Into<String>,
        submission: Submission,
        raw: impl Into<String>,
        assets: BTreeSet<String>,
    ) -> Self {
        let image_reference_resolves = image_resolves(submission.image.as_deref(), &assets);
        Self {
            head_repo: pr.head_repo.clone(),
            base_repo: pr.base_repo.clone(),
            data_file: data_file.into(),
            submission,
            raw: raw.into(),
            assets,
            image_reference_resolves,
        }
    }

    pub fn head_repo(&self) -> Option<&str> {
        self.head_repo.as_deref()
    }

    pub fn base_repo(&self) -> &str {
        &self.base_repo
    }

    /// Path of the data file within the changeset.
    pub fn data_file(&self) -> &str {
        &self.data_file
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    /// Unparsed data-file text, exactly as fetched.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn assets(&self) -> &BTreeSet<String> {
        &self.assets
    }

    /// Whether the declared image path is one of the changeset's assets.
    pub fn image_reference_resolves(&self) -> bool {
        self.image_reference_resolves
    }
}

/// Exact-match lookup of the declared image among the asset paths.
pub fn image_resolves(image: Option<&str>, assets: &BTreeSet<String>) -> bool {
    image.is_some_and(|path| assets.contains(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pr() -> PullRequestInfo {
        PullRequestInfo {
            number: 7,
            author: "farmer".to_string(),
            head_repo: Some("farmer/cows".to_string()),
            base_repo: "herd/cows".to_string(),
        }
    }

    fn assets(paths: &[&str]) -> BTreeSet<String> {
        paths.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_image_resolves_on_exact_match() {
        let submission = Submission {
            image: Some("images/daisy.png".to_string()),
            ..Default::default()
        };
        let ctx = EvaluationContext::new(
            &pr(),
            "daisy.json",
            submission,
            "{}",
            assets(&["images/daisy.png"]),
        );
        assert!(ctx.image_reference_resolves());
        assert_eq!(ctx.head_repo(), Some("farmer/cows"));
        assert_eq!(ctx.base_repo(), "herd/cows");
        assert_eq!(ctx.data_file(), "daisy.json");
    }

    #[test]
    fn test_image_does_not_resolve_on_case_or_prefix_difference() {
        let set = assets(&["images/Daisy.png", "images/daisy.png.bak"]);
        assert!(!image_resolves(Some("images/daisy.png"), &set));
        assert!(!image_resolves(Some("daisy.png"), &assets(&["images/daisy.png"])));
    }

    #[test]
    fn test_missing_image_never_resolves() {
        assert!(!image_resolves(None, &assets(&["images/daisy.png"])));
    }
}
