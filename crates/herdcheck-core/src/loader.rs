//! Submission loading: split a changeset into data-file and asset
//! candidates, and parse the data file's raw text.

use std::collections::BTreeSet;

use crate::config::SubmissionConfig;
use crate::domain::{ChangedFile, Submission};
use crate::precheck::PrecheckFailure;

/// A changeset split by role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Files whose name ends with the data-file suffix, in changeset order.
    pub data_candidates: Vec<ChangedFile>,
    /// Files under the asset prefix, in changeset order.
    pub assets: Vec<ChangedFile>,
}

impl Partition {
    /// Asset paths as a set, for exact-match lookups.
    pub fn asset_paths(&self) -> BTreeSet<String> {
        self.assets.iter().map(|f| f.path.clone()).collect()
    }
}

/// Partition `files` into data-file and asset candidates.
///
/// The two roles are judged independently; a file may qualify for both.
pub fn partition(files: &[ChangedFile], config: &SubmissionConfig) -> Partition {
    let data_candidates = files
        .iter()
        .filter(|f| f.path.ends_with(&config.data_suffix))
        .cloned()
        .collect();
    let assets = files
        .iter()
        .filter(|f| f.path.starts_with(&config.asset_prefix))
        .cloned()
        .collect();

    Partition {
        data_candidates,
        assets,
    }
}

/// Parse the data file's raw text into a [`Submission`].
pub fn parse_submission(data_file: &ChangedFile, raw: &str) -> Result<Submission, PrecheckFailure> {
    Submission::parse(raw).map_err(|e| PrecheckFailure::InvalidJson {
        path: data_file.path.clone(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str) -> ChangedFile {
        ChangedFile::new(path, format!("https://raw.example/{}", path))
    }

    #[test]
    fn test_partition_by_suffix_and_prefix() {
        let files = vec![
            file("bessie_moo.json"),
            file("images/bessie_moo.png"),
            file("README.md"),
        ];
        let p = partition(&files, &SubmissionConfig::default());

        assert_eq!(p.data_candidates, vec![file("bessie_moo.json")]);
        assert_eq!(p.assets, vec![file("images/bessie_moo.png")]);
    }

    #[test]
    fn test_partition_keeps_all_candidates() {
        let files = vec![file("a.json"), file("cows/b.json"), file("images/a.png")];
        let p = partition(&files, &SubmissionConfig::default());
        assert_eq!(p.data_candidates.len(), 2);
    }

    #[test]
    fn test_partition_prefix_is_anchored() {
        let files = vec![file("not-images/a.png"), file("docs/images/a.png")];
        let p = partition(&files, &SubmissionConfig::default());
        assert!(p.assets.is_empty());
    }

    #[test]
    fn test_partition_honours_config() {
        let config = SubmissionConfig {
            data_suffix: ".cow.json".to_string(),
            asset_prefix: "assets/".to_string(),
            image_extensions: vec!["webp".to_string()],
        };
        let files = vec![file("a.json"), file("b.cow.json"), file("assets/b.webp")];
        let p = partition(&files, &config);
        assert_eq!(p.data_candidates, vec![file("b.cow.json")]);
        assert_eq!(p.asset_paths().into_iter().collect::<Vec<_>>(), vec!["assets/b.webp"]);
    }

    #[test]
    fn test_parse_failure_names_the_file() {
        let err = parse_submission(&file("bessie.json"), "{ not json").unwrap_err();
        match err {
            PrecheckFailure::InvalidJson { path, reason } => {
                assert_eq!(path, "bessie.json");
                assert!(!reason.is_empty());
            }
            other => panic!("Expected InvalidJson, got {:?}", other),
        }
    }
}
