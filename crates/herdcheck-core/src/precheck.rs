//! Pre-check gate.
//!
//! Structural checks that must hold before per-field rules mean anything:
//!
//! 1. exactly one data-file candidate exists;
//! 2. its raw text parses as JSON;
//! 3. it declares at least one of the required fields.
//!
//! The gate stops at the first failure. A failure yields a single-issue
//! report and the rule engine never runs.

use serde::{Deserialize, Serialize};

use crate::config::SubmissionConfig;
use crate::context::EvaluationContext;
use crate::domain::{ChangedFile, PullRequestInfo, RequiredField};
use crate::loader::{self, Partition};

/// Why a submission was stopped before rule evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrecheckFailure {
    /// No file in the changeset carries the data-file suffix.
    NoDataFile,
    /// More than one file carries the data-file suffix.
    MultipleDataFiles { paths: Vec<String> },
    /// The data file is not valid JSON.
    InvalidJson { path: String, reason: String },
    /// The data file declares none of the required fields.
    AllFieldsMissing { path: String },
}

impl PrecheckFailure {
    /// Stable identifier used in logs and the summary artifact.
    pub fn kind(&self) -> &'static str {
        match self {
            PrecheckFailure::NoDataFile => "no_data_file",
            PrecheckFailure::MultipleDataFiles { .. } => "multiple_data_files",
            PrecheckFailure::InvalidJson { .. } => "invalid_json",
            PrecheckFailure::AllFieldsMissing { .. } => "all_fields_missing",
        }
    }

    /// Report line shown to the submitter.
    pub fn message(&self, config: &SubmissionConfig) -> String {
        match self {
            PrecheckFailure::NoDataFile => format!(
                "❌ No JSON file found! Please include your **<cow>{}** file.",
                config.data_suffix
            ),
            PrecheckFailure::MultipleDataFiles { paths } => format!(
                "❌ Multiple JSON files found! Please include only one **<cow>{}** file. Found: {}",
                config.data_suffix,
                paths.join(", ")
            ),
            PrecheckFailure::InvalidJson { path, reason } => {
                format!("❌ File **{}** is not valid JSON! ({})", path, reason)
            }
            PrecheckFailure::AllFieldsMissing { path } => {
                let fields: Vec<&str> = RequiredField::ALL.iter().map(|f| f.as_str()).collect();
                format!(
                    "❌ File **{}** is missing all required fields: {}",
                    path,
                    fields.join(", ")
                )
            }
        }
    }
}

/// The gate, split at the one point where the caller must fetch content.
pub struct PrecheckGate;

impl PrecheckGate {
    /// Step 1: pick the single data-file candidate.
    pub fn select_data_file(partition: &Partition) -> Result<&ChangedFile, PrecheckFailure> {
        match partition.data_candidates.as_slice() {
            [] => Err(PrecheckFailure::NoDataFile),
            [single] => Ok(single),
            many => Err(PrecheckFailure::MultipleDataFiles {
                paths: many.iter().map(|f| f.path.clone()).collect(),
            }),
        }
    }

    /// Steps 2 and 3: parse the fetched text and refuse an empty record,
    /// then assemble the evaluation context.
    pub fn admit(
        pr: &PullRequestInfo,
        partition: &Partition,
        data_file: &ChangedFile,
        raw: &str,
    ) -> Result<EvaluationContext, PrecheckFailure> {
        let submission = loader::parse_submission(data_file, raw)?;
        if submission.is_empty() {
            return Err(PrecheckFailure::AllFieldsMissing {
                path: data_file.path.clone(),
            });
        }

        Ok(EvaluationContext::new(
            pr,
            data_file.path.clone(),
            submission,
            raw,
            partition.asset_paths(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::partition;

    fn pr() -> PullRequestInfo {
        PullRequestInfo {
            number: 1,
            author: "farmer".to_string(),
            head_repo: Some("farmer/cows".to_string()),
            base_repo: "herd/cows".to_string(),
        }
    }

    fn file(path: &str) -> ChangedFile {
        ChangedFile::new(path, format!("raw://{}", path))
    }

    #[test]
    fn test_zero_candidates() {
        let p = partition(&[file("images/a.png")], &SubmissionConfig::default());
        assert_eq!(
            PrecheckGate::select_data_file(&p).unwrap_err(),
            PrecheckFailure::NoDataFile
        );
    }

    #[test]
    fn test_multiple_candidates_lists_paths() {
        let p = partition(&[file("a.json"), file("b.json")], &SubmissionConfig::default());
        let err = PrecheckGate::select_data_file(&p).unwrap_err();
        assert_eq!(
            err,
            PrecheckFailure::MultipleDataFiles {
                paths: vec!["a.json".to_string(), "b.json".to_string()]
            }
        );
    }

    #[test]
    fn test_single_candidate_selected() {
        let p = partition(&[file("a.json"), file("images/a.png")], &SubmissionConfig::default());
        let selected = PrecheckGate::select_data_file(&p).expect("one candidate");
        assert_eq!(selected.path, "a.json");
    }

    #[test]
    fn test_admit_rejects_invalid_json() {
        let p = partition(&[file("a.json")], &SubmissionConfig::default());
        let err = PrecheckGate::admit(&pr(), &p, &file("a.json"), "{,}").unwrap_err();
        assert_eq!(err.kind(), "invalid_json");
    }

    #[test]
    fn test_admit_rejects_empty_record() {
        let p = partition(&[file("a.json")], &SubmissionConfig::default());
        let err = PrecheckGate::admit(&pr(), &p, &file("a.json"), "{\n\t\"colour\": \"brown\"\n}")
            .unwrap_err();
        assert_eq!(
            err,
            PrecheckFailure::AllFieldsMissing {
                path: "a.json".to_string()
            }
        );
    }

    #[test]
    fn test_admit_allows_partial_record() {
        let p = partition(&[file("a.json"), file("images/a.png")], &SubmissionConfig::default());
        let ctx = PrecheckGate::admit(&pr(), &p, &file("a.json"), r#"{"name": "A"}"#)
            .expect("partial record is admitted");
        assert_eq!(ctx.submission().name.as_deref(), Some("A"));
        assert!(ctx.assets().contains("images/a.png"));
    }

    #[test]
    fn test_messages_are_distinguishable() {
        let config = SubmissionConfig::default();
        let none = PrecheckFailure::NoDataFile.message(&config);
        let many = PrecheckFailure::MultipleDataFiles {
            paths: vec!["a.json".to_string(), "b.json".to_string()],
        }
        .message(&config);
        let empty = PrecheckFailure::AllFieldsMissing {
            path: "a.json".to_string(),
        }
        .message(&config);

        assert!(none.contains("No JSON file found"));
        assert!(many.contains("Multiple JSON files found"));
        assert!(many.ends_with("Found: a.json, b.json"));
        assert!(empty.contains("missing all required fields: name, breed, image"));
    }
}
