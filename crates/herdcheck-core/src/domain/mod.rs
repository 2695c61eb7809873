//! Domain models for herdcheck.
//!
//! Canonical definitions for the entities a validation run touches:
//! - `Submission`: the record parsed from the PR's data file
//! - `PullRequestInfo` / `ChangedFile`: changeset metadata from the host
//! - `PriorFeedback` / `FailureHistory`: earlier automated verdicts

pub mod pull_request;
pub mod submission;

pub use pull_request::{ChangedFile, FailureHistory, PriorFeedback, PullRequestInfo};
pub use submission::{RequiredField, Submission};
