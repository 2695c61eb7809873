//! herdcheck - rule-based validation of crowd-sourced PR submissions
//!
//! Provides a validation engine that:
//! - Locates the single data file and its assets in a PR changeset
//! - Gates on structural pre-checks (file count, JSON, non-empty record)
//! - Runs an ordered list of independent rules over the submission
//! - Renders one report, escalating repeat failures to humans

pub mod config;
pub mod context;
pub mod domain;
pub mod engine;
pub mod error;
pub mod escalation;
pub mod fakes;
pub mod github;
pub mod loader;
pub mod obs;
pub mod pipeline;
pub mod precheck;
pub mod report;
pub mod rules;
pub mod source;
pub mod telemetry;

// Re-export key types
pub use config::{ForkPolicy, HerdConfig, IndentUnit};
pub use context::EvaluationContext;
pub use domain::{
    ChangedFile, FailureHistory, PriorFeedback, PullRequestInfo, RequiredField, Submission,
};
pub use engine::{RuleEngine, RuleResult};
pub use error::{HerdError, Result};
pub use escalation::Escalation;
pub use github::GitHubClient;
pub use pipeline::{Pipeline, PipelineOptions, Plan, ValidationRun, Validator};
pub use precheck::{PrecheckFailure, PrecheckGate};
pub use report::{ReportSummary, ValidationReport, Verdict};
pub use rules::{FailureDetail, Rule, RuleOutcome};
pub use source::PullRequestSource;
pub use telemetry::init_tracing;
