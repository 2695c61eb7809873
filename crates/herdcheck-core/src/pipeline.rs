//! Validation pipeline orchestration.
//!
//! Loader → pre-check gate → rule engine → report, in that order. The
//! [`Validator`] holds the pure part; [`Pipeline::run`] wraps it with the
//! collaborator I/O (metadata fetch, one raw-content fetch, one post).

use std::sync::Arc;

use tracing::{info, Instrument};
use uuid::Uuid;

use crate::config::HerdConfig;
use crate::domain::{ChangedFile, FailureHistory, PullRequestInfo};
use crate::engine::RuleEngine;
use crate::error::Result;
use crate::loader::{self, Partition};
use crate::obs;
use crate::precheck::{PrecheckFailure, PrecheckGate};
use crate::report::{ReportSummary, ValidationReport, Verdict};
use crate::source::PullRequestSource;

/// What the gate needs next after looking at the file list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Exactly one data file; fetch its content and call
    /// [`Validator::finish`].
    Fetch {
        data_file: ChangedFile,
        partition: Partition,
    },
    /// Stopped by the candidate-count pre-check.
    Reject(PrecheckFailure),
}

/// Pure validation: no I/O, deterministic for equal inputs.
#[derive(Debug, Clone)]
pub struct Validator {
    config: HerdConfig,
    engine: RuleEngine,
}

impl Validator {
    pub fn new(config: HerdConfig) -> Self {
        Self {
            config,
            engine: RuleEngine::standard(),
        }
    }

    pub fn with_engine(mut self, engine: RuleEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn config(&self) -> &HerdConfig {
        &self.config
    }

    /// Partition the changeset and run the candidate-count pre-check.
    pub fn plan(&self, files: &[ChangedFile]) -> Plan {
        let partition = loader::partition(files, &self.config.submission);
        match PrecheckGate::select_data_file(&partition) {
            Ok(data_file) => Plan::Fetch {
                data_file: data_file.clone(),
                partition,
            },
            Err(failure) => Plan::Reject(failure),
        }
    }

    /// Remaining pre-checks, then every rule, then the report.
    pub fn finish(
        &self,
        pr: &PullRequestInfo,
        data_file: &ChangedFile,
        partition: &Partition,
        raw: &str,
        history: &FailureHistory,
    ) -> ValidationReport {
        match PrecheckGate::admit(pr, partition, data_file, raw) {
            Ok(ctx) => {
                let results = self.engine.evaluate(&ctx, &self.config);
                ValidationReport::from_rule_results(
                    pr.number,
                    ctx.data_file(),
                    &results,
                    history,
                    &self.config,
                )
            }
            Err(failure) => self.reject(pr, failure, history),
        }
    }

    /// Single-issue report for a pre-check failure.
    pub fn reject(
        &self,
        pr: &PullRequestInfo,
        failure: PrecheckFailure,
        history: &FailureHistory,
    ) -> ValidationReport {
        obs::emit_precheck_failed(failure.kind());
        ValidationReport::from_precheck_failure(pr.number, failure, history, &self.config)
    }

    /// One-shot evaluation when the data file's content is already at hand.
    ///
    /// `raw` is consulted only if the changeset has exactly one data-file
    /// candidate.
    pub fn evaluate(
        &self,
        pr: &PullRequestInfo,
        files: &[ChangedFile],
        raw: &str,
        history: &FailureHistory,
    ) -> ValidationReport {
        match self.plan(files) {
            Plan::Fetch {
                data_file,
                partition,
            } => self.finish(pr, &data_file, &partition, raw, history),
            Plan::Reject(failure) => self.reject(pr, failure, history),
        }
    }
}

/// Options that change delivery, not evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Render the report but do not post it.
    pub dry_run: bool,
}

/// Result of a complete pipeline execution.
#[derive(Debug, Clone)]
pub struct ValidationRun {
    /// Random id attached to this run's tracing span.
    pub run_id: String,
    pub pull_request: PullRequestInfo,
    pub history: FailureHistory,
    pub report: ValidationReport,
    /// Whether the report was posted to the PR.
    pub posted: bool,
}

impl ValidationRun {
    pub fn verdict(&self) -> Verdict {
        self.report.verdict
    }

    pub fn summary(&self) -> ReportSummary {
        self.report.summary(&self.history)
    }
}

/// Validation pipeline orchestrator.
pub struct Pipeline;

impl Pipeline {
    /// Validate PR `number` and deliver exactly one report.
    ///
    /// Upstream failures (metadata, content fetch, posting) are returned as
    /// errors; no report is synthesized for them.
    pub async fn run(
        source: Arc<dyn PullRequestSource>,
        number: u64,
        config: &HerdConfig,
        options: PipelineOptions,
    ) -> Result<ValidationRun> {
        let run_id = Uuid::new_v4().to_string();
        let span = obs::run_span(&run_id, number);
        Self::run_inner(source, number, config, options, run_id)
            .instrument(span)
            .await
    }

    async fn run_inner(
        source: Arc<dyn PullRequestSource>,
        number: u64,
        config: &HerdConfig,
        options: PipelineOptions,
        run_id: String,
    ) -> Result<ValidationRun> {
        let pull_request = source.fetch_pull_request(number).await?;
        obs::emit_validation_started(source.repository(), number, &pull_request.author);

        let files = source.fetch_changed_files(number).await?;
        let feedback = source.fetch_prior_feedback(number).await?;
        let history = FailureHistory::from_feedback(&feedback);
        info!(
            files = files.len(),
            prior_failures = history.prior_failures,
            "Loaded changeset"
        );

        let validator = Validator::new(config.clone());
        let report = match validator.plan(&files) {
            Plan::Fetch {
                data_file,
                partition,
            } => {
                let raw = source.fetch_raw_content(&data_file.raw_url).await?;
                validator.finish(&pull_request, &data_file, &partition, &raw, &history)
            }
            Plan::Reject(failure) => validator.reject(&pull_request, failure, &history),
        };

        if report.escalated {
            obs::emit_escalation_applied(history.prior_failures, config.escalation.threshold);
        }
        obs::emit_report_rendered(
            &report.digest(),
            report.passed,
            report.total,
            report.verdict == Verdict::Accepted,
        );

        if options.dry_run {
            obs::emit_feedback_withheld(number);
        } else {
            source.post_feedback(number, report.render()).await?;
            obs::emit_feedback_posted(number);
        }

        Ok(ValidationRun {
            run_id,
            pull_request,
            history,
            report,
            posted: !options.dry_run,
        })
    }
}
