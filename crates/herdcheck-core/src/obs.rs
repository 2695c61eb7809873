//! Structured observability hooks for the validation lifecycle.
//!
//! This module provides:
//! - A run-scoped tracing span, [`run_span`], for instrumenting a run
//! - Emission functions for key lifecycle events: start, pre-check failure,
//!   per-rule outcome, report rendering, escalation, feedback posted or
//!   withheld
//!
//! Events are emitted at `info!` level (filter with `RUST_LOG`).

use tracing::{debug, info, warn};

/// Span tagged with the run id and PR number.
///
/// Attach it with `tracing::Instrument` rather than entering it, since a
/// run suspends on network I/O.
pub fn run_span(run_id: &str, pr_number: u64) -> tracing::Span {
    tracing::info_span!("herdcheck.run", run_id = %run_id, pr = pr_number)
}

/// Emit event: validation started for a PR.
pub fn emit_validation_started(repository: &str, pr_number: u64, author: &str) {
    info!(
        event = "validation.started",
        repository = %repository,
        pr = pr_number,
        author = %author,
    );
}

/// Emit event: the pre-check gate stopped the run.
pub fn emit_precheck_failed(kind: &str) {
    warn!(event = "precheck.failed", kind = %kind);
}

/// Emit event: a single rule was evaluated.
pub fn emit_rule_evaluated(rule: &str, passed: bool) {
    debug!(event = "rule.evaluated", rule = %rule, passed = passed);
}

/// Emit event: report rendered, with its digest and tally.
pub fn emit_report_rendered(digest: &str, passed: usize, total: usize, accepted: bool) {
    info!(
        event = "report.rendered",
        digest = %digest,
        passed = passed,
        total = total,
        accepted = accepted,
    );
}

/// Emit event: escalation notice attached.
pub fn emit_escalation_applied(prior_failures: u32, threshold: u32) {
    warn!(
        event = "escalation.applied",
        prior_failures = prior_failures,
        threshold = threshold,
    );
}

/// Emit event: report posted as a PR comment.
pub fn emit_feedback_posted(pr_number: u64) {
    info!(event = "feedback.posted", pr = pr_number);
}

/// Emit event: report rendered but not posted (dry run).
pub fn emit_feedback_withheld(pr_number: u64) {
    info!(event = "feedback.withheld", pr = pr_number);
}
