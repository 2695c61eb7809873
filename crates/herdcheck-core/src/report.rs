//! Validation report.
//!
//! A report is built exactly once per run, either from a pre-check failure
//! or from the rule engine's results, and rendered into a Markdown comment:
//!
//! ```text
//! ### 🧪 PR Validation Results for #<n>
//!
//! <one line per rule, or the single pre-check issue>
//!
//! ---
//!
//! <summary line>
//!
//! <escalation notice, failing reports only>
//! ```
//!
//! Rendering is a pure function of its inputs, so an unchanged changeset
//! and history produce a byte-identical comment (and digest).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::HerdConfig;
use crate::domain::FailureHistory;
use crate::engine::RuleResult;
use crate::escalation::Escalation;
use crate::precheck::PrecheckFailure;

/// Final outcome of a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accepted,
    Rejected,
}

impl Verdict {
    /// Process exit code: 0 accepted, 1 rejected.
    pub fn exit_code(&self) -> u8 {
        match self {
            Verdict::Accepted => 0,
            Verdict::Rejected => 1,
        }
    }
}

/// One rendered rule line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportEntry {
    pub rule: String,
    pub passed: bool,
    pub line: String,
}

/// Append-only text accumulator for the comment body.
#[derive(Debug, Default)]
struct ReportBuffer {
    body: String,
}

impl ReportBuffer {
    fn header(pr_number: u64) -> Self {
        Self {
            body: format!("### 🧪 PR Validation Results for #{}\n\n", pr_number),
        }
    }

    fn line(&mut self, line: &str) {
        self.body.push_str(line);
        self.body.push('\n');
    }

    fn separator(&mut self) {
        self.body.push_str("\n---\n\n");
    }

    fn summary(&mut self, summary: &str) {
        self.body.push_str(summary);
    }

    fn notice(&mut self, notice: &str) {
        self.body.push_str("\n\n");
        self.body.push_str(notice);
    }

    fn finish(self) -> String {
        self.body
    }
}

/// A complete, rendered validation report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationReport {
    pub pr_number: u64,
    /// Data file the rules ran against; `None` when the gate stopped
    /// before one was selected.
    pub data_file: Option<String>,
    pub precheck_failure: Option<PrecheckFailure>,
    pub entries: Vec<ReportEntry>,
    pub passed: usize,
    pub total: usize,
    pub prior_failures: u32,
    pub escalated: bool,
    pub verdict: Verdict,
    body: String,
}

impl ValidationReport {
    /// Single-issue report for a failed pre-check. Always a rejection.
    pub fn from_precheck_failure(
        pr_number: u64,
        failure: PrecheckFailure,
        history: &FailureHistory,
        config: &HerdConfig,
    ) -> Self {
        let verdict = Verdict::Rejected;
        let mut buffer = ReportBuffer::header(pr_number);
        buffer.line(&failure.message(&config.submission));
        buffer.separator();
        buffer.summary("❌ Pre-checks failed. Please fix the issue above and update your PR.");

        let notice = Escalation::from_config(&config.escalation).notice(history, verdict);
        if let Some(notice) = &notice {
            buffer.notice(notice);
        }

        let data_file = match &failure {
            PrecheckFailure::InvalidJson { path, .. }
            | PrecheckFailure::AllFieldsMissing { path } => Some(path.clone()),
            _ => None,
        };

        Self {
            pr_number,
            data_file,
            precheck_failure: Some(failure),
            entries: Vec::new(),
            passed: 0,
            total: 0,
            prior_failures: history.prior_failures,
            escalated: notice.is_some(),
            verdict,
            body: buffer.finish(),
        }
    }

    /// Report over the rule engine's results.
    pub fn from_rule_results(
        pr_number: u64,
        data_file: &str,
        results: &[RuleResult],
        history: &FailureHistory,
        config: &HerdConfig,
    ) -> Self {
        let mut buffer = ReportBuffer::header(pr_number);
        let mut entries = Vec::with_capacity(results.len());
        let mut passed = 0;

        for result in results {
            let name = result.rule.name();
            let line = match result.outcome.detail() {
                None => {
                    passed += 1;
                    format!("✅ **{}** passed!", name)
                }
                Some(detail) => detail.message(data_file, config),
            };
            buffer.line(&line);
            entries.push(ReportEntry {
                rule: name.to_string(),
                passed: result.passed(),
                line,
            });
        }

        let total = results.len();
        let verdict = if passed == total {
            Verdict::Accepted
        } else {
            Verdict::Rejected
        };

        buffer.separator();
        match verdict {
            Verdict::Accepted => buffer.summary("✅ All tests passed! Nice work on your PR! 🎉"),
            Verdict::Rejected => buffer.summary(&format!(
                "❌ {}/{} passed. Please fix the issues above and update your PR.",
                passed, total
            )),
        }

        let notice = Escalation::from_config(&config.escalation).notice(history, verdict);
        if let Some(notice) = &notice {
            buffer.notice(notice);
        }

        Self {
            pr_number,
            data_file: Some(data_file.to_string()),
            precheck_failure: None,
            entries,
            passed,
            total,
            prior_failures: history.prior_failures,
            escalated: notice.is_some(),
            verdict,
            body: buffer.finish(),
        }
    }

    /// The Markdown comment body.
    pub fn render(&self) -> &str {
        &self.body
    }

    /// SHA-256 hex digest of the rendered body.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.body.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Machine-readable summary for CI consumers.
    pub fn summary(&self, history: &FailureHistory) -> ReportSummary {
        ReportSummary {
            pr_number: self.pr_number,
            verdict: self.verdict,
            passed: self.passed,
            total: self.total,
            data_file: self.data_file.clone(),
            precheck_failure: self.precheck_failure.clone(),
            entries: self.entries.clone(),
            escalated: self.escalated,
            prior_failures: history.prior_failures,
            last_failure_at: history.last_failure_at,
            report_digest: self.digest(),
        }
    }
}

/// Serialized form written with `--summary-json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportSummary {
    pub pr_number: u64,
    pub verdict: Verdict,
    pub passed: usize,
    pub total: usize,
    pub data_file: Option<String>,
    pub precheck_failure: Option<PrecheckFailure>,
    pub entries: Vec<ReportEntry>,
    pub escalated: bool,
    pub prior_failures: u32,
    pub last_failure_at: Option<DateTime<Utc>>,
    pub report_digest: String,
}
