//! Repeat-offender escalation.
//!
//! Once a PR has collected enough automated rejections, failing reports get
//! a notice asking for human follow-up. The notice is advisory: it is never
//! added to an accepted report and never influences the verdict.

use crate::config::EscalationConfig;
use crate::domain::FailureHistory;
use crate::report::Verdict;

/// Threshold policy for the escalation notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Escalation {
    threshold: u32,
}

impl Escalation {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    pub fn from_config(config: &EscalationConfig) -> Self {
        Self::new(config.threshold)
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Whether a report with `verdict` should carry the notice.
    pub fn applies(&self, history: &FailureHistory, verdict: Verdict) -> bool {
        verdict == Verdict::Rejected && history.reaches(self.threshold)
    }

    /// The notice text, if it applies.
    pub fn notice(&self, history: &FailureHistory, verdict: Verdict) -> Option<String> {
        self.applies(history, verdict).then(|| {
            format!(
                "⚠️ This PR has already failed automated validation {} times. \
                 A maintainer should take a look; feel free to ask for help in the comments.",
                history.prior_failures
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_threshold_no_notice() {
        let escalation = Escalation::new(3);
        assert!(escalation
            .notice(&FailureHistory::new(2), Verdict::Rejected)
            .is_none());
    }

    #[test]
    fn test_at_threshold_on_rejection() {
        let escalation = Escalation::new(3);
        let notice = escalation
            .notice(&FailureHistory::new(3), Verdict::Rejected)
            .expect("notice at threshold");
        assert!(notice.contains("3 times"));
        assert!(notice.contains("maintainer"));
    }

    #[test]
    fn test_never_on_acceptance() {
        let escalation = Escalation::new(3);
        assert!(!escalation.applies(&FailureHistory::new(10), Verdict::Accepted));
    }

    #[test]
    fn test_zero_threshold_escalates_every_rejection() {
        let escalation = Escalation::new(0);
        assert!(escalation.applies(&FailureHistory::default(), Verdict::Rejected));
    }

    #[test]
    fn test_from_config_uses_threshold() {
        let escalation = Escalation::from_config(&EscalationConfig::default());
        assert_eq!(escalation.threshold(), 3);
    }
}
