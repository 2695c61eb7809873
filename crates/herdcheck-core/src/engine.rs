//! Rule engine.
//!
//! Runs an ordered list of [`Rule`]s against one [`EvaluationContext`].
//! There is no short-circuit: every rule runs and produces exactly one
//! [`RuleResult`], in list order.

use serde::{Deserialize, Serialize};

use crate::config::HerdConfig;
use crate::context::EvaluationContext;
use crate::obs;
use crate::rules::{Rule, RuleOutcome};

/// Outcome of one rule, tagged with the rule that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleResult {
    pub rule: Rule,
    pub outcome: RuleOutcome,
}

impl RuleResult {
    pub fn passed(&self) -> bool {
        self.outcome.passed()
    }
}

/// An ordered, fixed rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleEngine {
    rules: Vec<Rule>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleEngine {
    /// All rules in canonical report order.
    pub fn standard() -> Self {
        Self {
            rules: Rule::ALL.to_vec(),
        }
    }

    /// A custom list. Duplicates are kept; each entry reports separately.
    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Evaluate every rule against `ctx`.
    pub fn evaluate(&self, ctx: &EvaluationContext, config: &HerdConfig) -> Vec<RuleResult> {
        self.rules
            .iter()
            .map(|rule| {
                let outcome = rule.check(ctx, config);
                obs::emit_rule_evaluated(rule.name(), outcome.passed());
                RuleResult {
                    rule: *rule,
                    outcome,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PullRequestInfo, RequiredField, Submission};
    use crate::rules::FailureDetail;
    use std::collections::BTreeSet;

    fn ctx(raw: &str, assets: &[&str]) -> EvaluationContext {
        let pr = PullRequestInfo {
            number: 3,
            author: "farmer".to_string(),
            head_repo: Some("farmer/cows".to_string()),
            base_repo: "herd/cows".to_string(),
        };
        let submission = Submission::parse(raw).expect("json");
        let assets: BTreeSet<String> = assets.iter().map(|a| a.to_string()).collect();
        EvaluationContext::new(&pr, "daisy.json", submission, raw, assets)
    }

    #[test]
    fn test_standard_engine_runs_every_rule_in_order() {
        let raw = "{\n\t\"name\": \"Daisy\",\n\t\"breed\": \"Angus\",\n\t\"image\": \"images/daisy.jpg\"\n}\n";
        let results = RuleEngine::standard().evaluate(&ctx(raw, &["images/daisy.jpg"]), &HerdConfig::default());

        let order: Vec<Rule> = results.iter().map(|r| r.rule).collect();
        assert_eq!(order, Rule::ALL.to_vec());
        assert!(results.iter().all(RuleResult::passed));
    }

    #[test]
    fn test_no_short_circuit_after_failure() {
        // breed missing, CRLF endings, image not in changeset
        let raw = "{\r\n\t\"name\": \"Daisy\",\r\n\t\"image\": \"images/daisy.jpg\"\r\n}\r\n";
        let results = RuleEngine::standard().evaluate(&ctx(raw, &[]), &HerdConfig::default());

        assert_eq!(results.len(), Rule::ALL.len());
        let failed: Vec<Rule> = results.iter().filter(|r| !r.passed()).map(|r| r.rule).collect();
        assert_eq!(
            failed,
            vec![Rule::RequiredFields, Rule::ImageExists, Rule::LineEndings]
        );
        assert_eq!(
            results[1].outcome.detail(),
            Some(&FailureDetail::MissingFields {
                fields: vec![RequiredField::Breed]
            })
        );
    }

    #[test]
    fn test_custom_rule_list() {
        let engine = RuleEngine::with_rules(vec![Rule::LineEndings]);
        let results = engine.evaluate(&ctx("{}", &[]), &HerdConfig::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].rule, Rule::LineEndings);
    }
}
