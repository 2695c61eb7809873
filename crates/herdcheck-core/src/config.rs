//! Validation configuration.
//!
//! Every knob the rule engine and reporter consult lives here. Defaults
//! reproduce the canonical submission layout (`<name>.json` plus
//! `images/<name>.png|jpg`, tab indentation, fork-only PRs, escalation after
//! three automated rejections). A TOML file can override any section:
//!
//! ```toml
//! [submission]
//! asset_prefix = "images/"
//!
//! [rules]
//! indent = { spaces = 4 }
//! fork_policy = { kind = "canonical", repository = "herd/cows" }
//!
//! [escalation]
//! threshold = 3
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HerdError, Result};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HerdConfig {
    pub submission: SubmissionConfig,
    pub rules: RulesConfig,
    pub escalation: EscalationConfig,
    pub github: GitHubConfig,
}

impl HerdConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: HerdConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Reject settings the engine cannot evaluate meaningfully.
    pub fn validate(&self) -> Result<()> {
        if self.submission.data_suffix.is_empty() {
            return Err(HerdError::Config(
                "submission.data_suffix must not be empty".to_string(),
            ));
        }
        if self.submission.asset_prefix.is_empty() {
            return Err(HerdError::Config(
                "submission.asset_prefix must not be empty".to_string(),
            ));
        }
        if self.submission.image_extensions.is_empty() {
            return Err(HerdError::Config(
                "submission.image_extensions must list at least one extension".to_string(),
            ));
        }
        if let IndentUnit::Spaces(0) = self.rules.indent {
            return Err(HerdError::Config(
                "rules.indent spaces width must be at least 1".to_string(),
            ));
        }
        if let ForkPolicy::Canonical { repository } = &self.rules.fork_policy {
            if repository.split_once('/').map_or(true, |(o, r)| o.is_empty() || r.is_empty()) {
                return Err(HerdError::InvalidRepository(repository.clone()));
            }
        }
        if self.escalation.failure_marker.is_empty() {
            return Err(HerdError::Config(
                "escalation.failure_marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where submissions live inside a changeset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Filename suffix identifying the structured data file.
    pub data_suffix: String,
    /// Path prefix of the asset directory (including the trailing slash).
    pub asset_prefix: String,
    /// Accepted image extensions, without the dot.
    pub image_extensions: Vec<String>,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            data_suffix: ".json".to_string(),
            asset_prefix: "images/".to_string(),
            image_extensions: vec!["png".to_string(), "jpg".to_string()],
        }
    }
}

/// Inputs to rules whose comparison target varies between deployments.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RulesConfig {
    pub indent: IndentUnit,
    pub fork_policy: ForkPolicy,
}

/// The canonical single-level indentation marker.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IndentUnit {
    #[default]
    Tab,
    Spaces(usize),
}

impl IndentUnit {
    /// The literal text of one indent unit.
    pub fn marker(&self) -> String {
        match self {
            IndentUnit::Tab => "\t".to_string(),
            IndentUnit::Spaces(width) => " ".repeat(*width),
        }
    }

    /// Human wording used in failure messages ("1 tab", "4 spaces").
    pub fn describe(&self) -> String {
        match self {
            IndentUnit::Tab => "1 tab".to_string(),
            IndentUnit::Spaces(1) => "1 space".to_string(),
            IndentUnit::Spaces(width) => format!("{} spaces", width),
        }
    }
}

/// How the PR's origin is judged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForkPolicy {
    /// Head repository must differ from the base repository.
    #[default]
    DistinctFromBase,
    /// Base must be this repository and head must not be.
    Canonical { repository: String },
}

/// Repeat-offender escalation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EscalationConfig {
    /// Prior automated rejections at or above which the notice is appended.
    pub threshold: u32,
    /// Substring marking an automated comment as a rejection.
    pub failure_marker: String,
    /// Login of the account that posts validation reports.
    pub bot_login: String,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            threshold: 3,
            failure_marker: "❌".to_string(),
            bot_login: "github-actions[bot]".to_string(),
        }
    }
}

/// Code-hosting API settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            timeout_secs: 30,
            user_agent: concat!("herdcheck/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = HerdConfig::default();
        assert_eq!(config.submission.data_suffix, ".json");
        assert_eq!(config.submission.asset_prefix, "images/");
        assert_eq!(config.rules.indent, IndentUnit::Tab);
        assert_eq!(config.rules.fork_policy, ForkPolicy::DistinctFromBase);
        assert_eq!(config.escalation.threshold, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_document_is_default() {
        let config = HerdConfig::from_toml_str("").expect("empty config");
        assert_eq!(config, HerdConfig::default());
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let config = HerdConfig::from_toml_str(
            r#"
            [rules]
            indent = { spaces = 4 }
            fork_policy = { kind = "canonical", repository = "herd/cows" }

            [escalation]
            threshold = 5
            "#,
        )
        .expect("parse config");

        assert_eq!(config.rules.indent, IndentUnit::Spaces(4));
        assert_eq!(
            config.rules.fork_policy,
            ForkPolicy::Canonical {
                repository: "herd/cows".to_string()
            }
        );
        assert_eq!(config.escalation.threshold, 5);
        assert_eq!(config.escalation.failure_marker, "❌");
        assert_eq!(config.submission.asset_prefix, "images/");
    }

    #[test]
    fn test_tab_indent_from_string() {
        let config = HerdConfig::from_toml_str("[rules]\nindent = \"tab\"\n").expect("parse");
        assert_eq!(config.rules.indent, IndentUnit::Tab);
    }

    #[test]
    fn test_zero_width_indent_rejected() {
        let err = HerdConfig::from_toml_str("[rules]\nindent = { spaces = 0 }\n").unwrap_err();
        assert!(matches!(err, HerdError::Config(_)));
    }

    #[test]
    fn test_malformed_canonical_repository_rejected() {
        let err = HerdConfig::from_toml_str(
            "[rules]\nfork_policy = { kind = \"canonical\", repository = \"cows\" }\n",
        )
        .unwrap_err();
        assert!(matches!(err, HerdError::InvalidRepository(r) if r == "cows"));
    }

    #[test]
    fn test_empty_extensions_rejected() {
        let err = HerdConfig::from_toml_str("[submission]\nimage_extensions = []\n").unwrap_err();
        assert!(err.to_string().contains("image_extensions"));
    }

    #[test]
    fn test_empty_asset_prefix_rejected() {
        let err = HerdConfig::from_toml_str("[submission]\nasset_prefix = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("asset_prefix"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "[submission]\nasset_prefix = \"assets/\"").expect("write");

        let config = HerdConfig::load(file.path()).expect("load");
        assert_eq!(config.submission.asset_prefix, "assets/");
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = HerdConfig::load(Path::new("/nonexistent/herdcheck.toml")).unwrap_err();
        assert!(matches!(err, HerdError::Io(_)));
    }

    #[test]
    fn test_indent_unit_wording() {
        assert_eq!(IndentUnit::Tab.marker(), "\t");
        assert_eq!(IndentUnit::Tab.describe(), "1 tab");
        assert_eq!(IndentUnit::Spaces(4).marker(), "    ");
        assert_eq!(IndentUnit::Spaces(4).describe(), "4 spaces");
        assert_eq!(IndentUnit::Spaces(1).describe(), "1 space");
    }
}
