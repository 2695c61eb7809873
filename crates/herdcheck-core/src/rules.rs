//! Submission rules.
//!
//! Each [`Rule`] is a named, pure check over an [`EvaluationContext`].
//! Rules never see each other's outcomes and never abort evaluation; a rule
//! that cannot find the data it needs fails with a detail saying so.

use serde::{Deserialize, Serialize};

use crate::config::{ForkPolicy, HerdConfig, IndentUnit};
use crate::context::EvaluationContext;
use crate::domain::RequiredField;

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// A single submission rule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    /// The PR must come from a fork, per the configured [`ForkPolicy`].
    ForkOrigin,
    /// `name`, `breed` and `image` must all be present.
    RequiredFields,
    /// `image` must live under the asset prefix.
    ImagePathPrefix,
    /// `image` must name a file added by the same changeset.
    ImageExists,
    /// `image` must be derived from `name`.
    NamingConvention,
    /// Nested lines carry exactly one indent unit.
    Indentation,
    /// Unix line endings only.
    LineEndings,
}

impl Rule {
    /// Every rule, in report order.
    pub const ALL: [Rule; 7] = [
        Rule::ForkOrigin,
        Rule::RequiredFields,
        Rule::ImagePathPrefix,
        Rule::ImageExists,
        Rule::NamingConvention,
        Rule::Indentation,
        Rule::LineEndings,
    ];

    /// Display name used in the report.
    pub fn name(&self) -> &'static str {
        match self {
            Rule::ForkOrigin => "Check PR is from Fork",
            Rule::RequiredFields => "Validate JSON Content",
            Rule::ImagePathPrefix => "Check image path",
            Rule::ImageExists => "Check image file exists",
            Rule::NamingConvention => "Check file naming convention",
            Rule::Indentation => "Check proper indentation",
            Rule::LineEndings => "Check line endings",
        }
    }

    /// Evaluate the rule.
    pub fn check(&self, ctx: &EvaluationContext, config: &HerdConfig) -> RuleOutcome {
        match self {
            Rule::ForkOrigin => check_fork_origin(ctx, &config.rules.fork_policy),
            Rule::RequiredFields => check_required_fields(ctx),
            Rule::ImagePathPrefix => check_image_prefix(ctx, &config.submission.asset_prefix),
            Rule::ImageExists => check_image_exists(ctx),
            Rule::NamingConvention => check_naming(ctx, config),
            Rule::Indentation => check_indentation(ctx.raw(), config.rules.indent),
            Rule::LineEndings => check_line_endings(ctx.raw()),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of one rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RuleOutcome {
    Pass,
    Fail { detail: FailureDetail },
}

impl RuleOutcome {
    fn fail(detail: FailureDetail) -> Self {
        RuleOutcome::Fail { detail }
    }

    pub fn passed(&self) -> bool {
        matches!(self, RuleOutcome::Pass)
    }

    pub fn detail(&self) -> Option<&FailureDetail> {
        match self {
            RuleOutcome::Pass => None,
            RuleOutcome::Fail { detail } => Some(detail),
        }
    }
}

/// The data behind a failure. Rendering to text is deferred to
/// [`FailureDetail::message`] so tests can assert on the data itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureDetail {
    /// Head and base are the same repository.
    SameRepository { repository: String },
    /// Base is not the canonical repository, or head is the canonical one.
    NotCanonicalFork {
        canonical: String,
        head: Option<String>,
        base: String,
    },
    MissingFields { fields: Vec<RequiredField> },
    ImageOutsidePrefix { image: Option<String> },
    ImageNotInChangeset { image: Option<String> },
    /// `name` absent, so no expected image name can be derived.
    NameUnavailable,
    ImageNameMismatch { expected_stem: String },
    /// First line (1-based) that breaks the indentation rule.
    BadIndentation { line: usize },
    CrlfLineEndings,
}

impl FailureDetail {
    /// Report line for this failure.
    pub fn message(&self, data_file: &str, config: &HerdConfig) -> String {
        let prefix = &config.submission.asset_prefix;
        match self {
            FailureDetail::SameRepository { .. } => "❌ It looks like your PR is from a branch in the same repo. You need to open it **from your fork** to the main repo.".to_string(),
            FailureDetail::NotCanonicalFork { canonical, .. } => format!(
                "❌ Your PR must be opened **from your fork** against **{}**.",
                canonical
            ),
            FailureDetail::MissingFields { fields } => {
                let names: Vec<&str> = fields.iter().map(|f| f.as_str()).collect();
                format!("❌ File **{}** is missing: {}", data_file, names.join(", "))
            }
            FailureDetail::ImageOutsidePrefix { .. } => format!(
                "❌ Image path in **{}** must start with \"{}\".",
                data_file, prefix
            ),
            FailureDetail::ImageNotInChangeset { image: Some(image) } => format!(
                "❌ Image file **{}** specified in **{}** does not exist in the PR.",
                image, data_file
            ),
            FailureDetail::ImageNotInChangeset { image: None } => format!(
                "❌ No image file is specified in **{}**.",
                data_file
            ),
            FailureDetail::NameUnavailable => format!(
                "❌ Image file name in **{}** should be based on the cow's name, but no name is given.",
                data_file
            ),
            FailureDetail::ImageNameMismatch { expected_stem } => {
                let mut alternatives = config
                    .submission
                    .image_extensions
                    .iter()
                    .map(|ext| format!(".{}", ext));
                let first = alternatives.next().unwrap_or_default();
                let rest: Vec<String> = alternatives.collect();
                let or_rest = if rest.is_empty() {
                    String::new()
                } else {
                    format!(" or {}", rest.join(" or "))
                };
                format!(
                    "❌ Image file name in **{}** should be based on the cow's name. Expected: {}{}{}{}",
                    data_file, prefix, expected_stem, first, or_rest
                )
            }
            FailureDetail::BadIndentation { line } => format!(
                "❌ File **{}** is not properly indented with {} (first offending line: {}).",
                data_file,
                config.rules.indent.describe(),
                line
            ),
            FailureDetail::CrlfLineEndings => format!(
                "❌ File **{}** contains Windows-style line endings (CRLF). Please convert to Unix-style (LF) line endings.",
                data_file
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

fn check_fork_origin(ctx: &EvaluationContext, policy: &ForkPolicy) -> RuleOutcome {
    match policy {
        ForkPolicy::DistinctFromBase => match ctx.head_repo() {
            Some(head) if head == ctx.base_repo() => {
                RuleOutcome::fail(FailureDetail::SameRepository {
                    repository: head.to_string(),
                })
            }
            _ => RuleOutcome::Pass,
        },
        ForkPolicy::Canonical { repository } => {
            let base_ok = ctx.base_repo() == repository;
            let head_ok = ctx.head_repo() != Some(repository.as_str());
            if base_ok && head_ok {
                RuleOutcome::Pass
            } else {
                RuleOutcome::fail(FailureDetail::NotCanonicalFork {
                    canonical: repository.clone(),
                    head: ctx.head_repo().map(str::to_string),
                    base: ctx.base_repo().to_string(),
                })
            }
        }
    }
}

fn check_required_fields(ctx: &EvaluationContext) -> RuleOutcome {
    let fields = ctx.submission().missing_fields();
    if fields.is_empty() {
        RuleOutcome::Pass
    } else {
        RuleOutcome::fail(FailureDetail::MissingFields { fields })
    }
}

fn check_image_prefix(ctx: &EvaluationContext, prefix: &str) -> RuleOutcome {
    match ctx.submission().image.as_deref() {
        Some(image) if image.starts_with(prefix) => RuleOutcome::Pass,
        image => RuleOutcome::fail(FailureDetail::ImageOutsidePrefix {
            image: image.map(str::to_string),
        }),
    }
}

fn check_image_exists(ctx: &EvaluationContext) -> RuleOutcome {
    if ctx.image_reference_resolves() {
        RuleOutcome::Pass
    } else {
        RuleOutcome::fail(FailureDetail::ImageNotInChangeset {
            image: ctx.submission().image.clone(),
        })
    }
}

/// Lowercase, spaces to underscores.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Image paths accepted for `name` under the given config.
pub fn expected_image_paths(name: &str, config: &HerdConfig) -> Vec<String> {
    let stem = normalize_name(name);
    config
        .submission
        .image_extensions
        .iter()
        .map(|ext| format!("{}{}.{}", config.submission.asset_prefix, stem, ext))
        .collect()
}

fn check_naming(ctx: &EvaluationContext, config: &HerdConfig) -> RuleOutcome {
    let Some(name) = ctx.submission().name.as_deref() else {
        return RuleOutcome::fail(FailureDetail::NameUnavailable);
    };

    let image = ctx.submission().image.as_deref();
    if expected_image_paths(name, config)
        .iter()
        .any(|candidate| Some(candidate.as_str()) == image)
    {
        RuleOutcome::Pass
    } else {
        RuleOutcome::fail(FailureDetail::ImageNameMismatch {
            expected_stem: normalize_name(name),
        })
    }
}

fn check_indentation(raw: &str, unit: IndentUnit) -> RuleOutcome {
    let single = unit.marker();
    let double = single.repeat(2);

    let offending = raw.split('\n').position(|line| {
        let trimmed = line.trim();
        if trimmed == "{" || trimmed == "}" || trimmed.is_empty() {
            return false;
        }
        !(line.starts_with(&single) && !line.starts_with(&double))
    });

    match offending {
        None => RuleOutcome::Pass,
        Some(index) => RuleOutcome::fail(FailureDetail::BadIndentation { line: index + 1 }),
    }
}

fn check_line_endings(raw: &str) -> RuleOutcome {
    if raw.contains("\r\n") {
        RuleOutcome::fail(FailureDetail::CrlfLineEndings)
    } else {
        RuleOutcome::Pass
    }
}
