//! herdcheck - PR submission validator CLI
//!
//! ## Commands
//!
//! - `validate`: validate a pull request and post the report as a comment
//! - `check`: validate a local data file against a local asset directory
//! - `config`: print the effective configuration
//!
//! Exit status is 0 when the submission is accepted, 1 when it is rejected
//! or the run fails.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use herdcheck_core::{
    ChangedFile, FailureHistory, ForkPolicy, GitHubClient, HerdConfig, IndentUnit, Pipeline,
    PipelineOptions, PullRequestInfo, ReportSummary, Validator, Verdict,
};
use tracing::{error, info, Level};

#[derive(Parser)]
#[command(name = "herdcheck")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Validate crowd-sourced PR submissions", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a pull request and post the report
    Validate {
        /// Repository in owner/name form
        #[arg(long, env = "GITHUB_REPOSITORY")]
        repo: String,

        /// Pull request number
        #[arg(long, env = "PR_NUMBER")]
        pr: u64,

        /// API token
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: String,

        /// API base URL (GitHub Enterprise)
        #[arg(long, env = "GITHUB_API_URL")]
        api_url: Option<String>,

        /// Render the report to stdout instead of posting it
        #[arg(long)]
        dry_run: bool,

        /// Write a JSON summary of the run to this path
        #[arg(long)]
        summary_json: Option<PathBuf>,

        #[command(flatten)]
        rules: RuleOverrides,
    },

    /// Validate a local data file before opening a PR
    Check {
        /// Data file, relative to --root
        file: PathBuf,

        /// Repository root the asset prefix is resolved against
        #[arg(long, default_value = ".")]
        root: PathBuf,

        #[command(flatten)]
        rules: RuleOverrides,
    },

    /// Print the effective configuration as JSON
    Config {
        #[command(flatten)]
        rules: RuleOverrides,
    },
}

/// Configuration file plus per-run overrides.
#[derive(Args, Clone, Default)]
struct RuleOverrides {
    /// TOML configuration file
    #[arg(short, long, env = "HERDCHECK_CONFIG")]
    config: Option<PathBuf>,

    /// Indent with this many spaces instead of one tab
    #[arg(long)]
    indent_spaces: Option<usize>,

    /// Require PRs to target this repository (owner/name) from a fork
    #[arg(long)]
    canonical_repo: Option<String>,

    /// Prior automated rejections before the escalation notice appears
    #[arg(long)]
    escalation_threshold: Option<u32>,
}

impl RuleOverrides {
    fn resolve(&self) -> Result<HerdConfig> {
        let mut config = match &self.config {
            Some(path) => HerdConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => HerdConfig::default(),
        };

        if let Some(width) = self.indent_spaces {
            config.rules.indent = IndentUnit::Spaces(width);
        }
        if let Some(repository) = &self.canonical_repo {
            config.rules.fork_policy = ForkPolicy::Canonical {
                repository: repository.clone(),
            };
        }
        if let Some(threshold) = self.escalation_threshold {
            config.escalation.threshold = threshold;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    herdcheck_core::init_tracing(cli.json, level);

    let outcome = match cli.command {
        Commands::Validate {
            repo,
            pr,
            token,
            api_url,
            dry_run,
            summary_json,
            rules,
        } => {
            cmd_validate(
                &repo,
                pr,
                &token,
                api_url,
                dry_run,
                summary_json.as_deref(),
                &rules,
            )
            .await
        }
        Commands::Check { file, root, rules } => cmd_check(&file, &root, &rules),
        Commands::Config { rules } => cmd_config(&rules).map(|_| Verdict::Accepted),
    };

    match outcome {
        Ok(verdict) => ExitCode::from(verdict.exit_code()),
        Err(e) => {
            error!(error = %format!("{:#}", e), "Validation run failed");
            ExitCode::FAILURE
        }
    }
}

async fn cmd_validate(
    repo: &str,
    pr: u64,
    token: &str,
    api_url: Option<String>,
    dry_run: bool,
    summary_json: Option<&Path>,
    rules: &RuleOverrides,
) -> Result<Verdict> {
    let mut config = rules.resolve()?;
    if let Some(api_url) = api_url {
        config.github.api_url = api_url;
    }

    let client = GitHubClient::new(repo, token, &config.github, &config.escalation)
        .context("Failed to create GitHub client")?;

    let run = Pipeline::run(Arc::new(client), pr, &config, PipelineOptions { dry_run })
        .await
        .with_context(|| format!("Failed to validate {}#{}", repo, pr))?;

    if dry_run {
        println!("{}", run.report.render());
    }
    if let Some(path) = summary_json {
        write_summary(path, &run.summary())?;
    }

    info!(
        run_id = %run.run_id,
        verdict = ?run.verdict(),
        posted = run.posted,
        "Validation finished"
    );
    Ok(run.verdict())
}

fn cmd_check(file: &Path, root: &Path, rules: &RuleOverrides) -> Result<Verdict> {
    let config = rules.resolve()?;

    let data_path = root.join(file);
    let raw = std::fs::read_to_string(&data_path)
        .with_context(|| format!("Failed to read {}", data_path.display()))?;

    let mut files = vec![local_file(root, file)];
    files.extend(list_assets(root, &config.submission.asset_prefix)?);

    // Local files have no PR; the fork rule sees a distinct head.
    let base_repo = match &config.rules.fork_policy {
        ForkPolicy::Canonical { repository } => repository.clone(),
        ForkPolicy::DistinctFromBase => "local/checkout".to_string(),
    };
    let pr = PullRequestInfo {
        number: 0,
        author: "local".to_string(),
        head_repo: None,
        base_repo,
    };

    let report = Validator::new(config).evaluate(&pr, &files, &raw, &FailureHistory::default());
    println!("{}", report.render());
    Ok(report.verdict)
}

fn cmd_config(rules: &RuleOverrides) -> Result<()> {
    let config = rules.resolve()?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn local_file(root: &Path, relative: &Path) -> ChangedFile {
    let path = relative.to_string_lossy().replace('\\', "/");
    let raw_url = format!("file://{}", root.join(relative).display());
    ChangedFile::new(path, raw_url)
}

/// Files directly under `<root>/<asset_prefix>`, as repository-relative paths.
fn list_assets(root: &Path, asset_prefix: &str) -> Result<Vec<ChangedFile>> {
    let dir = root.join(asset_prefix);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut assets = Vec::new();
    for entry in std::fs::read_dir(&dir)
        .with_context(|| format!("Failed to list {}", dir.display()))?
    {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            let relative = Path::new(asset_prefix).join(entry.file_name());
            assets.push(local_file(root, &relative));
        }
    }
    assets.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(assets)
}

fn write_summary(path: &Path, summary: &ReportSummary) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write summary to {}", path.display()))?;
    Ok(())
}
