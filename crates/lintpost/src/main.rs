//! CLI for posting ESLint results to Bitbucket pull requests
//!
//! Run `lintpost --help` for usage information.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{builder::FalseyValueParser, ArgAction, Parser};
use lintpost::config::{
    ENV_BITBUCKET_PASSWORD, ENV_BITBUCKET_PROJECT, ENV_BITBUCKET_REPOSITORY, ENV_BITBUCKET_URL,
    ENV_BITBUCKET_USER, ENV_JOB_NAME, ENV_LEGACY_AUTH_PADDING, ENV_LINT_RESULTS_PATH,
    ENV_PULL_REQUEST_ID,
};
use lintpost::{AuthEncoding, RunOptions, RunReport};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "lintpost")]
#[command(about = "Post ESLint results as Bitbucket pull request comments")]
#[command(version)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Bitbucket Server base URL
    #[arg(long, env = ENV_BITBUCKET_URL)]
    bitbucket_url: Option<String>,

    /// ESLint JSON results file, relative to the working directory
    #[arg(long, env = ENV_LINT_RESULTS_PATH)]
    lint_results_path: Option<PathBuf>,

    /// Job name in `<repo>/PR-<number>` form
    #[arg(long, env = ENV_JOB_NAME)]
    job_name: Option<String>,

    /// Bitbucket user
    #[arg(long, env = ENV_BITBUCKET_USER)]
    user: Option<String>,

    /// Bitbucket password or HTTP access token
    #[arg(long, env = ENV_BITBUCKET_PASSWORD, hide_env_values = true)]
    password: Option<String>,

    /// Project key
    #[arg(long, env = ENV_BITBUCKET_PROJECT)]
    project: Option<String>,

    /// Repository slug
    #[arg(long, env = ENV_BITBUCKET_REPOSITORY)]
    repository: Option<String>,

    /// Pull request id
    #[arg(long, env = ENV_PULL_REQUEST_ID)]
    pull_request_id: Option<String>,

    /// Post one comment per finding (default: true)
    #[arg(long, action = ArgAction::Set)]
    comment_file_level: Option<bool>,

    /// Post the summary comment (default: true)
    #[arg(long, action = ArgAction::Set)]
    comment_top_level: Option<bool>,

    /// Attach a task to the summary comment (default: true)
    #[arg(long, action = ArgAction::Set)]
    create_task: Option<bool>,

    /// Include warnings in inline comments (default: true)
    #[arg(long, action = ArgAction::Set)]
    warnings: Option<bool>,

    /// Log requests instead of sending them
    #[arg(long)]
    debug: bool,

    /// Maximum inline comment requests in flight
    #[arg(long)]
    max_concurrent_requests: Option<usize>,

    /// Base URL for rule documentation links
    #[arg(long)]
    rule_docs_url: Option<String>,

    /// Append `=` to the Basic credentials, for servers set up for older reporters
    #[arg(long, env = ENV_LEGACY_AUTH_PADDING, value_parser = FalseyValueParser::new())]
    legacy_auth_padding: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn into_options(self) -> RunOptions {
        RunOptions {
            base_url: non_empty(self.bitbucket_url),
            lint_results_path: self
                .lint_results_path
                .filter(|path| !path.as_os_str().is_empty()),
            job_name: non_empty(self.job_name),
            password: non_empty(self.password),
            project: non_empty(self.project),
            pull_request_id: non_empty(self.pull_request_id),
            repository: non_empty(self.repository),
            user: non_empty(self.user),
            comment_file_level: self.comment_file_level,
            comment_top_level: self.comment_top_level,
            create_task: self.create_task,
            debug: self.debug.then_some(true),
            warnings: self.warnings,
            max_concurrent_requests: self.max_concurrent_requests,
            rule_docs_url: self.rule_docs_url,
            auth_encoding: self
                .legacy_auth_padding
                .then_some(AuthEncoding::LegacyTrailingPad),
        }
    }
}

/// An exported but empty variable counts as unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    let options = cli.into_options();

    match lintpost::resolve_and_run(options, &cwd).await? {
        RunReport::NotPullRequest => info!("Not a pull request build, nothing to do"),
        RunReport::NoResults => info!("No lint results to report"),
        RunReport::Delivered(report) if report.failed > 0 => warn!(
            delivered = report.delivered,
            failed = report.failed,
            "Some lint comments could not be posted"
        ),
        RunReport::Delivered(report) => info!(delivered = report.delivered, "Lint report posted"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_environment_bindings() {
        let cmd = Cli::command();
        let env_of = |id: &str| {
            cmd.get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_env())
                .map(|name| name.to_string_lossy().into_owned())
        };

        assert_eq!(env_of("bitbucket_url").as_deref(), Some(ENV_BITBUCKET_URL));
        assert_eq!(env_of("password").as_deref(), Some(ENV_BITBUCKET_PASSWORD));
        assert_eq!(env_of("job_name").as_deref(), Some(ENV_JOB_NAME));
        assert_eq!(
            env_of("legacy_auth_padding").as_deref(),
            Some(ENV_LEGACY_AUTH_PADDING)
        );
        assert_eq!(env_of("debug"), None);
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let cli = Cli::try_parse_from([
            "lintpost",
            "--bitbucket-url",
            "",
            "--user",
            "ci",
            "--legacy-auth-padding",
        ])
        .unwrap();
        let options = cli.into_options();

        assert_eq!(options.base_url, None);
        assert_eq!(options.user.as_deref(), Some("ci"));
        assert_eq!(options.auth_encoding, Some(AuthEncoding::LegacyTrailingPad));
    }
}
