//! Run configuration.
//!
//! [`RunOptions`] carries whatever the caller supplied explicitly. Missing
//! values are filled from named environment variables through
//! [`RunOptions::with_env_defaults`], which takes the lookup as a function so
//! that nothing below the binary entry point reads process state. Resolution
//! then derives repository and pull request from a Jenkins-style job name
//! (`<repo>/PR-<number>`) and checks that every required value is present.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::annotations::ESLINT_DOCS_BASE_URL;
use crate::auth::{AuthEncoding, Credentials};
use crate::error::ConfigError;

pub const ENV_BITBUCKET_URL: &str = "BITBUCKET_URL";
pub const ENV_LINT_RESULTS_PATH: &str = "LINT_RESULTS_PATH";
pub const ENV_JOB_NAME: &str = "JOB_NAME";
pub const ENV_BITBUCKET_PASSWORD: &str = "BITBUCKET_PASSWORD";
pub const ENV_BITBUCKET_PROJECT: &str = "BITBUCKET_PROJECT";
pub const ENV_PULL_REQUEST_ID: &str = "PULL_REQUEST_ID";
pub const ENV_BITBUCKET_REPOSITORY: &str = "BITBUCKET_REPOSITORY";
pub const ENV_BITBUCKET_USER: &str = "BITBUCKET_USER";
pub const ENV_LEGACY_AUTH_PADDING: &str = "LINTPOST_LEGACY_AUTH_PADDING";

/// Default number of inline comment requests in flight at once.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 8;

static PULL_REQUEST_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"PR-(\d+)").expect("valid pull request pattern"));

/// A parameter that must be resolved before any request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredParam {
    BaseUrl,
    LintResultsPath,
    Password,
    Project,
    PullRequestId,
    Repository,
    User,
}

impl RequiredParam {
    /// Option name as used by [`RunOptions`].
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::BaseUrl => "base_url",
            Self::LintResultsPath => "lint_results_path",
            Self::Password => "password",
            Self::Project => "project",
            Self::PullRequestId => "pull_request_id",
            Self::Repository => "repository",
            Self::User => "user",
        }
    }

    /// Environment variable consulted when the option is not given.
    #[must_use]
    pub const fn env_var(self) -> &'static str {
        match self {
            Self::BaseUrl => ENV_BITBUCKET_URL,
            Self::LintResultsPath => ENV_LINT_RESULTS_PATH,
            Self::Password => ENV_BITBUCKET_PASSWORD,
            Self::Project => ENV_BITBUCKET_PROJECT,
            Self::PullRequestId => ENV_PULL_REQUEST_ID,
            Self::Repository => ENV_BITBUCKET_REPOSITORY,
            Self::User => ENV_BITBUCKET_USER,
        }
    }
}

impl std::fmt::Display for RequiredParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.key(), self.env_var())
    }
}

/// Caller-supplied options. Every field may be left out.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub base_url: Option<String>,
    pub lint_results_path: Option<PathBuf>,
    pub job_name: Option<String>,
    pub password: Option<String>,
    pub project: Option<String>,
    pub pull_request_id: Option<String>,
    pub repository: Option<String>,
    pub user: Option<String>,

    /// Post one inline comment per finding (default: true)
    pub comment_file_level: Option<bool>,
    /// Post the summary comment (default: true)
    pub comment_top_level: Option<bool>,
    /// Open a task on the summary comment (default: true)
    pub create_task: Option<bool>,
    /// Log requests instead of sending them (default: false)
    pub debug: Option<bool>,
    /// Include severity-1 findings in inline comments (default: true)
    pub warnings: Option<bool>,

    pub max_concurrent_requests: Option<usize>,
    pub rule_docs_url: Option<String>,
    pub auth_encoding: Option<AuthEncoding>,
}

/// Outcome of resolving [`RunOptions`].
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Everything required is present.
    Ready(RunConfig),

    /// The job name does not identify a pull request and no id was given.
    NotPullRequest { job_name: String },
}

/// Fully resolved, immutable configuration for one run.
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct RunConfig {
    pub base_url: String,
    pub lint_results_path: PathBuf,
    pub job_name: Option<String>,
    pub credentials: Credentials,
    pub project: String,
    pub pull_request_id: String,
    pub repository: String,
    pub comment_file_level: bool,
    pub comment_top_level: bool,
    pub create_task: bool,
    pub debug: bool,
    pub warnings: bool,
    pub max_concurrent_requests: usize,
    pub rule_docs_url: String,
    pub auth_encoding: AuthEncoding,
}

impl RunOptions {
    /// Fill every omitted value from its environment variable.
    ///
    /// Empty values count as unset.
    #[must_use]
    pub fn with_env_defaults<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

        self.base_url = self.base_url.or_else(|| get(ENV_BITBUCKET_URL));
        self.lint_results_path = self
            .lint_results_path
            .or_else(|| get(ENV_LINT_RESULTS_PATH).map(PathBuf::from));
        self.job_name = self.job_name.or_else(|| get(ENV_JOB_NAME));
        self.password = self.password.or_else(|| get(ENV_BITBUCKET_PASSWORD));
        self.project = self.project.or_else(|| get(ENV_BITBUCKET_PROJECT));
        self.pull_request_id = self.pull_request_id.or_else(|| get(ENV_PULL_REQUEST_ID));
        self.repository = self.repository.or_else(|| get(ENV_BITBUCKET_REPOSITORY));
        self.user = self.user.or_else(|| get(ENV_BITBUCKET_USER));
        self.auth_encoding = self.auth_encoding.or_else(|| {
            get(ENV_LEGACY_AUTH_PADDING).map(|value| {
                if parse_flag(&value) {
                    AuthEncoding::LegacyTrailingPad
                } else {
                    AuthEncoding::Standard
                }
            })
        });
        self
    }

    /// Resolve into a [`RunConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingParameters`] naming every required
    /// parameter that is still unset.
    pub fn resolve(self) -> Result<Resolution, ConfigError> {
        let mut repository = self.repository;
        let mut pull_request_id = self.pull_request_id;

        if let Some(job_name) = self.job_name.as_deref() {
            if repository.is_none() {
                repository = repository_from_job(job_name).map(str::to_string);
            }
            if pull_request_id.is_none() {
                match pull_request_from_job(job_name) {
                    Some(id) => {
                        debug!(
                            job = job_name,
                            pull_request = %id,
                            "Derived pull request from job name"
                        );
                        pull_request_id = Some(id);
                    }
                    None => {
                        info!(
                            job = job_name,
                            "Job is not a PR, and there is no supplied pull request id"
                        );
                        return Ok(Resolution::NotPullRequest {
                            job_name: job_name.to_string(),
                        });
                    }
                }
            }
        }

        match (
            self.base_url,
            self.lint_results_path,
            self.password,
            self.project,
            pull_request_id,
            repository,
            self.user,
        ) {
            (
                Some(base_url),
                Some(lint_results_path),
                Some(password),
                Some(project),
                Some(pull_request_id),
                Some(repository),
                Some(user),
            ) => Ok(Resolution::Ready(RunConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                lint_results_path,
                job_name: self.job_name,
                credentials: Credentials::new(user, password),
                project,
                pull_request_id,
                repository,
                comment_file_level: self.comment_file_level.unwrap_or(true),
                comment_top_level: self.comment_top_level.unwrap_or(true),
                create_task: self.create_task.unwrap_or(true),
                debug: self.debug.unwrap_or(false),
                warnings: self.warnings.unwrap_or(true),
                max_concurrent_requests: self
                    .max_concurrent_requests
                    .unwrap_or(DEFAULT_MAX_CONCURRENT_REQUESTS)
                    .max(1),
                rule_docs_url: self
                    .rule_docs_url
                    .unwrap_or_else(|| ESLINT_DOCS_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                auth_encoding: self.auth_encoding.unwrap_or_default(),
            })),
            (base_url, lint_results_path, password, project, pull_request_id, repository, user) => {
                let missing = [
                    (RequiredParam::BaseUrl, base_url.is_none()),
                    (RequiredParam::LintResultsPath, lint_results_path.is_none()),
                    (RequiredParam::Password, password.is_none()),
                    (RequiredParam::Project, project.is_none()),
                    (RequiredParam::PullRequestId, pull_request_id.is_none()),
                    (RequiredParam::Repository, repository.is_none()),
                    (RequiredParam::User, user.is_none()),
                ]
                .into_iter()
                .filter_map(|(param, absent)| absent.then_some(param))
                .collect();
                Err(ConfigError::MissingParameters(missing))
            }
        }
    }
}

/// Repository name: everything before the first `/`.
fn repository_from_job(job_name: &str) -> Option<&str> {
    job_name.split('/').next().filter(|segment| !segment.is_empty())
}

/// Pull request number from the `PR-<digits>` token after the first `/`.
fn pull_request_from_job(job_name: &str) -> Option<String> {
    let (_, branch) = job_name.split_once('/')?;
    PULL_REQUEST_PATTERN
        .captures(branch)
        .map(|captures| captures[1].to_string())
}

fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}
