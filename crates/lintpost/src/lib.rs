//! Post ESLint results to a Bitbucket Server pull request.
//!
//! Reads the JSON written by `eslint --format json`, posts a summary comment
//! with the total error count (optionally with a task attached to it) and one
//! inline comment per finding on the line it refers to.
//!
//! # Usage
//!
//! ```no_run
//! use lintpost::{resolve_and_run, RunOptions, RunReport};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let options = RunOptions {
//!     job_name: Some("frontend/PR-42".to_string()),
//!     ..RunOptions::default()
//! }
//! .with_env_defaults(|name| std::env::var(name).ok());
//!
//! let cwd = std::env::current_dir()?;
//! if let RunReport::Delivered(report) = resolve_and_run(options, &cwd).await? {
//!     println!("{} of {} requests delivered", report.delivered, report.attempted);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! Values not passed in [`RunOptions`] fall back to:
//!
//! - `BITBUCKET_URL`, `BITBUCKET_USER`, `BITBUCKET_PASSWORD`
//! - `BITBUCKET_PROJECT`, `BITBUCKET_REPOSITORY`, `PULL_REQUEST_ID`
//! - `LINT_RESULTS_PATH`
//! - `JOB_NAME` (`<repo>/PR-<number>`; supplies repository and pull request)
//! - `LINTPOST_LEGACY_AUTH_PADDING`
//!
//! Missing configuration and unreadable results are errors. Failed comment
//! requests are logged and counted in the [`DeliveryReport`] but never fail
//! the run.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod annotations;
pub mod api;
pub mod auth;
pub mod comment;
pub mod config;
pub mod error;
pub mod outcome;
pub mod results;
pub mod run;
pub mod summary;

pub use annotations::AnnotationReporter;
pub use api::{BitbucketClient, DryRunApi, Endpoints, ReviewApi};
pub use auth::{encode_authorization, AuthEncoding, Credentials};
pub use comment::{Anchor, CommentRequest, CreatedComment};
pub use config::{RequiredParam, Resolution, RunConfig, RunOptions};
pub use error::{ClientError, ConfigError, LoadError, RequestError, RunError};
pub use outcome::{DeliveryReport, RequestKind, RequestOutcome};
pub use results::{load_results, FileLintResult, LintMessage, LintResultSet, Severity};
pub use run::{deliver, resolve_and_run, run, RunReport};
pub use summary::SummaryReporter;
