//! One end-to-end run: resolve, load, report.

use std::path::Path;

use tracing::info;

use crate::annotations::AnnotationReporter;
use crate::api::{BitbucketClient, DryRunApi, Endpoints, ReviewApi};
use crate::auth::encode_authorization;
use crate::config::{Resolution, RunConfig, RunOptions};
use crate::error::RunError;
use crate::outcome::{self, DeliveryReport};
use crate::results::{load_results, LintResultSet};
use crate::summary::SummaryReporter;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunReport {
    /// Job name did not identify a pull request; nothing was done.
    NotPullRequest,
    /// The results file held no files; nothing was posted.
    NoResults,
    /// Requests were attempted. Some may have failed.
    Delivered(DeliveryReport),
}

/// Resolve `options` and run.
///
/// # Errors
///
/// Fails on missing configuration, unreadable results or an unusable HTTP
/// client. Failed comment requests are not errors.
pub async fn resolve_and_run(options: RunOptions, cwd: &Path) -> Result<RunReport, RunError> {
    match options.resolve()? {
        Resolution::NotPullRequest { .. } => Ok(RunReport::NotPullRequest),
        Resolution::Ready(config) => run(&config, cwd).await,
    }
}

/// Load the results named by `config` and post them.
///
/// # Errors
///
/// Fails when the results cannot be loaded or the HTTP client cannot be built.
pub async fn run(config: &RunConfig, cwd: &Path) -> Result<RunReport, RunError> {
    let results = load_results(&config.lint_results_path, cwd)?;
    if results.is_empty() {
        info!(path = %config.lint_results_path.display(), "No lint results, nothing to post");
        return Ok(RunReport::NoResults);
    }

    let endpoints = Endpoints::from_config(config);
    let api: Box<dyn ReviewApi> = if config.debug {
        info!("Debug mode: requests will be logged, not sent");
        Box::new(DryRunApi::new(endpoints))
    } else {
        let authorization = encode_authorization(&config.credentials, config.auth_encoding);
        Box::new(BitbucketClient::new(endpoints, &authorization)?)
    };

    Ok(RunReport::Delivered(
        deliver(api.as_ref(), config, &results, cwd).await,
    ))
}

/// Run the summary and inline reporters concurrently and tally the outcomes.
pub async fn deliver(
    api: &dyn ReviewApi,
    config: &RunConfig,
    results: &LintResultSet,
    cwd: &Path,
) -> DeliveryReport {
    let summary = async {
        if config.comment_top_level {
            // No comment id comes back from a dry run, so no task either
            SummaryReporter::new(api, config.create_task && !config.debug)
                .report(results)
                .await
        } else {
            Vec::new()
        }
    };

    let inline = async {
        if config.comment_file_level {
            AnnotationReporter::new(api, cwd)
                .include_warnings(config.warnings)
                .docs_base_url(&config.rule_docs_url)
                .max_concurrent(config.max_concurrent_requests)
                .report(results)
                .await
        } else {
            Vec::new()
        }
    };

    let (mut outcomes, inline) = tokio::join!(summary, inline);
    outcomes.extend(inline);

    outcome::report(&outcomes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthEncoding, Credentials};
    use crate::comment::{CommentRequest, CreatedComment};
    use crate::error::RequestError;
    use crate::results::{FileLintResult, LintMessage, Severity};
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Records requests; fails the general (unanchored) comment on demand.
    #[derive(Default)]
    struct RecordingApi {
        fail_summary: bool,
        comments: Mutex<Vec<CommentRequest>>,
        tasks: Mutex<Vec<CommentRequest>>,
    }

    #[async_trait]
    impl ReviewApi for RecordingApi {
        async fn post_comment(
            &self,
            request: &CommentRequest,
        ) -> Result<CreatedComment, RequestError> {
            self.comments.lock().unwrap().push(request.clone());
            if self.fail_summary && request.anchor.is_none() {
                return Err(RequestError::Status {
                    status: reqwest::StatusCode::BAD_GATEWAY,
                    body: "upstream unavailable".to_string(),
                });
            }
            Ok(CreatedComment { id: Some(17) })
        }

        async fn create_task(&self, request: &CommentRequest) -> Result<(), RequestError> {
            self.tasks.lock().unwrap().push(request.clone());
            Ok(())
        }
    }

    fn config() -> RunConfig {
        RunConfig {
            base_url: "http://bb".to_string(),
            lint_results_path: PathBuf::from("eslint.json"),
            job_name: None,
            credentials: Credentials::new("u", "p"),
            project: "P".to_string(),
            pull_request_id: "1".to_string(),
            repository: "r".to_string(),
            comment_file_level: true,
            comment_top_level: true,
            create_task: true,
            debug: false,
            warnings: true,
            max_concurrent_requests: 4,
            rule_docs_url: crate::annotations::ESLINT_DOCS_BASE_URL.to_string(),
            auth_encoding: AuthEncoding::Standard,
        }
    }

    fn results() -> LintResultSet {
        LintResultSet::new(vec![FileLintResult {
            file_path: PathBuf::from("/repo/src/a.js"),
            error_count: 2,
            messages: vec![
                LintMessage {
                    message: "a".to_string(),
                    rule_id: Some("eqeqeq".to_string()),
                    line: Some(1),
                    severity: Severity::Error,
                },
                LintMessage {
                    message: "b".to_string(),
                    rule_id: Some("quotes".to_string()),
                    line: Some(2),
                    severity: Severity::Error,
                },
            ],
        }])
    }

    #[tokio::test]
    async fn test_deliver_posts_summary_task_and_inline() {
        let api = RecordingApi::default();
        let report = deliver(&api, &config(), &results(), Path::new("/repo")).await;

        assert_eq!(report.attempted, 4);
        assert_eq!(report.failed, 0);
        assert_eq!(api.comments.lock().unwrap().len(), 3);

        let tasks = api.tasks.lock().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].text, "fix 2 lint errors");
    }

    #[tokio::test]
    async fn test_summary_failure_does_not_block_inline_comments() {
        let api = RecordingApi {
            fail_summary: true,
            ..RecordingApi::default()
        };
        let report = deliver(&api, &config(), &results(), Path::new("/repo")).await;

        assert_eq!(report.failed, 1);
        assert_eq!(report.delivered, 2);
        assert!(api.tasks.lock().unwrap().is_empty());
        let inline = api
            .comments
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.anchor.is_some())
            .count();
        assert_eq!(inline, 2);
    }

    #[tokio::test]
    async fn test_toggles_disable_reporters() {
        let api = RecordingApi::default();
        let config = RunConfig {
            comment_top_level: false,
            comment_file_level: false,
            ..config()
        };
        let report = deliver(&api, &config, &results(), Path::new("/repo")).await;

        assert_eq!(report, DeliveryReport::default());
        assert!(api.comments.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_task_disabled() {
        let api = RecordingApi::default();
        let config = RunConfig {
            create_task: false,
            ..config()
        };
        deliver(&api, &config, &results(), Path::new("/repo")).await;
        assert!(api.tasks.lock().unwrap().is_empty());
    }
}
