//! Inline comments, one per lint finding.

use std::path::{Component, Path};

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::api::ReviewApi;
use crate::comment::CommentRequest;
use crate::outcome::{RequestKind, RequestOutcome};
use crate::results::{LintMessage, LintResultSet, Severity};

/// Where rule documentation lives; `{base}/{ruleId}.md`.
pub const ESLINT_DOCS_BASE_URL: &str = "https://github.com/eslint/eslint/blob/master/docs/rules";

/// Posts every qualifying finding as a comment on its diff line.
pub struct AnnotationReporter<'a> {
    api: &'a dyn ReviewApi,
    cwd: &'a Path,
    include_warnings: bool,
    docs_base_url: &'a str,
    max_concurrent: usize,
}

impl<'a> AnnotationReporter<'a> {
    pub fn new(api: &'a dyn ReviewApi, cwd: &'a Path) -> Self {
        Self {
            api,
            cwd,
            include_warnings: true,
            docs_base_url: ESLINT_DOCS_BASE_URL,
            max_concurrent: crate::config::DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }

    #[must_use]
    pub fn include_warnings(mut self, include: bool) -> Self {
        self.include_warnings = include;
        self
    }

    #[must_use]
    pub fn docs_base_url(mut self, url: &'a str) -> Self {
        self.docs_base_url = url;
        self
    }

    #[must_use]
    pub fn max_concurrent(mut self, limit: usize) -> Self {
        self.max_concurrent = limit.max(1);
        self
    }

    /// Build the comment for every finding that should be posted.
    #[must_use]
    pub fn build_requests(&self, results: &LintResultSet) -> Vec<(RequestKind, CommentRequest)> {
        let mut requests = Vec::new();

        for file in results.files() {
            if file.messages.is_empty() {
                continue;
            }
            let path = relative_path(&file.file_path, self.cwd);

            for message in &file.messages {
                if message.severity == Severity::Warning && !self.include_warnings {
                    continue;
                }
                // Bitbucket requires a line for line anchors
                let line = message.line.unwrap_or(1);
                requests.push((
                    RequestKind::Inline {
                        path: path.clone(),
                        line,
                    },
                    CommentRequest::on_added_line(
                        comment_text(message, self.docs_base_url),
                        path.clone(),
                        line,
                    ),
                ));
            }
        }

        requests
    }

    /// Post all inline comments. Requests are independent; a failure is
    /// recorded and the rest still go out.
    pub async fn report(&self, results: &LintResultSet) -> Vec<RequestOutcome> {
        let requests = self.build_requests(results);
        info!(
            comments = requests.len(),
            max_concurrent = self.max_concurrent,
            "Posting inline lint comments"
        );

        stream::iter(requests)
            .map(|(kind, request)| async move {
                debug!(request = %kind, "Posting inline comment");
                let result = self.api.post_comment(&request).await.map(|_| ());
                RequestOutcome::new(kind, result)
            })
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await
    }
}

/// `[eslint] <message> - ([<rule>](<docs>/<rule>.md))`, or just the message
/// when the finding has no rule.
#[must_use]
pub fn comment_text(message: &LintMessage, docs_base_url: &str) -> String {
    match message.rule_id.as_deref() {
        Some(rule) => format!(
            "[eslint] {} - ([{rule}]({docs_base_url}/{rule}.md))",
            message.message
        ),
        None => format!("[eslint] {}", message.message),
    }
}

/// Path relative to `cwd` with `/` separators. Paths outside `cwd`, or that
/// climb out of it through `..`, are kept as given.
#[must_use]
pub fn relative_path(file: &Path, cwd: &Path) -> String {
    match file.strip_prefix(cwd) {
        Ok(relative)
            if relative
                .components()
                .all(|component| matches!(component, Component::Normal(_))) =>
        {
            relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/")
        }
        _ => file.to_string_lossy().into_owned(),
    }
}
