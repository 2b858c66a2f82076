//! Top-level summary comment and its follow-up task.

use tracing::{debug, info};

use crate::api::ReviewApi;
use crate::comment::CommentRequest;
use crate::error::RequestError;
use crate::outcome::{RequestKind, RequestOutcome};
use crate::results::LintResultSet;

/// Posts the error count as a general comment, then optionally a task on it.
pub struct SummaryReporter<'a> {
    api: &'a dyn ReviewApi,
    create_task: bool,
}

impl<'a> SummaryReporter<'a> {
    pub fn new(api: &'a dyn ReviewApi, create_task: bool) -> Self {
        Self { api, create_task }
    }

    /// Post the summary. The task request is only made once the comment
    /// exists and its id is known.
    pub async fn report(&self, results: &LintResultSet) -> Vec<RequestOutcome> {
        let total = results.total_errors();
        info!(total_errors = total, "Posting lint summary");

        let request = CommentRequest::general(summary_text(total));
        let created = match self.api.post_comment(&request).await {
            Ok(created) => created,
            Err(e) => return vec![RequestOutcome::new(RequestKind::Summary, Err(e))],
        };

        let mut outcomes = vec![RequestOutcome::new(RequestKind::Summary, Ok(()))];

        if !self.create_task {
            return outcomes;
        }

        let result = match created.id {
            Some(id) => {
                debug!(comment_id = id, "Opening follow-up task");
                self.api
                    .create_task(&CommentRequest::task_on_comment(task_text(total), id))
                    .await
            }
            None => Err(RequestError::MissingCommentId),
        };
        outcomes.push(RequestOutcome::new(RequestKind::Task, result));
        outcomes
    }
}

fn error_noun(total: u64) -> &'static str {
    if total == 1 {
        "error"
    } else {
        "errors"
    }
}

/// `[eslint] This PR contains 3 lint errors`
#[must_use]
pub fn summary_text(total: u64) -> String {
    format!("[eslint] This PR contains {total} lint {}", error_noun(total))
}

/// `fix 3 lint errors`
#[must_use]
pub fn task_text(total: u64) -> String {
    format!("fix {total} lint {}", error_noun(total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_text_plural() {
        assert_eq!(summary_text(5), "[eslint] This PR contains 5 lint errors");
        assert_eq!(summary_text(0), "[eslint] This PR contains 0 lint errors");
    }

    #[test]
    fn test_summary_text_singular() {
        assert_eq!(summary_text(1), "[eslint] This PR contains 1 lint error");
    }

    #[test]
    fn test_task_text() {
        assert_eq!(task_text(1), "fix 1 lint error");
        assert_eq!(task_text(12), "fix 12 lint errors");
    }
}
