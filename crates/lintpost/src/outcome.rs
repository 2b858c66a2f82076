//! Per-request results and the one place they are logged.

use tracing::{debug, info, warn};

use crate::error::RequestError;

/// What a request was for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    Summary,
    Task,
    Inline { path: String, line: u32 },
}

impl std::fmt::Display for RequestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Summary => write!(f, "summary comment"),
            Self::Task => write!(f, "follow-up task"),
            Self::Inline { path, line } => write!(f, "inline comment {path}:{line}"),
        }
    }
}

/// Result of one attempted request.
#[derive(Debug)]
pub struct RequestOutcome {
    pub kind: RequestKind,
    pub result: Result<(), RequestError>,
}

impl RequestOutcome {
    #[must_use]
    pub fn new(kind: RequestKind, result: Result<(), RequestError>) -> Self {
        Self { kind, result }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Counts across every request of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Log each failure once and tally the outcomes.
pub fn report(outcomes: &[RequestOutcome]) -> DeliveryReport {
    let mut summary = DeliveryReport {
        attempted: outcomes.len(),
        ..DeliveryReport::default()
    };

    for outcome in outcomes {
        match &outcome.result {
            Ok(()) => {
                summary.delivered += 1;
                debug!(request = %outcome.kind, "Request delivered");
            }
            Err(e) => {
                summary.failed += 1;
                warn!(request = %outcome.kind, error = %e, "Request failed");
            }
        }
    }

    info!(
        attempted = summary.attempted,
        delivered = summary.delivered,
        failed = summary.failed,
        "Lint report delivery finished"
    );

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_counts() {
        let outcomes = vec![
            RequestOutcome::new(RequestKind::Summary, Ok(())),
            RequestOutcome::new(RequestKind::Task, Err(RequestError::MissingCommentId)),
            RequestOutcome::new(
                RequestKind::Inline {
                    path: "src/a.js".to_string(),
                    line: 4,
                },
                Ok(()),
            ),
        ];

        let report = report(&outcomes);
        assert_eq!(
            report,
            DeliveryReport {
                attempted: 3,
                delivered: 2,
                failed: 1,
            }
        );
    }

    #[test]
    fn test_kind_display() {
        let kind = RequestKind::Inline {
            path: "lib/x.js".to_string(),
            line: 10,
        };
        assert_eq!(kind.to_string(), "inline comment lib/x.js:10");
    }
}
