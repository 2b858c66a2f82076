//! Error types for lint result delivery.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::RequiredParam;

/// Configuration could not be resolved into a runnable [`RunConfig`](crate::RunConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more mandatory parameters were neither supplied nor found in the environment
    #[error("The following required parameters are missing: {}", join_params(.0))]
    MissingParameters(Vec<RequiredParam>),
}

fn join_params(params: &[RequiredParam]) -> String {
    params
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// The lint results file could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File missing or unreadable
    #[error("Failed to read lint results from {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// File is not a lint result set
    #[error("Failed to parse lint results in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The Bitbucket HTTP client could not be constructed.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Credentials produced a header value reqwest refuses
    #[error("Invalid authorization header: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),

    /// reqwest failed to build the client
    #[error("Failed to create HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// A single comment or task request did not go through.
///
/// These are recorded per request and never abort a run.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Transport-level failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Bitbucket answered with a non-success status
    #[error("Bitbucket returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Response body was not the JSON we expected
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The summary comment was created but its id was not returned, so no task can anchor to it
    #[error("Created comment has no id to anchor a task to")]
    MissingCommentId,
}

/// Fatal errors that stop a run before any comment is posted.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parameters_lists_every_key() {
        let err = ConfigError::MissingParameters(vec![RequiredParam::BaseUrl, RequiredParam::User]);
        let message = err.to_string();
        assert!(message.contains("base_url (BITBUCKET_URL)"));
        assert!(message.contains("user (BITBUCKET_USER)"));
    }
}
