//! Bitbucket Server REST API access.
//!
//! [`ReviewApi`] is the seam the reporters talk to. [`BitbucketClient`] sends
//! real requests; [`DryRunApi`] logs what would have been sent.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use tracing::{debug, info};

use crate::comment::{CommentRequest, CreatedComment};
use crate::config::RunConfig;
use crate::error::{ClientError, RequestError};

/// Operations the reporters need from the review platform.
#[async_trait]
pub trait ReviewApi: Send + Sync {
    /// Create a pull request comment.
    async fn post_comment(&self, request: &CommentRequest) -> Result<CreatedComment, RequestError>;

    /// Create a task.
    async fn create_task(&self, request: &CommentRequest) -> Result<(), RequestError>;
}

/// Target URLs for one pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub comments: String,
    pub tasks: String,
}

impl Endpoints {
    #[must_use]
    pub fn new(base_url: &str, project: &str, repository: &str, pull_request_id: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Self {
            comments: format!(
                "{base_url}/rest/api/1.0/projects/{project}/repos/{repository}/pull-requests/{pull_request_id}/comments"
            ),
            tasks: format!("{base_url}/rest/api/1.0/tasks"),
        }
    }

    #[must_use]
    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(
            &config.base_url,
            &config.project,
            &config.repository,
            &config.pull_request_id,
        )
    }
}

/// HTTP client for the Bitbucket Server REST API.
#[derive(Debug, Clone)]
pub struct BitbucketClient {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl BitbucketClient {
    /// Create a client that sends `authorization` with every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header value is invalid or the HTTP client
    /// cannot be created.
    pub fn new(endpoints: Endpoints, authorization: &str) -> Result<Self, ClientError> {
        let mut auth = HeaderValue::from_str(authorization)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("lintpost/", env!("CARGO_PKG_VERSION"))),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self { client, endpoints })
    }

    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// POST `body` and return the response text of a 2xx answer.
    async fn post(&self, url: &str, body: &CommentRequest) -> Result<String, RequestError> {
        let response = self.client.post(url).json(body).send().await?;

        if response.status().is_success() {
            Ok(response.text().await?)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            debug!(url = url, status = %status, "Bitbucket rejected request");

            Err(RequestError::Status { status, body })
        }
    }
}

#[async_trait]
impl ReviewApi for BitbucketClient {
    async fn post_comment(&self, request: &CommentRequest) -> Result<CreatedComment, RequestError> {
        let body = self.post(&self.endpoints.comments, request).await?;
        debug!(url = %self.endpoints.comments, "Comment created");

        if body.trim().is_empty() {
            return Ok(CreatedComment::default());
        }
        Ok(serde_json::from_str(&body)?)
    }

    async fn create_task(&self, request: &CommentRequest) -> Result<(), RequestError> {
        self.post(&self.endpoints.tasks, request).await?;
        debug!(url = %self.endpoints.tasks, "Task created");
        Ok(())
    }
}

/// Logs every request instead of sending it.
#[derive(Debug, Clone)]
pub struct DryRunApi {
    endpoints: Endpoints,
}

impl DryRunApi {
    #[must_use]
    pub fn new(endpoints: Endpoints) -> Self {
        Self { endpoints }
    }
}

#[async_trait]
impl ReviewApi for DryRunApi {
    async fn post_comment(&self, request: &CommentRequest) -> Result<CreatedComment, RequestError> {
        let body = serde_json::to_string(request)?;
        info!(url = %self.endpoints.comments, body = %body, "Dry run: would POST comment");
        Ok(CreatedComment::default())
    }

    async fn create_task(&self, request: &CommentRequest) -> Result<(), RequestError> {
        let body = serde_json::to_string(request)?;
        info!(url = %self.endpoints.tasks, body = %body, "Dry run: would POST task");
        Ok(())
    }
}
