//! HTTP client for the external workflow engine.
//!
//! The engine exposes an n8n-compatible REST API. Metadata calls go through
//! `/api/v1` with basic auth; webhook triggers post to `/webhook/{path}`
//! without auth. Timeouts are fixed per call class.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use alphamind_core::config::timeouts;
use crate::error::{Result, WorkflowError};

/// Engine connection configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Engine base URL, without a trailing slash (e.g. "http://localhost:5678")
    pub endpoint: String,
    /// Basic-auth username (empty disables auth)
    pub username: String,
    /// Basic-auth password
    pub password: String,
    /// Health probe timeout
    pub health_timeout: Duration,
    /// Metadata call timeout
    pub api_timeout: Duration,
    /// Execution/webhook call timeout
    pub execute_timeout: Duration,
}

impl EngineConfig {
    /// Create a config for the given endpoint with default timeouts.
    pub fn new(endpoint: impl Into<String>) -> Self {
        let mut endpoint = endpoint.into();
        while endpoint.ends_with('/') {
            endpoint.pop();
        }
        Self {
            endpoint,
            username: String::new(),
            password: String::new(),
            health_timeout: Duration::from_secs(timeouts::HEALTH_SECS),
            api_timeout: Duration::from_secs(timeouts::API_SECS),
            execute_timeout: Duration::from_secs(timeouts::EXECUTE_SECS),
        }
    }

    /// Set basic-auth credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Override the execution timeout.
    pub fn with_execute_timeout(mut self, timeout: Duration) -> Self {
        self.execute_timeout = timeout;
        self
    }
}

impl From<alphamind_core::config::EngineSettings> for EngineConfig {
    fn from(settings: alphamind_core::config::EngineSettings) -> Self {
        Self::new(settings.endpoint).with_credentials(settings.username, settings.password)
    }
}

/// Result of [`EngineClient::run_workflow`].
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Raw engine response payload
    pub output: Value,
    /// Whether the webhook path served the call (false = API fallback)
    pub via_webhook: bool,
    /// Engine-side execution id, when reported
    pub remote_execution_id: Option<String>,
}

/// The `data`-wrapped list envelope n8n uses for collection endpoints.
#[derive(Debug, Deserialize)]
struct ListEnvelope {
    #[serde(default)]
    data: Vec<Value>,
}

/// Workflow engine client.
pub struct EngineClient {
    config: EngineConfig,
    client: Client,
}

impl EngineClient {
    /// Create a new engine client.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| WorkflowError::Network(e.to_string()))?;
        Ok(Self { config, client })
    }

    /// The configured engine endpoint.
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    fn request(&self, method: Method, path: &str, timeout: Duration) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{}", self.config.endpoint, path))
            .timeout(timeout);
        if !self.config.username.is_empty() {
            builder = builder.basic_auth(&self.config.username, Some(&self.config.password));
        }
        builder
    }

    /// Fail on non-2xx, carrying the status and body text.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(WorkflowError::Engine {
                status: status.as_u16(),
                body,
            })
        }
    }

    /// Probe engine health. Network failures map to `false`, not an error.
    pub async fn test_connection(&self) -> bool {
        match self
            .request(Method::GET, "/healthz", self.config.health_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "Engine health probe failed");
                false
            }
        }
    }

    /// List workflows known to the engine.
    pub async fn list_workflows(&self) -> Result<Vec<Value>> {
        let response = self
            .request(Method::GET, "/api/v1/workflows", self.config.api_timeout)
            .send()
            .await?;
        let envelope: ListEnvelope = Self::check(response).await?.json().await?;
        Ok(envelope.data)
    }

    /// Get a workflow by id. A 404 from the engine is `None`.
    pub async fn get_workflow(&self, workflow_id: &str) -> Result<Option<Value>> {
        let response = self
            .request(
                Method::GET,
                &format!("/api/v1/workflows/{}", workflow_id),
                self.config.api_timeout,
            )
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(Self::check(response).await?.json().await?))
    }

    /// Create a workflow on the engine.
    pub async fn create_workflow(&self, workflow: &Value) -> Result<Value> {
        let response = self
            .request(Method::POST, "/api/v1/workflows", self.config.api_timeout)
            .json(workflow)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Patch a workflow on the engine.
    pub async fn update_workflow(&self, workflow_id: &str, patch: &Value) -> Result<Value> {
        let response = self
            .request(
                Method::PATCH,
                &format!("/api/v1/workflows/{}", workflow_id),
                self.config.api_timeout,
            )
            .json(patch)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Delete a workflow. Returns false when the engine does not know it.
    pub async fn delete_workflow(&self, workflow_id: &str) -> Result<bool> {
        let response = self
            .request(
                Method::DELETE,
                &format!("/api/v1/workflows/{}", workflow_id),
                self.config.api_timeout,
            )
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::check(response).await?;
        Ok(true)
    }

    /// Execute a workflow through the API path.
    pub async fn execute_workflow(&self, workflow_id: &str, input: &Value) -> Result<Value> {
        let response = self
            .request(
                Method::POST,
                &format!("/api/v1/workflows/{}/execute", workflow_id),
                self.config.execute_timeout,
            )
            .json(&serde_json::json!({ "data": input }))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Trigger a webhook. Webhook endpoints are unauthenticated.
    pub async fn trigger_webhook(&self, webhook_path: &str, data: &Value) -> Result<Value> {
        let response = self
            .client
            .post(format!("{}/webhook/{}", self.config.endpoint, webhook_path))
            .timeout(self.config.execute_timeout)
            .json(data)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Run a workflow: webhook first, API path as fallback when the webhook
    /// fails for any reason.
    pub async fn run_workflow(&self, workflow_id: &str, input: &Value) -> Result<RunOutcome> {
        match self.trigger_webhook(workflow_id, input).await {
            Ok(output) => {
                let remote_execution_id = extract_execution_id(&output);
                Ok(RunOutcome {
                    output,
                    via_webhook: true,
                    remote_execution_id,
                })
            }
            Err(webhook_err) => {
                tracing::debug!(
                    workflow_id = %workflow_id,
                    error = %webhook_err,
                    "Webhook trigger failed, falling back to API execution"
                );
                let output = self.execute_workflow(workflow_id, input).await?;
                let remote_execution_id = extract_execution_id(&output);
                Ok(RunOutcome {
                    output,
                    via_webhook: false,
                    remote_execution_id,
                })
            }
        }
    }

    /// List engine-side executions, optionally scoped to one workflow.
    pub async fn list_executions(
        &self,
        workflow_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Value>> {
        let mut builder = self
            .request(Method::GET, "/api/v1/executions", self.config.api_timeout)
            .query(&[("limit", limit.to_string())]);
        if let Some(workflow_id) = workflow_id {
            builder = builder.query(&[("workflowId", workflow_id)]);
        }
        let envelope: ListEnvelope = Self::check(builder.send().await?).await?.json().await?;
        Ok(envelope.data)
    }

    /// Get an engine-side execution by id.
    pub async fn get_execution(&self, execution_id: &str) -> Result<Option<Value>> {
        let response = self
            .request(
                Method::GET,
                &format!("/api/v1/executions/{}", execution_id),
                self.config.api_timeout,
            )
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(Self::check(response).await?.json().await?))
    }

    /// Stop an engine-side execution. Returns false when it is unknown.
    pub async fn stop_execution(&self, execution_id: &str) -> Result<bool> {
        let response = self
            .request(
                Method::DELETE,
                &format!("/api/v1/executions/{}", execution_id),
                self.config.api_timeout,
            )
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::check(response).await?;
        Ok(true)
    }

    /// Activate or deactivate a workflow.
    pub async fn set_active(&self, workflow_id: &str, active: bool) -> Result<bool> {
        let response = self
            .request(
                Method::PATCH,
                &format!("/api/v1/workflows/{}", workflow_id),
                self.config.api_timeout,
            )
            .json(&serde_json::json!({ "active": active }))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::check(response).await?;
        Ok(true)
    }
}

/// Pull the engine execution id out of a response payload, wherever the
/// engine put it.
fn extract_execution_id(output: &Value) -> Option<String> {
    for key in ["execution_id", "executionId"] {
        if let Some(id) = output.get(key) {
            if let Some(s) = id.as_str() {
                return Some(s.to_string());
            }
            if let Some(n) = id.as_i64() {
                return Some(n.to_string());
            }
        }
    }
    output
        .get("data")
        .and_then(|data| extract_execution_id(data))
}
