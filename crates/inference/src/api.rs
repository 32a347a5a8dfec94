//! REST client for the inference queue's HTTP endpoints.
//!
//! Wraps job submission, status fetch, output download, and the
//! read-only queue/system endpoints using [`reqwest`]. Each operation
//! carries its own error enum so callers can map failures to the right
//! user-facing message without string matching.

use reqwest::StatusCode;

use easel_core::request::SubmissionRequest;
use easel_core::types::JobId;

use crate::wire::{
    GeneratePayload, QueueStats, StatusResponse, SubmitResponse, SystemInfo, ValidationErrorBody,
};

/// HTTP client for a single inference backend.
pub struct QueueApi {
    client: reqwest::Client,
    base_url: String,
}

/// Errors from job submission.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    /// The backend reported 503: the pipeline is not loaded/available.
    #[error("the inference pipeline is unavailable")]
    PipelineUnavailable,

    /// The backend rejected the request as invalid (400).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Any other non-success response.
    #[error("submission rejected with status {0}")]
    Failed(u16),

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Errors from a status fetch.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    /// The backend does not know this job id (404).
    #[error("job not found")]
    NotFound,

    /// Any other non-success response.
    #[error("status fetch rejected with status {0}")]
    Failed(u16),

    /// The HTTP request itself failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Errors from an output download.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// Non-success response while fetching the output bytes.
    #[error("download rejected with status {0}")]
    Failed(u16),

    /// The HTTP request itself failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Errors from the read-only queue/system endpoints.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// Non-success response.
    #[error("query rejected with status {0}")]
    Failed(u16),

    /// The HTTP request itself failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl QueueApi {
    /// Create a new API client for an inference backend.
    ///
    /// * `base_url` - Base HTTP URL, e.g. `http://localhost:8000`.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling across request lifecycles).
    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// Base HTTP URL of the backend.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a job for execution.
    ///
    /// Text-only generation requests go to `POST /generate` as JSON;
    /// image-bearing edit requests go to `POST /edit` as multipart with
    /// one repeated `images` field per attachment, in attachment order.
    pub async fn submit(&self, request: &SubmissionRequest) -> Result<JobId, SubmitError> {
        let response = if request.images().is_empty() {
            let payload = GeneratePayload {
                prompt: request.prompt(),
                negative_prompt: request.negative_prompt(),
                width: request.width(),
                height: request.height(),
                num_inference_steps: request.steps(),
                cfg_scale: request.cfg_scale(),
                seed: request.seed(),
            };
            self.client
                .post(format!("{}/generate", self.base_url))
                .json(&payload)
                .send()
                .await?
        } else {
            let form = Self::build_edit_form(request)?;
            self.client
                .post(format!("{}/edit", self.base_url))
                .multipart(form)
                .send()
                .await?
        };

        let status = response.status();
        if status == StatusCode::SERVICE_UNAVAILABLE {
            return Err(SubmitError::PipelineUnavailable);
        }
        if status == StatusCode::BAD_REQUEST {
            let detail = response
                .json::<ValidationErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(SubmitError::InvalidRequest(detail));
        }
        if !status.is_success() {
            return Err(SubmitError::Failed(status.as_u16()));
        }

        let submitted = response.json::<SubmitResponse>().await?;
        tracing::info!(
            job_id = %submitted.job_id,
            kind = %request.kind(),
            "Job submitted to inference queue",
        );
        Ok(JobId::from(submitted.job_id))
    }

    /// Fetch the current status of a job.
    pub async fn fetch_status(&self, job_id: &JobId) -> Result<easel_core::job::Job, StatusError> {
        let response = self
            .client
            .get(format!("{}/status/{}", self.base_url, job_id))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StatusError::NotFound);
        }
        if !status.is_success() {
            return Err(StatusError::Failed(status.as_u16()));
        }

        let parsed = response.json::<StatusResponse>().await?;
        Ok(parsed.into_job(job_id.clone()))
    }

    /// Download the output image referenced by a completed job.
    ///
    /// * `reference` - the server-relative `output_image_url`.
    pub async fn fetch_output(&self, reference: &str) -> Result<Vec<u8>, DownloadError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, reference))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Failed(status.as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Fetch aggregate queue counters (`GET /queue`).
    pub async fn queue_stats(&self) -> Result<QueueStats, QueryError> {
        self.query_json(format!("{}/queue", self.base_url)).await
    }

    /// Fetch device/capability descriptors (`GET /system/info`).
    pub async fn system_info(&self) -> Result<SystemInfo, QueryError> {
        self.query_json(format!("{}/system/info", self.base_url))
            .await
    }

    // ---- private helpers ----

    /// Assemble the multipart body for an edit submission.
    ///
    /// Every attachment becomes a repeated `images` part carrying its
    /// own filename and declared media type; scalar parameters follow
    /// as text fields.
    fn build_edit_form(
        request: &SubmissionRequest,
    ) -> Result<reqwest::multipart::Form, SubmitError> {
        let mut form = reqwest::multipart::Form::new();
        for image in request.images() {
            let part = reqwest::multipart::Part::bytes(image.bytes.clone())
                .file_name(image.filename.clone())
                .mime_str(&image.media_type)?;
            form = form.part("images", part);
        }
        form = form
            .text("prompt", request.prompt().to_string())
            .text("negative_prompt", request.negative_prompt().to_string())
            .text("num_inference_steps", request.steps().to_string())
            .text("cfg_scale", request.cfg_scale().to_string());
        if let Some(seed) = request.seed() {
            form = form.text("seed", seed.to_string());
        }
        Ok(form)
    }

    /// GET a JSON endpoint and parse the body into the expected type.
    async fn query_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
    ) -> Result<T, QueryError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(QueryError::Failed(status.as_u16()));
        }
        Ok(response.json::<T>().await?)
    }
}
