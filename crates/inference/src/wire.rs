//! Wire types for the inference queue's HTTP contract.
//!
//! The backend speaks plain JSON (except for multipart edit
//! submissions, which are assembled in [`crate::api`]). These structs
//! mirror its payloads field for field.

use serde::{Deserialize, Serialize};

use easel_core::job::{Job, JobKind, JobStatus};
use easel_core::types::JobId;

/// Body of `POST /generate`.
#[derive(Debug, Serialize)]
pub struct GeneratePayload<'a> {
    pub prompt: &'a str,
    pub negative_prompt: &'a str,
    pub width: u32,
    pub height: u32,
    pub num_inference_steps: u32,
    pub cfg_scale: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

/// Successful response from `POST /generate` and `POST /edit`.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    /// Server-assigned job identifier.
    pub job_id: String,
}

/// Error body returned with a 400 on submission.
#[derive(Debug, Deserialize)]
pub struct ValidationErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

/// Response from `GET /status/{job_id}`.
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    pub status: JobStatus,
    pub job_type: JobKind,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub output_image_url: Option<String>,
}

impl StatusResponse {
    /// Combine a status payload with the job id it was fetched for.
    pub fn into_job(self, id: JobId) -> Job {
        Job {
            id,
            kind: self.job_type,
            status: self.status,
            progress: self.progress,
            prompt: self.prompt,
            error: self.error,
            output_url: self.output_image_url,
        }
    }
}

/// Aggregate counters from `GET /queue`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueStats {
    #[serde(default)]
    pub queue_size: u64,
    #[serde(default)]
    pub total_jobs: u64,
    #[serde(default)]
    pub completed_jobs: u64,
    #[serde(default)]
    pub failed_jobs: u64,
    #[serde(default)]
    pub generation_jobs: u64,
    #[serde(default)]
    pub edit_jobs: u64,
    /// Id of the job currently executing, if any.
    #[serde(default)]
    pub current_job: Option<String>,
}

/// Device and capability descriptors from `GET /system/info`.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemInfo {
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub cuda_available: bool,
    #[serde(default)]
    pub quantization: bool,
    #[serde(default)]
    pub gpu_name: Option<String>,
    #[serde(default)]
    pub gpu_memory_allocated: Option<String>,
    #[serde(default)]
    pub gpu_memory_total: Option<String>,
    #[serde(default)]
    pub generation_pipeline: Option<String>,
    #[serde(default)]
    pub edit_pipeline: Option<String>,
}
