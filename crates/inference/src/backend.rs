//! The backend seam: everything the orchestrator and poller need from
//! the inference queue, behind a trait so tests can substitute a mock.

use async_trait::async_trait;

use easel_core::job::Job;
use easel_core::request::SubmissionRequest;
use easel_core::types::JobId;

use crate::api::{DownloadError, QueryError, QueueApi, StatusError, SubmitError};
use crate::wire::{QueueStats, SystemInfo};

/// Typed access to the inference queue API.
///
/// [`QueueApi`] is the production implementation; tests use scripted
/// mocks.
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Submit a job, returning the server-assigned id.
    async fn submit(&self, request: &SubmissionRequest) -> Result<JobId, SubmitError>;

    /// Fetch the current status snapshot of a job.
    async fn fetch_status(&self, job_id: &JobId) -> Result<Job, StatusError>;

    /// Download the output bytes referenced by a completed job.
    async fn fetch_output(&self, reference: &str) -> Result<Vec<u8>, DownloadError>;

    /// Aggregate queue counters.
    async fn queue_stats(&self) -> Result<QueueStats, QueryError>;

    /// Device/capability descriptors.
    async fn system_info(&self) -> Result<SystemInfo, QueryError>;
}

#[async_trait]
impl JobBackend for QueueApi {
    async fn submit(&self, request: &SubmissionRequest) -> Result<JobId, SubmitError> {
        QueueApi::submit(self, request).await
    }

    async fn fetch_status(&self, job_id: &JobId) -> Result<Job, StatusError> {
        QueueApi::fetch_status(self, job_id).await
    }

    async fn fetch_output(&self, reference: &str) -> Result<Vec<u8>, DownloadError> {
        QueueApi::fetch_output(self, reference).await
    }

    async fn queue_stats(&self) -> Result<QueueStats, QueryError> {
        QueueApi::queue_stats(self).await
    }

    async fn system_info(&self) -> Result<SystemInfo, QueryError> {
        QueueApi::system_info(self).await
    }
}
