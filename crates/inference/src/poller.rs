//! Drives a submitted job to a terminal state.
//!
//! Polls the backend at a fixed interval until the job completes,
//! fails, or exceeds its processing-time budget. The timeout clock
//! starts only once the job leaves `queued`: queue depth is outside
//! the caller's control, so a job stuck waiting never times out.
//! Between polls the task suspends cooperatively, so many jobs can be
//! polled concurrently without occupying workers.

use std::time::Duration;

use tokio::time::Instant;

use easel_core::job::{Job, JobStatus};
use easel_core::types::JobId;

use crate::api::StatusError;
use crate::backend::JobBackend;

/// Fixed delay between consecutive status fetches.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Fallback error text when a failed job carries no backend message.
const GENERIC_FAILURE: &str = "Job failed";

/// Errors from polling a job to completion.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// The backend reported the job as failed.
    #[error("job failed: {0}")]
    JobFailed(String),

    /// Processing time exceeded the caller's budget.
    #[error("job timed out")]
    TimedOut,

    /// A status fetch failed; polling stops immediately.
    #[error(transparent)]
    Status(#[from] StatusError),
}

/// Poll `job_id` until it reaches a terminal state.
///
/// Returns the full job record on completion. The processing-start
/// instant is recorded exactly once, on the first observed status that
/// is neither `queued` nor terminal; `timeout` is compared against
/// elapsed time since that instant, and the comparison happens strictly
/// after observing the latest status, so a job whose completion is
/// observed on the same poll as the budget expiry still completes.
pub async fn poll_until_terminal<B: JobBackend + ?Sized>(
    backend: &B,
    job_id: &JobId,
    timeout: Duration,
) -> Result<Job, PollError> {
    let mut processing_started: Option<Instant> = None;

    loop {
        let job = backend.fetch_status(job_id).await?;

        match job.status {
            JobStatus::Completed => {
                tracing::info!(job_id = %job_id, "Job completed");
                return Ok(job);
            }
            JobStatus::Failed => {
                let message = job
                    .error
                    .clone()
                    .unwrap_or_else(|| GENERIC_FAILURE.to_string());
                tracing::warn!(job_id = %job_id, error = %message, "Job failed");
                return Err(PollError::JobFailed(message));
            }
            JobStatus::Queued => {
                // Budget has not started; queue depth is not ours to police.
                tracing::debug!(job_id = %job_id, "Job still queued");
            }
            JobStatus::Processing => {
                let started = *processing_started.get_or_insert_with(Instant::now);
                tracing::debug!(
                    job_id = %job_id,
                    progress = ?job.progress,
                    elapsed_secs = started.elapsed().as_secs(),
                    "Job processing",
                );
                if started.elapsed() > timeout {
                    tracing::warn!(
                        job_id = %job_id,
                        timeout_secs = timeout.as_secs(),
                        "Job exceeded processing budget, abandoning poll",
                    );
                    return Err(PollError::TimedOut);
                }
            }
        }

        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
