//! The job model: one unit of inference work tracked by id through
//! queued/processing/terminal states.
//!
//! A [`Job`] is created by the job client when the backend acknowledges
//! a submission, and is only ever mutated by the backend; this system
//! polls it, it never writes it.

use serde::{Deserialize, Serialize};

use crate::types::JobId;

/// The kind of inference work a job performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    /// Text-to-image generation.
    Generate,
    /// Image editing guided by a prompt, with one or more input images.
    Edit,
}

impl std::fmt::Display for JobKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobKind::Generate => f.write_str("generate"),
            JobKind::Edit => f.write_str("edit"),
        }
    }
}

/// Lifecycle state of a job as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Waiting in the backend queue; work has not started.
    Queued,
    /// The backend is actively working on the job.
    Processing,
    /// Finished successfully; an output reference is available.
    Completed,
    /// Finished unsuccessfully; an error message may be available.
    Failed,
}

impl JobStatus {
    /// Whether this status ends the job's lifecycle. No further
    /// polling occurs once a terminal status is observed.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Queued => f.write_str("queued"),
            JobStatus::Processing => f.write_str("processing"),
            JobStatus::Completed => f.write_str("completed"),
            JobStatus::Failed => f.write_str("failed"),
        }
    }
}

/// Snapshot of one tracked inference job.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    /// Server-assigned identifier.
    pub id: JobId,
    /// Generation or edit.
    pub kind: JobKind,
    /// Most recently observed lifecycle state.
    pub status: JobStatus,
    /// Fractional completion (0.0 to 1.0), when the backend reports one.
    pub progress: Option<f64>,
    /// The prompt the job was submitted with, when reported.
    pub prompt: Option<String>,
    /// Backend-supplied error message; present only when failed.
    pub error: Option<String>,
    /// Server-relative URL of the output image; present only when
    /// completed.
    pub output_url: Option<String>,
}
