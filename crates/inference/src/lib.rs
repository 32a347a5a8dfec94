//! HTTP client and polling loop for the inference queue API.
//!
//! Wraps the backend's REST contract (job submission, status fetch,
//! output download, queue/system introspection) using [`reqwest`], and
//! drives submitted jobs to a terminal state with an adaptive timeout
//! that only counts processing time, not queueing latency.

pub mod api;
pub mod backend;
pub mod poller;
pub mod wire;

pub use api::{DownloadError, QueryError, QueueApi, StatusError, SubmitError};
pub use backend::JobBackend;
pub use poller::{poll_until_terminal, PollError, POLL_INTERVAL};
