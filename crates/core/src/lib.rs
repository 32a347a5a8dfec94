//! Shared domain types for the easel platform.
//!
//! Defines the identifiers, job model, submission requests, access
//! gating, and language preferences used by every other crate. This
//! crate has no knowledge of HTTP, the chat platform, or image codecs.

pub mod access;
pub mod job;
pub mod lang;
pub mod request;
pub mod types;
