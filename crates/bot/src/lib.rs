//! Request orchestration for the easel bot.
//!
//! Bridges chat-platform triggers to the inference queue: gates access,
//! acknowledges the caller, preprocesses attached images, submits the
//! job, polls it to completion, and delivers the result. The chat
//! transport itself is an external collaborator behind the
//! [`sink::ConversationSink`] trait; a console frontend in `main.rs`
//! drives the same pipeline for local development.

pub mod config;
pub mod console;
pub mod i18n;
pub mod orchestrator;
pub mod sink;
pub mod trigger;
