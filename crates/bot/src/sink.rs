//! The chat-transport seam.
//!
//! A [`Trigger`] is one inbound request from the chat platform; a
//! [`ConversationSink`] is the outbound half, scoped to the
//! conversation that trigger arrived in. The platform integration (or
//! the console frontend) owns both ends; the orchestrator only sees
//! these types.

use async_trait::async_trait;

use easel_core::access::OriginScope;
use easel_core::request::AttachedImage;
use easel_core::types::{CallerId, ChannelId, JobId};

/// One inbound request, already normalized by the platform layer.
#[derive(Debug)]
pub struct Trigger {
    /// Where the trigger arrived (direct message or guild).
    pub origin: OriginScope,
    /// The channel the trigger arrived in.
    pub channel: ChannelId,
    /// Who triggered it.
    pub caller: CallerId,
    /// What they asked for.
    pub command: Command,
}

/// The action a trigger requests.
#[derive(Debug)]
pub enum Command {
    /// Generate an image from a text prompt.
    Generate(GenerateCommand),
    /// Edit one or more attached images guided by a prompt.
    Edit(EditCommand),
    /// Look up the status of a previously submitted job.
    Status { job_id: JobId },
    /// Show aggregate queue counters.
    Queue,
    /// Show backend device/capability information.
    System,
    /// Select the caller's interface language.
    Language { code: String },
}

/// Parameters for a generation request. `None` fields fall back to the
/// configured defaults.
#[derive(Debug, Default)]
pub struct GenerateCommand {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub steps: Option<u32>,
    pub cfg_scale: Option<f64>,
    pub seed: Option<i64>,
}

/// Parameters for an edit request.
#[derive(Debug, Default)]
pub struct EditCommand {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub steps: Option<u32>,
    pub cfg_scale: Option<f64>,
    pub seed: Option<i64>,
    /// Attached images, in attachment order.
    pub images: Vec<AttachedImage>,
}

/// Handle to a previously posted acknowledgment, for later edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AckHandle(pub u64);

/// A file delivered alongside a message.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Delivery to the chat platform failed.
#[derive(Debug, thiserror::Error)]
#[error("message delivery failed: {0}")]
pub struct SinkError(pub String);

/// Outbound messaging scoped to one conversation.
///
/// Implementations are created per trigger by the platform layer and
/// carry the conversation context with them: `send` tags the original
/// caller and references the triggering message, matching the
/// platform's reply conventions.
#[async_trait]
pub trait ConversationSink: Send + Sync {
    /// Post the immediate acknowledgment and return a handle so later
    /// failures can replace its text.
    async fn acknowledge(&self, text: String) -> Result<AckHandle, SinkError>;

    /// Replace the text of a previously posted acknowledgment.
    async fn edit(&self, ack: AckHandle, text: String) -> Result<(), SinkError>;

    /// Send a message to the conversation, tagging the original caller
    /// and referencing the trigger, optionally with an attached file.
    async fn send(&self, text: String, attachment: Option<OutgoingFile>) -> Result<(), SinkError>;
}
