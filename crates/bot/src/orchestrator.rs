//! The per-trigger workflow: gate, acknowledge, preprocess, submit,
//! poll, deliver.
//!
//! Each trigger runs as an independent task with its own error
//! boundary. Every failure path produces exactly one localized
//! user-visible message and stops; nothing is retried. Side effects are
//! strictly ordered: the access gate runs before any message is sent,
//! the acknowledgment is posted before any backend round trip, and no
//! polling starts unless submission succeeded.

use std::sync::Arc;

use easel_core::job::JobKind;
use easel_core::lang::{Language, LanguageStore};
use easel_core::request::{AttachedImage, SubmissionRequest};
use easel_core::types::{CallerId, JobId};
use easel_inference::api::{StatusError, SubmitError};
use easel_inference::backend::JobBackend;
use easel_inference::poller::poll_until_terminal;

use crate::config::BotConfig;
use crate::i18n::Message;
use crate::sink::{
    AckHandle, Command, ConversationSink, EditCommand, GenerateCommand, OutgoingFile, Trigger,
};

/// Composes the access gate, preprocessor, job client, and poller into
/// the top-level request workflow.
///
/// Cheap to clone; all state is behind `Arc`.
pub struct Orchestrator<B, S> {
    backend: Arc<B>,
    sink: Arc<S>,
    config: Arc<BotConfig>,
    languages: Arc<LanguageStore>,
}

impl<B, S> Clone for Orchestrator<B, S> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            sink: Arc::clone(&self.sink),
            config: Arc::clone(&self.config),
            languages: Arc::clone(&self.languages),
        }
    }
}

impl<B, S> Orchestrator<B, S>
where
    B: JobBackend + 'static,
    S: ConversationSink + 'static,
{
    pub fn new(
        backend: Arc<B>,
        sink: Arc<S>,
        config: Arc<BotConfig>,
        languages: Arc<LanguageStore>,
    ) -> Self {
        Self {
            backend,
            sink,
            config,
            languages,
        }
    }

    /// Run a trigger as an independent background task.
    pub fn spawn(&self, trigger: Trigger) -> tokio::task::JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move { this.handle(trigger).await })
    }

    /// Execute one trigger to completion.
    ///
    /// All errors are handled inside: by the time this returns, the
    /// caller has seen exactly one outcome message (or an acknowledgment
    /// edit) for the trigger.
    pub async fn handle(&self, trigger: Trigger) {
        let lang = self.languages.get(trigger.caller).await;

        let decision =
            self.config
                .access
                .is_allowed(trigger.origin, trigger.channel, trigger.caller);
        if !decision.allowed {
            tracing::info!(
                caller = trigger.caller.0,
                restriction = ?decision.restriction,
                "Trigger denied by access gate",
            );
            self.send_text(Message::NotAvailableHere, lang).await;
            return;
        }

        match trigger.command {
            Command::Generate(generate) => self.handle_generate(lang, generate).await,
            Command::Edit(edit) => self.handle_edit(lang, edit).await,
            Command::Status { job_id } => self.handle_status(lang, job_id).await,
            Command::Queue => self.handle_queue(lang).await,
            Command::System => self.handle_system(lang).await,
            Command::Language { code } => self.handle_language(lang, trigger.caller, code).await,
        }
    }

    // ---- job-running commands ----

    async fn handle_generate(&self, lang: Language, command: GenerateCommand) {
        let Some(ack) = self.acknowledge(Message::Enqueued, lang).await else {
            return;
        };

        let request = SubmissionRequest::generate(command.prompt)
            .negative_prompt(command.negative_prompt.unwrap_or_default())
            .size(command.width.unwrap_or(512), command.height.unwrap_or(512))
            .steps(command.steps.unwrap_or(self.config.default_generate_steps))
            .cfg_scale(command.cfg_scale.unwrap_or(4.0))
            .seed(command.seed);
        let request = match request.build() {
            Ok(request) => request,
            Err(e) => {
                self.edit_ack(ack, Message::InvalidRequest { detail: e.to_string() }, lang)
                    .await;
                return;
            }
        };

        self.run_job(lang, ack, request).await;
    }

    async fn handle_edit(&self, lang: Language, command: EditCommand) {
        if command.images.is_empty() {
            self.send_text(Message::AttachValidImage, lang).await;
            return;
        }

        let Some(ack) = self
            .acknowledge(
                Message::EnqueuedWithImages {
                    image_count: command.images.len(),
                },
                lang,
            )
            .await
        else {
            return;
        };

        // Rescale oversized attachments before the multipart body is
        // built; attachment order is preserved.
        let mut images = Vec::with_capacity(command.images.len());
        for image in command.images {
            match easel_imaging::resize_if_needed(&image.bytes, self.config.max_image_dimension) {
                Ok(bytes) => images.push(AttachedImage { bytes, ..image }),
                Err(e) => {
                    tracing::warn!(
                        filename = %image.filename,
                        error = %e,
                        "Attachment is not a usable image",
                    );
                    self.edit_ack(ack, Message::AttachValidImage, lang).await;
                    return;
                }
            }
        }

        let mut builder = SubmissionRequest::edit(command.prompt)
            .negative_prompt(command.negative_prompt.unwrap_or_default())
            .steps(command.steps.unwrap_or(self.config.default_edit_steps))
            .cfg_scale(command.cfg_scale.unwrap_or(4.0))
            .seed(command.seed);
        for image in images {
            builder = builder.attach(image);
        }
        let request = match builder.build() {
            Ok(request) => request,
            Err(e) => {
                self.edit_ack(ack, Message::InvalidRequest { detail: e.to_string() }, lang)
                    .await;
                return;
            }
        };

        self.run_job(lang, ack, request).await;
    }

    /// Submit, poll, download, deliver. Shared by generate and edit.
    async fn run_job(&self, lang: Language, ack: AckHandle, request: SubmissionRequest) {
        let kind = request.kind();

        let job_id = match self.backend.submit(&request).await {
            Ok(job_id) => job_id,
            Err(SubmitError::PipelineUnavailable) => {
                self.edit_ack(ack, Message::PipelineUnavailable { kind }, lang)
                    .await;
                return;
            }
            Err(SubmitError::InvalidRequest(detail)) => {
                self.edit_ack(ack, Message::InvalidRequest { detail }, lang)
                    .await;
                return;
            }
            Err(SubmitError::Failed(code)) => {
                self.edit_ack(ack, Message::SubmitFailed { code }, lang).await;
                return;
            }
            Err(e @ SubmitError::Request(_)) => {
                tracing::error!(error = %e, "Submission request failed");
                self.send_text(Message::SomethingWentWrong { error: e.to_string() }, lang)
                    .await;
                return;
            }
        };

        let job = match poll_until_terminal(
            self.backend.as_ref(),
            &job_id,
            self.config.timeout_for(kind),
        )
        .await
        {
            Ok(job) => job,
            Err(e) => {
                self.send_text(Message::SomethingWentWrong { error: e.to_string() }, lang)
                    .await;
                return;
            }
        };

        let Some(reference) = job.output_url else {
            tracing::error!(job_id = %job_id, "Completed job carried no output reference");
            self.send_text(
                Message::SomethingWentWrong {
                    error: "completed job carried no output reference".into(),
                },
                lang,
            )
            .await;
            return;
        };

        let bytes = match self.backend.fetch_output(&reference).await {
            Ok(bytes) => bytes,
            Err(e) => {
                self.send_text(Message::SomethingWentWrong { error: e.to_string() }, lang)
                    .await;
                return;
            }
        };

        let filename = match kind {
            JobKind::Generate => "generated.png",
            JobKind::Edit => "edited.png",
        };
        let delivery = self
            .sink
            .send(
                Message::ImageReady { kind }.render(lang),
                Some(OutgoingFile {
                    filename: filename.to_string(),
                    bytes,
                }),
            )
            .await;
        if let Err(e) = delivery {
            tracing::error!(job_id = %job_id, error = %e, "Failed to deliver result");
        }
    }

    // ---- read-only commands ----

    async fn handle_status(&self, lang: Language, job_id: JobId) {
        match self.backend.fetch_status(&job_id).await {
            Ok(job) => self.send_text(Message::StatusReport { job }, lang).await,
            Err(StatusError::NotFound) => self.send_text(Message::JobNotFound, lang).await,
            Err(StatusError::Failed(code)) => {
                self.send_text(Message::StatusFetchFailed { code }, lang).await
            }
            Err(e) => {
                self.send_text(Message::SomethingWentWrong { error: e.to_string() }, lang)
                    .await
            }
        }
    }

    async fn handle_queue(&self, lang: Language) {
        match self.backend.queue_stats().await {
            Ok(stats) => self.send_text(Message::QueueReport { stats }, lang).await,
            Err(easel_inference::api::QueryError::Failed(code)) => {
                self.send_text(Message::QueueFetchFailed { code }, lang).await
            }
            Err(e) => {
                self.send_text(Message::SomethingWentWrong { error: e.to_string() }, lang)
                    .await
            }
        }
    }

    async fn handle_system(&self, lang: Language) {
        match self.backend.system_info().await {
            Ok(info) => self.send_text(Message::SystemReport { info }, lang).await,
            Err(easel_inference::api::QueryError::Failed(code)) => {
                self.send_text(Message::SystemFetchFailed { code }, lang).await
            }
            Err(e) => {
                self.send_text(Message::SomethingWentWrong { error: e.to_string() }, lang)
                    .await
            }
        }
    }

    async fn handle_language(&self, lang: Language, caller: CallerId, code: String) {
        match Language::from_code(&code) {
            Some(selected) => {
                self.languages.set(caller, selected).await;
                // Confirm in the language the caller just selected.
                self.send_text(Message::LanguageSet, selected).await;
            }
            None => self.send_text(Message::LanguageCurrent, lang).await,
        }
    }

    // ---- delivery helpers ----

    /// Post the acknowledgment. A sink failure here aborts the trigger:
    /// without an acknowledgment there is no conversation to report
    /// into.
    async fn acknowledge(&self, message: Message, lang: Language) -> Option<AckHandle> {
        match self.sink.acknowledge(message.render(lang)).await {
            Ok(ack) => Some(ack),
            Err(e) => {
                tracing::error!(error = %e, "Failed to post acknowledgment");
                None
            }
        }
    }

    async fn edit_ack(&self, ack: AckHandle, message: Message, lang: Language) {
        if let Err(e) = self.sink.edit(ack, message.render(lang)).await {
            tracing::error!(error = %e, "Failed to edit acknowledgment");
        }
    }

    async fn send_text(&self, message: Message, lang: Language) {
        if let Err(e) = self.sink.send(message.render(lang), None).await {
            tracing::error!(error = %e, "Failed to send message");
        }
    }
}
