//! End-to-end orchestrator tests against a scripted backend and a
//! recording conversation sink.
//!
//! These cover the full trigger workflow: gate, acknowledgment,
//! preprocessing, submission, polling, and delivery, without any real
//! HTTP or chat platform.

use std::collections::HashSet;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use easel_bot::config::BotConfig;
use easel_bot::orchestrator::Orchestrator;
use easel_bot::sink::{
    AckHandle, Command, ConversationSink, EditCommand, GenerateCommand, OutgoingFile, SinkError,
    Trigger,
};
use easel_core::access::{AccessConfig, OriginScope};
use easel_core::job::{Job, JobKind, JobStatus};
use easel_core::lang::{Language, LanguageStore};
use easel_core::request::{AttachedImage, SubmissionRequest};
use easel_core::types::{CallerId, ChannelId, GuildId, JobId};
use easel_inference::api::{DownloadError, QueryError, StatusError, SubmitError};
use easel_inference::backend::JobBackend;
use easel_inference::wire::{QueueStats, SystemInfo};

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

/// Backend with a scripted submit outcome and status sequence.
struct MockBackend {
    /// `None` means submission succeeds with job id `abc123`.
    submit_error: Mutex<Option<SubmitError>>,
    /// Status snapshots returned in order; the last repeats forever.
    statuses: Mutex<Vec<Job>>,
    output: Vec<u8>,
    submitted: Mutex<Vec<SubmissionRequest>>,
    status_polls: AtomicUsize,
}

impl MockBackend {
    fn new(statuses: Vec<Job>, output: Vec<u8>) -> Self {
        Self {
            submit_error: Mutex::new(None),
            statuses: Mutex::new(statuses),
            output,
            submitted: Mutex::new(Vec::new()),
            status_polls: AtomicUsize::new(0),
        }
    }

    fn failing_submit(error: SubmitError) -> Self {
        let backend = Self::new(Vec::new(), Vec::new());
        *backend.submit_error.lock().unwrap() = Some(error);
        backend
    }

    fn submitted(&self) -> Vec<SubmissionRequest> {
        self.submitted.lock().unwrap().clone()
    }

    fn poll_count(&self) -> usize {
        self.status_polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobBackend for MockBackend {
    async fn submit(&self, request: &SubmissionRequest) -> Result<JobId, SubmitError> {
        self.submitted.lock().unwrap().push(request.clone());
        match self.submit_error.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(JobId::from("abc123")),
        }
    }

    async fn fetch_status(&self, _job_id: &JobId) -> Result<Job, StatusError> {
        self.status_polls.fetch_add(1, Ordering::SeqCst);
        let mut statuses = self.statuses.lock().unwrap();
        assert!(!statuses.is_empty(), "unexpected status poll");
        if statuses.len() > 1 {
            Ok(statuses.remove(0))
        } else {
            Ok(statuses[0].clone())
        }
    }

    async fn fetch_output(&self, _reference: &str) -> Result<Vec<u8>, DownloadError> {
        Ok(self.output.clone())
    }

    async fn queue_stats(&self) -> Result<QueueStats, QueryError> {
        unimplemented!("not exercised here")
    }

    async fn system_info(&self) -> Result<SystemInfo, QueryError> {
        unimplemented!("not exercised here")
    }
}

/// Everything the bot said, in order.
#[derive(Debug, Clone, PartialEq)]
enum SinkEvent {
    Ack(String),
    Edit(u64, String),
    Send(String, Option<OutgoingFile>),
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    fn events(&self) -> Vec<SinkEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConversationSink for RecordingSink {
    async fn acknowledge(&self, text: String) -> Result<AckHandle, SinkError> {
        self.events.lock().unwrap().push(SinkEvent::Ack(text));
        Ok(AckHandle(1))
    }

    async fn edit(&self, ack: AckHandle, text: String) -> Result<(), SinkError> {
        self.events.lock().unwrap().push(SinkEvent::Edit(ack.0, text));
        Ok(())
    }

    async fn send(&self, text: String, attachment: Option<OutgoingFile>) -> Result<(), SinkError> {
        self.events
            .lock()
            .unwrap()
            .push(SinkEvent::Send(text, attachment));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn test_config() -> BotConfig {
    BotConfig {
        api_base_url: "http://localhost:8000".into(),
        access: AccessConfig::default(),
        generate_timeout: Duration::from_secs(300),
        edit_timeout: Duration::from_secs(600),
        default_generate_steps: 20,
        default_edit_steps: 50,
        max_image_dimension: 128,
        default_language: Language::English,
    }
}

fn orchestrator(
    backend: Arc<MockBackend>,
    sink: Arc<RecordingSink>,
    config: BotConfig,
) -> Orchestrator<MockBackend, RecordingSink> {
    Orchestrator::new(
        backend,
        sink,
        Arc::new(config),
        Arc::new(LanguageStore::new(Language::English)),
    )
}

fn guild_trigger(command: Command) -> Trigger {
    Trigger {
        origin: OriginScope::Guild(GuildId(1)),
        channel: ChannelId(2),
        caller: CallerId(3),
        command,
    }
}

fn job(status: JobStatus, kind: JobKind) -> Job {
    Job {
        id: JobId::from("abc123"),
        kind,
        status,
        progress: None,
        prompt: None,
        error: None,
        output_url: None,
    }
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        width,
        height,
        image::Rgb([10, 200, 90]),
    ));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageOutputFormat::Png).unwrap();
    out.into_inner()
}

fn attachment(name: &str, bytes: Vec<u8>) -> AttachedImage {
    AttachedImage {
        bytes,
        media_type: "image/png".into(),
        filename: name.into(),
    }
}

// ---------------------------------------------------------------------------
// Scenario: successful generation end to end
// ---------------------------------------------------------------------------

/// Submit a generation, watch it go queued -> processing -> completed,
/// and verify exactly one delivery message containing the output bytes.
#[tokio::test(start_paused = true)]
async fn generation_delivers_output_bytes_once() {
    let mut processing = job(JobStatus::Processing, JobKind::Generate);
    processing.progress = Some(0.5);
    let mut completed = job(JobStatus::Completed, JobKind::Generate);
    completed.output_url = Some("/img/abc123.png".into());

    let backend = Arc::new(MockBackend::new(
        vec![
            job(JobStatus::Queued, JobKind::Generate),
            processing,
            completed,
        ],
        b"png-bytes".to_vec(),
    ));
    let sink = Arc::new(RecordingSink::default());
    let orchestrator = orchestrator(Arc::clone(&backend), Arc::clone(&sink), test_config());

    orchestrator
        .handle(guild_trigger(Command::Generate(GenerateCommand {
            prompt: "a red fox".into(),
            width: Some(1024),
            height: Some(1024),
            steps: Some(8),
            ..Default::default()
        })))
        .await;

    // The submitted request reflects the caller's parameters.
    let submitted = backend.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].prompt(), "a red fox");
    assert_eq!((submitted[0].width(), submitted[0].height()), (1024, 1024));
    assert_eq!(submitted[0].steps(), 8);

    // Acknowledgment first, then exactly one delivery with the bytes.
    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        SinkEvent::Ack("Got it, I have enqueued your request.".into())
    );
    match &events[1] {
        SinkEvent::Send(text, Some(file)) => {
            assert_eq!(text, "Here's your image!");
            assert_eq!(file.filename, "generated.png");
            assert_eq!(file.bytes, b"png-bytes");
        }
        other => panic!("expected delivery with attachment, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Scenario: edit with mixed-size attachments
// ---------------------------------------------------------------------------

/// Of three attachments, only the one exceeding the dimension limit is
/// resized, and attachment order is preserved in the built request.
#[tokio::test(start_paused = true)]
async fn edit_resizes_only_oversized_attachment_and_keeps_order() {
    let small_a = png(100, 100);
    let oversized = png(300, 100);
    let small_c = png(64, 128);

    let mut completed = job(JobStatus::Completed, JobKind::Edit);
    completed.output_url = Some("/img/abc123.png".into());
    let backend = Arc::new(MockBackend::new(
        vec![completed],
        b"edited-bytes".to_vec(),
    ));
    let sink = Arc::new(RecordingSink::default());
    let orchestrator = orchestrator(Arc::clone(&backend), Arc::clone(&sink), test_config());

    orchestrator
        .handle(guild_trigger(Command::Edit(EditCommand {
            prompt: "add a hat".into(),
            images: vec![
                attachment("a.png", small_a.clone()),
                attachment("b.png", oversized.clone()),
                attachment("c.png", small_c.clone()),
            ],
            ..Default::default()
        })))
        .await;

    let submitted = backend.submitted();
    assert_eq!(submitted.len(), 1);
    let images = submitted[0].images();
    assert_eq!(images.len(), 3);

    // Order preserved.
    let names: Vec<_> = images.iter().map(|i| i.filename.as_str()).collect();
    assert_eq!(names, ["a.png", "b.png", "c.png"]);

    // In-bounds attachments pass through byte-identical.
    assert_eq!(images[0].bytes, small_a);
    assert_eq!(images[2].bytes, small_c);

    // The oversized one was rescaled to the 128px limit.
    assert_ne!(images[1].bytes, oversized);
    let resized = image::load_from_memory(&images[1].bytes).unwrap();
    assert_eq!((resized.width(), resized.height()), (128, 42));

    // Edit defaults applied.
    assert_eq!(submitted[0].steps(), 50);
}

// ---------------------------------------------------------------------------
// Scenario: pipeline unavailable
// ---------------------------------------------------------------------------

/// A 503 on submit edits the acknowledgment with the localized
/// pipeline-unavailable message and performs zero status polls.
#[tokio::test(start_paused = true)]
async fn unavailable_pipeline_stops_before_any_poll() {
    let backend = Arc::new(MockBackend::failing_submit(SubmitError::PipelineUnavailable));
    let sink = Arc::new(RecordingSink::default());
    let orchestrator = orchestrator(Arc::clone(&backend), Arc::clone(&sink), test_config());

    orchestrator
        .handle(guild_trigger(Command::Generate(GenerateCommand {
            prompt: "a red fox".into(),
            ..Default::default()
        })))
        .await;

    assert_eq!(backend.poll_count(), 0);
    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[1],
        SinkEvent::Edit(
            1,
            "Sorry, the generation pipeline is not available right now.".into()
        )
    );
}

/// A backend validation error surfaces its detail text.
#[tokio::test(start_paused = true)]
async fn invalid_request_detail_reaches_the_caller() {
    let backend = Arc::new(MockBackend::failing_submit(SubmitError::InvalidRequest(
        "width must be a multiple of 8".into(),
    )));
    let sink = Arc::new(RecordingSink::default());
    let orchestrator = orchestrator(Arc::clone(&backend), Arc::clone(&sink), test_config());

    orchestrator
        .handle(guild_trigger(Command::Generate(GenerateCommand {
            prompt: "a red fox".into(),
            width: Some(1001),
            ..Default::default()
        })))
        .await;

    assert_eq!(
        sink.events()[1],
        SinkEvent::Edit(1, "Invalid request: width must be a multiple of 8".into())
    );
}

// ---------------------------------------------------------------------------
// Failure paths after submission
// ---------------------------------------------------------------------------

/// A failed job produces exactly one "something went wrong" message
/// carrying the backend's error text.
#[tokio::test(start_paused = true)]
async fn failed_job_reports_backend_error() {
    let mut failed = job(JobStatus::Failed, JobKind::Generate);
    failed.error = Some("out of memory".into());
    let backend = Arc::new(MockBackend::new(
        vec![job(JobStatus::Queued, JobKind::Generate), failed],
        Vec::new(),
    ));
    let sink = Arc::new(RecordingSink::default());
    let orchestrator = orchestrator(Arc::clone(&backend), Arc::clone(&sink), test_config());

    orchestrator
        .handle(guild_trigger(Command::Generate(GenerateCommand {
            prompt: "a red fox".into(),
            ..Default::default()
        })))
        .await;

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[1],
        SinkEvent::Send(
            "Sorry, something went wrong: job failed: out of memory".into(),
            None
        )
    );
}

/// A job stuck in processing past the budget times out and produces a
/// single failure message.
#[tokio::test(start_paused = true)]
async fn stuck_job_times_out_with_one_message() {
    let backend = Arc::new(MockBackend::new(
        vec![job(JobStatus::Processing, JobKind::Generate)],
        Vec::new(),
    ));
    let sink = Arc::new(RecordingSink::default());
    let mut config = test_config();
    config.generate_timeout = Duration::from_secs(10);
    let orchestrator = orchestrator(Arc::clone(&backend), Arc::clone(&sink), config);

    orchestrator
        .handle(guild_trigger(Command::Generate(GenerateCommand {
            prompt: "a red fox".into(),
            ..Default::default()
        })))
        .await;

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[1],
        SinkEvent::Send("Sorry, something went wrong: job timed out".into(), None)
    );
}

// ---------------------------------------------------------------------------
// Access gate
// ---------------------------------------------------------------------------

/// A direct message with an empty DM allow-set is denied before any
/// backend interaction.
#[tokio::test(start_paused = true)]
async fn direct_message_denied_by_default() {
    let backend = Arc::new(MockBackend::new(Vec::new(), Vec::new()));
    let sink = Arc::new(RecordingSink::default());
    let orchestrator = orchestrator(Arc::clone(&backend), Arc::clone(&sink), test_config());

    orchestrator
        .handle(Trigger {
            origin: OriginScope::DirectMessage,
            channel: ChannelId(0),
            caller: CallerId(3),
            command: Command::Generate(GenerateCommand {
                prompt: "a red fox".into(),
                ..Default::default()
            }),
        })
        .await;

    assert!(backend.submitted().is_empty());
    assert_eq!(backend.poll_count(), 0);
    assert_eq!(
        sink.events(),
        vec![SinkEvent::Send(
            "This command is not available here.".into(),
            None
        )]
    );
}

/// A guild outside the allow-set is denied; a listed one is allowed.
#[tokio::test(start_paused = true)]
async fn guild_allow_set_is_enforced() {
    let backend = Arc::new(MockBackend::new(Vec::new(), Vec::new()));
    let sink = Arc::new(RecordingSink::default());
    let mut config = test_config();
    config.access.allowed_guilds = HashSet::from([GuildId(99)]);
    let orchestrator = orchestrator(Arc::clone(&backend), Arc::clone(&sink), config);

    orchestrator
        .handle(guild_trigger(Command::Generate(GenerateCommand {
            prompt: "a red fox".into(),
            ..Default::default()
        })))
        .await;

    assert!(backend.submitted().is_empty());
    assert_eq!(
        sink.events(),
        vec![SinkEvent::Send(
            "This command is not available here.".into(),
            None
        )]
    );
}

// ---------------------------------------------------------------------------
// Language preference
// ---------------------------------------------------------------------------

/// Selecting a language confirms in the new language and localizes
/// subsequent replies for that caller only.
#[tokio::test(start_paused = true)]
async fn language_selection_localizes_later_replies() {
    let backend = Arc::new(MockBackend::failing_submit(SubmitError::PipelineUnavailable));
    let sink = Arc::new(RecordingSink::default());
    let orchestrator = orchestrator(Arc::clone(&backend), Arc::clone(&sink), test_config());

    orchestrator
        .handle(guild_trigger(Command::Language { code: "zh".into() }))
        .await;
    orchestrator
        .handle(guild_trigger(Command::Generate(GenerateCommand {
            prompt: "a red fox".into(),
            ..Default::default()
        })))
        .await;

    let events = sink.events();
    assert_eq!(
        events[0],
        SinkEvent::Send("语言已设置为**中文**。".into(), None)
    );
    assert_eq!(events[1], SinkEvent::Ack("收到，已将你的请求加入队列。".into()));
    assert_eq!(
        events[2],
        SinkEvent::Edit(1, "抱歉，图片生成服务目前不可用。".into())
    );
}

/// An unsupported code leaves the preference unchanged and reports the
/// current language.
#[tokio::test(start_paused = true)]
async fn unsupported_language_code_reports_current_language() {
    let backend = Arc::new(MockBackend::new(Vec::new(), Vec::new()));
    let sink = Arc::new(RecordingSink::default());
    let orchestrator = orchestrator(Arc::clone(&backend), Arc::clone(&sink), test_config());

    orchestrator
        .handle(guild_trigger(Command::Language { code: "fr".into() }))
        .await;

    assert_eq!(
        sink.events(),
        vec![SinkEvent::Send(
            "Current language: **English**. Use `/language` to switch.".into(),
            None
        )]
    );
}

// ---------------------------------------------------------------------------
// Attachment validation
// ---------------------------------------------------------------------------

/// Undecodable attachment bytes surface as an invalid-input message,
/// not a crash, and nothing is submitted.
#[tokio::test(start_paused = true)]
async fn garbage_attachment_is_rejected_before_submission() {
    let backend = Arc::new(MockBackend::new(Vec::new(), Vec::new()));
    let sink = Arc::new(RecordingSink::default());
    let orchestrator = orchestrator(Arc::clone(&backend), Arc::clone(&sink), test_config());

    orchestrator
        .handle(guild_trigger(Command::Edit(EditCommand {
            prompt: "add a hat".into(),
            images: vec![attachment("junk.png", b"not an image".to_vec())],
            ..Default::default()
        })))
        .await;

    assert!(backend.submitted().is_empty());
    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        SinkEvent::Ack("Got it, I have enqueued your request with 1 image(s).".into())
    );
    assert_eq!(
        events[1],
        SinkEvent::Edit(1, "Please attach a valid image file.".into())
    );
}
