//! Localized user-facing messages.
//!
//! Every string the bot ever shows a caller is one variant of
//! [`Message`], rendered against a [`Language`]. The key set is fixed
//! at compile time, so a missing translation is a compile error rather
//! than a runtime fallback; placeholder data travels as variant fields.

use easel_core::job::{Job, JobKind};
use easel_core::lang::Language;
use easel_inference::wire::{QueueStats, SystemInfo};

/// One user-visible message, ready to render in any supported language.
#[derive(Debug)]
pub enum Message {
    /// Acknowledgment for a text-only request.
    Enqueued,
    /// Acknowledgment for a request with attached images.
    EnqueuedWithImages { image_count: usize },
    /// The backend reported 503 on submission.
    PipelineUnavailable { kind: JobKind },
    /// The backend rejected the submission as invalid.
    InvalidRequest { detail: String },
    /// The backend rejected the submission with some other status.
    SubmitFailed { code: u16 },
    /// Delivery line accompanying a finished image.
    ImageReady { kind: JobKind },
    /// Generic failure wrapper; `error` carries the raw detail.
    SomethingWentWrong { error: String },
    /// The access gate denied this trigger.
    NotAvailableHere,
    /// An attachment could not be decoded as an image.
    AttachValidImage,
    /// Status lookup for an unknown job id.
    JobNotFound,
    /// Non-success response from the status endpoint.
    StatusFetchFailed { code: u16 },
    /// Non-success response from the queue endpoint.
    QueueFetchFailed { code: u16 },
    /// Non-success response from the system-info endpoint.
    SystemFetchFailed { code: u16 },
    /// Confirmation after a language change; rendered in the newly
    /// selected language.
    LanguageSet,
    /// Reminder of the active language, shown for unsupported codes.
    LanguageCurrent,
    /// Multi-line report for an explicit status command.
    StatusReport { job: Job },
    /// Multi-line report for the queue command.
    QueueReport { stats: QueueStats },
    /// Multi-line report for the system command.
    SystemReport { info: SystemInfo },
}

impl Message {
    /// Render this message in the given language.
    pub fn render(&self, lang: Language) -> String {
        use Language::{Chinese, English};
        match (self, lang) {
            (Message::Enqueued, English) => "Got it, I have enqueued your request.".into(),
            (Message::Enqueued, Chinese) => "收到，已将你的请求加入队列。".into(),

            (Message::EnqueuedWithImages { image_count }, English) => {
                format!("Got it, I have enqueued your request with {image_count} image(s).")
            }
            (Message::EnqueuedWithImages { image_count }, Chinese) => {
                format!("收到，已将你的请求（含 {image_count} 张图片）加入队列。")
            }

            (Message::PipelineUnavailable { kind: JobKind::Generate }, English) => {
                "Sorry, the generation pipeline is not available right now.".into()
            }
            (Message::PipelineUnavailable { kind: JobKind::Generate }, Chinese) => {
                "抱歉，图片生成服务目前不可用。".into()
            }
            (Message::PipelineUnavailable { kind: JobKind::Edit }, English) => {
                "Sorry, the edit pipeline is not available right now.".into()
            }
            (Message::PipelineUnavailable { kind: JobKind::Edit }, Chinese) => {
                "抱歉，图片编辑服务目前不可用。".into()
            }

            (Message::InvalidRequest { detail }, English) => {
                format!("Invalid request: {detail}")
            }
            (Message::InvalidRequest { detail }, Chinese) => {
                format!("无效请求：{detail}")
            }

            (Message::SubmitFailed { code }, English) => {
                format!("Failed to submit job: {code}")
            }
            (Message::SubmitFailed { code }, Chinese) => {
                format!("提交任务失败：{code}")
            }

            (Message::ImageReady { kind: JobKind::Generate }, English) => {
                "Here's your image!".into()
            }
            (Message::ImageReady { kind: JobKind::Generate }, Chinese) => {
                "你的图片生成好了！".into()
            }
            (Message::ImageReady { kind: JobKind::Edit }, English) => {
                "Here's your edited image!".into()
            }
            (Message::ImageReady { kind: JobKind::Edit }, Chinese) => {
                "你的编辑图片完成了！".into()
            }

            (Message::SomethingWentWrong { error }, English) => {
                format!("Sorry, something went wrong: {error}")
            }
            (Message::SomethingWentWrong { error }, Chinese) => {
                format!("抱歉，出了点问题：{error}")
            }

            (Message::NotAvailableHere, English) => {
                "This command is not available here.".into()
            }
            (Message::NotAvailableHere, Chinese) => "此命令在当前位置不可用。".into(),

            (Message::AttachValidImage, English) => "Please attach a valid image file.".into(),
            (Message::AttachValidImage, Chinese) => "请附加一个有效的图片文件。".into(),

            (Message::JobNotFound, English) => "Job not found.".into(),
            (Message::JobNotFound, Chinese) => "未找到该任务。".into(),

            (Message::StatusFetchFailed { code }, English) => {
                format!("Failed to get status: {code}")
            }
            (Message::StatusFetchFailed { code }, Chinese) => {
                format!("获取状态失败：{code}")
            }

            (Message::QueueFetchFailed { code }, English) => {
                format!("Failed to get queue info: {code}")
            }
            (Message::QueueFetchFailed { code }, Chinese) => {
                format!("获取队列信息失败：{code}")
            }

            (Message::SystemFetchFailed { code }, English) => {
                format!("Failed to get system info: {code}")
            }
            (Message::SystemFetchFailed { code }, Chinese) => {
                format!("获取系统信息失败：{code}")
            }

            (Message::LanguageSet, English) => "Language set to **English**.".into(),
            (Message::LanguageSet, Chinese) => "语言已设置为**中文**。".into(),

            (Message::LanguageCurrent, English) => format!(
                "Current language: **{}**. Use `/language` to switch.",
                English.native_name()
            ),
            (Message::LanguageCurrent, Chinese) => format!(
                "当前语言：**{}**。使用 `/language` 切换。",
                Chinese.native_name()
            ),

            (Message::StatusReport { job }, lang) => render_status_report(job, lang),
            (Message::QueueReport { stats }, lang) => render_queue_report(stats, lang),
            (Message::SystemReport { info }, lang) => render_system_report(info, lang),
        }
    }
}

fn render_status_report(job: &Job, lang: Language) -> String {
    let (title, type_label, status_label, progress_label, prompt_label, error_label) = match lang {
        Language::English => ("Job Status", "Type", "Status", "Progress", "Prompt", "Error"),
        Language::Chinese => ("任务状态", "类型", "状态", "进度", "提示词", "错误"),
    };

    let id_prefix: String = job.id.as_str().chars().take(8).collect();
    let mut lines = vec![
        format!("{title}: {id_prefix}..."),
        format!("{type_label}: {}", job.kind),
        format!("{status_label}: {}", job.status),
    ];
    if let Some(progress) = job.progress {
        lines.push(format!("{progress_label}: {}%", (progress * 100.0) as u32));
    }
    if let Some(ref prompt) = job.prompt {
        lines.push(format!("{prompt_label}: {prompt}"));
    }
    if let Some(ref error) = job.error {
        lines.push(format!("{error_label}: {error}"));
    }
    lines.join("\n")
}

fn render_queue_report(stats: &QueueStats, lang: Language) -> String {
    let (title, size, total, completed, failed, generation, edit, current) = match lang {
        Language::English => (
            "Queue Status",
            "Queue Size",
            "Total Jobs",
            "Completed",
            "Failed",
            "Generation Jobs",
            "Edit Jobs",
            "Current Job",
        ),
        Language::Chinese => (
            "队列状态",
            "队列长度",
            "总任务数",
            "已完成",
            "失败",
            "生成任务",
            "编辑任务",
            "当前任务",
        ),
    };

    let mut lines = vec![
        title.to_string(),
        format!("{size}: {}", stats.queue_size),
        format!("{total}: {}", stats.total_jobs),
        format!("{completed}: {}", stats.completed_jobs),
        format!("{failed}: {}", stats.failed_jobs),
        format!("{generation}: {}", stats.generation_jobs),
        format!("{edit}: {}", stats.edit_jobs),
    ];
    if let Some(ref job_id) = stats.current_job {
        let id_prefix: String = job_id.chars().take(8).collect();
        lines.push(format!("{current}: `{id_prefix}...`"));
    }
    lines.join("\n")
}

fn render_system_report(info: &SystemInfo, lang: Language) -> String {
    let (title, device, cuda, quant, gpu, mem_alloc, mem_total, gen_pipe, edit_pipe, not_loaded, unknown) =
        match lang {
            Language::English => (
                "System Information",
                "Device",
                "CUDA Available",
                "Quantization",
                "GPU",
                "Memory Allocated",
                "Memory Total",
                "Generation Pipeline",
                "Edit Pipeline",
                "not loaded",
                "unknown",
            ),
            Language::Chinese => (
                "系统信息",
                "设备",
                "CUDA 可用",
                "量化",
                "GPU",
                "已分配显存",
                "显存总量",
                "生成管线",
                "编辑管线",
                "未加载",
                "未知",
            ),
        };

    let mut lines = vec![
        title.to_string(),
        format!("{device}: {}", info.device.as_deref().unwrap_or(unknown)),
        format!("{cuda}: {}", info.cuda_available),
        format!("{quant}: {}", info.quantization),
    ];
    if let Some(ref gpu_name) = info.gpu_name {
        lines.push(format!("{gpu}: {gpu_name}"));
    }
    if let Some(ref allocated) = info.gpu_memory_allocated {
        lines.push(format!("{mem_alloc}: {allocated}"));
    }
    if let Some(ref total) = info.gpu_memory_total {
        lines.push(format!("{mem_total}: {total}"));
    }
    lines.push(format!(
        "{gen_pipe}: {}",
        info.generation_pipeline.as_deref().unwrap_or(not_loaded)
    ));
    lines.push(format!(
        "{edit_pipe}: {}",
        info.edit_pipeline.as_deref().unwrap_or(not_loaded)
    ));
    lines.join("\n")
}
