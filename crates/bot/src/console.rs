//! Console frontend: a minimal stand-in for the chat platform.
//!
//! Lets the whole pipeline run locally without a platform integration:
//! lines typed on stdin become triggers, bot replies print to stdout,
//! and delivered images are written to an output directory.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use easel_core::request::AttachedImage;
use easel_core::types::JobId;

use crate::sink::{AckHandle, Command, ConversationSink, EditCommand, OutgoingFile, SinkError};
use crate::trigger::parse_message;

/// [`ConversationSink`] that prints to stdout and writes attachments to
/// a local directory.
pub struct ConsoleSink {
    output_dir: PathBuf,
    next_ack: AtomicU64,
}

impl ConsoleSink {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            next_ack: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl ConversationSink for ConsoleSink {
    async fn acknowledge(&self, text: String) -> Result<AckHandle, SinkError> {
        let ack = AckHandle(self.next_ack.fetch_add(1, Ordering::Relaxed));
        println!("[bot #{}] {text}", ack.0);
        Ok(ack)
    }

    async fn edit(&self, ack: AckHandle, text: String) -> Result<(), SinkError> {
        println!("[bot #{} edited] {text}", ack.0);
        Ok(())
    }

    async fn send(&self, text: String, attachment: Option<OutgoingFile>) -> Result<(), SinkError> {
        println!("[bot] {text}");
        if let Some(file) = attachment {
            tokio::fs::create_dir_all(&self.output_dir)
                .await
                .map_err(|e| SinkError(e.to_string()))?;
            let path = unique_path(&self.output_dir, &file.filename);
            tokio::fs::write(&path, &file.bytes)
                .await
                .map_err(|e| SinkError(e.to_string()))?;
            println!("[bot] saved {}", path.display());
        }
        Ok(())
    }
}

/// Avoid clobbering earlier outputs by appending a counter when needed.
fn unique_path(dir: &Path, filename: &str) -> PathBuf {
    let candidate = dir.join(filename);
    if !candidate.exists() {
        return candidate;
    }
    let (stem, ext) = match filename.rsplit_once('.') {
        Some((stem, ext)) => (stem, ext),
        None => (filename, ""),
    };
    for n in 1.. {
        let candidate = if ext.is_empty() {
            dir.join(format!("{stem}-{n}"))
        } else {
            dir.join(format!("{stem}-{n}.{ext}"))
        };
        if !candidate.exists() {
            return candidate;
        }
    }
    unreachable!()
}

/// Parse one console line into a command.
///
/// Supported forms:
/// - `draw <prompt>` for natural-language generation
/// - `edit <file> <prompt>` to edit a local image file
/// - `status <job_id>`, `queue`, `system`, `language <code>`
pub fn parse_line(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "edit" => {
            let (path, prompt) = rest
                .split_once(char::is_whitespace)
                .ok_or("usage: edit <file> <prompt>")?;
            let prompt = prompt.trim();
            if prompt.is_empty() {
                return Err("usage: edit <file> <prompt>".into());
            }
            let image = load_attachment(path)?;
            Ok(Command::Edit(EditCommand {
                prompt: prompt.to_string(),
                images: vec![image],
                ..Default::default()
            }))
        }
        "status" => {
            if rest.is_empty() {
                return Err("usage: status <job_id>".into());
            }
            Ok(Command::Status {
                job_id: JobId::from(rest),
            })
        }
        "queue" => Ok(Command::Queue),
        "system" => Ok(Command::System),
        "language" => {
            if rest.is_empty() {
                return Err("usage: language <en|zh>".into());
            }
            Ok(Command::Language {
                code: rest.to_string(),
            })
        }
        _ => parse_message(line, Vec::new())
            .ok_or_else(|| "try: draw <prompt>, edit <file> <prompt>, status <job_id>, queue, system, language <code>".into()),
    }
}

/// Read a local file as an attached image, inferring the media type
/// from its extension.
fn load_attachment(path: &str) -> Result<AttachedImage, String> {
    let bytes = std::fs::read(path).map_err(|e| format!("cannot read {path}: {e}"))?;
    let filename = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let media_type = match Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "image/png",
    };
    Ok(AttachedImage {
        bytes,
        media_type: media_type.to_string(),
        filename,
    })
}
