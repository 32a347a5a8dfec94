//! Natural-language trigger recognition.
//!
//! Plain chat messages become commands two ways: a message carrying
//! image attachments plus text is an edit request, and a message
//! starting with `draw ` is a generation request. Everything else is
//! ignored (the platform layer delivers explicit structured commands
//! separately).

use easel_core::request::AttachedImage;

use crate::sink::{Command, EditCommand, GenerateCommand};

/// Recognize a plain chat message as a command, if it is one.
///
/// `attachments` should already be filtered to image media types by the
/// platform layer; non-image attachments are dropped here as well.
pub fn parse_message(content: &str, attachments: Vec<AttachedImage>) -> Option<Command> {
    let content = content.trim();

    let images: Vec<AttachedImage> = attachments
        .into_iter()
        .filter(|a| a.media_type.starts_with("image/"))
        .collect();

    if !images.is_empty() && !content.is_empty() {
        return Some(Command::Edit(EditCommand {
            prompt: content.to_string(),
            images,
            ..Default::default()
        }));
    }

    if content.len() >= 5 && content.is_char_boundary(5) && content[..5].eq_ignore_ascii_case("draw ")
    {
        // Keep the prompt's original casing.
        let prompt = content[5..].trim();
        if !prompt.is_empty() {
            return Some(Command::Generate(GenerateCommand {
                prompt: prompt.to_string(),
                ..Default::default()
            }));
        }
    }

    None
}
