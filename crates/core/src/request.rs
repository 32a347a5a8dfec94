//! Submission requests: the immutable description of one unit of work
//! handed to the job client.
//!
//! Built through [`SubmissionRequest::generate`] /
//! [`SubmissionRequest::edit`], which enforce the single structural
//! invariant: an edit request carries at least one attached image.

use crate::job::JobKind;

/// A raw image attached to a submission, exactly as received from the
/// chat platform (possibly already rescaled by the preprocessor).
#[derive(Debug, Clone, PartialEq)]
pub struct AttachedImage {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// Declared media type, e.g. `image/png`.
    pub media_type: String,
    /// Original filename, forwarded to the backend.
    pub filename: String,
}

/// An immutable, validated request for one inference job.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRequest {
    kind: JobKind,
    prompt: String,
    negative_prompt: String,
    width: u32,
    height: u32,
    steps: u32,
    cfg_scale: f64,
    seed: Option<i64>,
    images: Vec<AttachedImage>,
}

/// Structural validation failures when building a request.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Edit requests must carry at least one attached image.
    #[error("edit requests require at least one attached image")]
    MissingAttachment,
}

impl SubmissionRequest {
    /// Start building a text-to-image generation request.
    pub fn generate(prompt: impl Into<String>) -> SubmissionRequestBuilder {
        SubmissionRequestBuilder::new(JobKind::Generate, prompt.into())
    }

    /// Start building an image-edit request. At least one image must be
    /// attached before [`build`](SubmissionRequestBuilder::build) succeeds.
    pub fn edit(prompt: impl Into<String>) -> SubmissionRequestBuilder {
        SubmissionRequestBuilder::new(JobKind::Edit, prompt.into())
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn negative_prompt(&self) -> &str {
        &self.negative_prompt
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn cfg_scale(&self) -> f64 {
        self.cfg_scale
    }

    pub fn seed(&self) -> Option<i64> {
        self.seed
    }

    /// Attached images, in attachment order.
    pub fn images(&self) -> &[AttachedImage] {
        &self.images
    }
}

/// Builder for [`SubmissionRequest`].
///
/// Defaults match the backend's: 512x512, empty negative prompt,
/// cfg 4.0, 20 steps, no seed. Callers normally override steps from
/// the configured per-kind defaults.
#[derive(Debug)]
pub struct SubmissionRequestBuilder {
    kind: JobKind,
    prompt: String,
    negative_prompt: String,
    width: u32,
    height: u32,
    steps: u32,
    cfg_scale: f64,
    seed: Option<i64>,
    images: Vec<AttachedImage>,
}

impl SubmissionRequestBuilder {
    fn new(kind: JobKind, prompt: String) -> Self {
        Self {
            kind,
            prompt,
            negative_prompt: String::new(),
            width: 512,
            height: 512,
            steps: 20,
            cfg_scale: 4.0,
            seed: None,
            images: Vec::new(),
        }
    }

    pub fn negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = negative_prompt.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn steps(mut self, steps: u32) -> Self {
        self.steps = steps;
        self
    }

    pub fn cfg_scale(mut self, cfg_scale: f64) -> Self {
        self.cfg_scale = cfg_scale;
        self
    }

    pub fn seed(mut self, seed: Option<i64>) -> Self {
        self.seed = seed;
        self
    }

    /// Append one attached image. Order is preserved through to the
    /// multipart body.
    pub fn attach(mut self, image: AttachedImage) -> Self {
        self.images.push(image);
        self
    }

    /// Finalize the request, validating structural invariants.
    pub fn build(self) -> Result<SubmissionRequest, RequestError> {
        if self.kind == JobKind::Edit && self.images.is_empty() {
            return Err(RequestError::MissingAttachment);
        }
        Ok(SubmissionRequest {
            kind: self.kind,
            prompt: self.prompt,
            negative_prompt: self.negative_prompt,
            width: self.width,
            height: self.height,
            steps: self.steps,
            cfg_scale: self.cfg_scale,
            seed: self.seed,
            images: self.images,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobKind;

    fn png_stub(name: &str) -> AttachedImage {
        AttachedImage {
            bytes: vec![1, 2, 3],
            media_type: "image/png".into(),
            filename: name.into(),
        }
    }

    #[test]
    fn generate_builds_with_defaults() {
        let request = SubmissionRequest::generate("a red fox").build().unwrap();
        assert_eq!(request.kind(), JobKind::Generate);
        assert_eq!(request.prompt(), "a red fox");
        assert_eq!(request.negative_prompt(), "");
        assert_eq!((request.width(), request.height()), (512, 512));
        assert_eq!(request.steps(), 20);
        assert_eq!(request.seed(), None);
    }

    #[test]
    fn edit_without_attachments_is_rejected() {
        let err = SubmissionRequest::edit("add a hat").build().unwrap_err();
        assert!(matches!(err, RequestError::MissingAttachment));
    }

    #[test]
    fn edit_preserves_attachment_order() {
        let request = SubmissionRequest::edit("add a hat")
            .attach(png_stub("a.png"))
            .attach(png_stub("b.png"))
            .attach(png_stub("c.png"))
            .build()
            .unwrap();
        let names: Vec<_> = request.images().iter().map(|i| i.filename.as_str()).collect();
        assert_eq!(names, ["a.png", "b.png", "c.png"]);
    }
}
