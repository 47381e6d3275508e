//! # contract: the two collaborator boundaries of the pipeline
//!
//! The generator never renders documents itself and the publisher never
//! speaks HTTP itself. Both go through the traits below so that real
//! implementations (see [`crate::render`] and [`crate::upload`]) and test
//! mocks are interchangeable.
//!
//! ## Mocking & Testing
//! - Both traits are annotated for `mockall`; `MockRenderer` and
//!   `MockUploader` are exported under the default `test-export-mocks`
//!   feature so integration tests under `tests/` can use them.
//!
//! ## Error handling
//! - Implementors return boxed errors; callers wrap them into the matching
//!   [`crate::Error`] variant together with the document or target involved.

use std::path::PathBuf;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Everything a renderer needs to produce one artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    /// Markdown with the merged front matter header already in place.
    pub content: String,
    /// Resolved style profile file, passed through unparsed.
    pub style_path: PathBuf,
    /// Directory relative assets (images, includes) are resolved against.
    pub asset_base: PathBuf,
    /// Absolute output path inside the generation root.
    pub destination: PathBuf,
}

/// Turns merged Markdown into a rendered file.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait Renderer {
    /// Writes the artifact to `job.destination` or fails with a message.
    fn render(&self, job: &RenderJob) -> Result<(), BoxError>;
}

/// A single PUT of a file body to a fully encoded URL.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub target: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// What the remote answered. Status interpretation is up to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadResponse {
    pub status: u16,
    pub message: String,
}

/// Transport for publishing. Authentication is the implementor's concern.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait Uploader {
    /// Sends the request. Only transport failures are errors; any HTTP
    /// status, including 4xx and 5xx, comes back as a response.
    fn put(&self, request: UploadRequest) -> Result<UploadResponse, BoxError>;
}
