//! Error taxonomy shared by the generator and the publisher.
//!
//! Every variant is fatal to a run: nothing in this crate catches one of these
//! and carries on. Entry-related variants carry the offending entry as compact
//! JSON so the message alone identifies which document broke.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to load config file {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("no styling for entry {entry}")]
    MissingStyling { entry: String },

    #[error("styling file not found {path} for entry {entry}")]
    StylingNotFound { path: PathBuf, entry: String },

    #[error("no source for entry {entry}")]
    MissingSource { entry: String },

    #[error("source file not found {path} for entry {entry}")]
    SourceNotFound { path: PathBuf, entry: String },

    #[error("no destination for entry {entry}")]
    MissingDestination { entry: String },

    #[error("malformed front matter header: {0}")]
    MalformedHeader(String),

    #[error("rendering {destination} failed: {message}")]
    Render { destination: PathBuf, message: String },

    #[error("Upload failed: {status} {message}")]
    Upload { status: u16, message: String },

    #[error("upload transport error for {target}: {message}")]
    Transport { target: String, message: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
