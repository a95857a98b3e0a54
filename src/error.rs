//! Error types for the pdfparse-client library.
//!
//! Every variant's `Display` output is the message shown to the user, so the
//! CLI (or any other front end) can print `err.to_string()` without further
//! mapping. The variants fall into three families:
//!
//! * **Validation**: the file or the workflow state is not fit for upload.
//!   These never reach the network.
//! * **Transport**: the service could not be reached at all.
//! * **Application**: the service answered with an `error` payload or a
//!   body that does not match the expected envelope.
//!
//! None of them is fatal to a [`crate::workflow::UploadWorkflow`]: a failed
//! attempt leaves the workflow usable for the next one.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdfparse-client library.
#[derive(Debug, Error)]
pub enum ClientError {
    // ── Validation errors ─────────────────────────────────────────────────
    /// The chosen file's MIME type does not indicate PDF content.
    #[error("Please select a PDF file.")]
    NotAPdf { name: String, mime_type: String },

    /// The chosen file exceeds [`crate::file::MAX_FILE_SIZE`].
    #[error("File size must be less than 50MB.")]
    FileTooLarge { name: String, size: u64 },

    /// Submit was requested with no file selected.
    #[error("Please select a PDF file first.")]
    NoFileSelected,

    /// The requested model is not in the loaded catalog.
    #[error("Unknown model '{value}'. Run with --list-models to see the available ones.")]
    UnknownModel { value: String },

    /// An upload is already in flight.
    #[error("An upload is already in progress. Wait for it to finish.")]
    Busy,

    /// The path handed to file selection does not exist.
    #[error("File not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// The selected file could not be read when building the upload body.
    #[error("Failed to read '{path}': {source}")]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Service errors ────────────────────────────────────────────────────
    /// The service answered with a non-success status. `message` is the
    /// body's `error` field when present, else `HTTP error! status: N`.
    #[error("{message}")]
    Api { message: String, status: u16 },

    /// The service could not be reached.
    #[error("{message}")]
    Transport { message: String, detail: String },

    /// A success status carried a body that is not the expected envelope.
    #[error("{message}")]
    UnexpectedResponse { message: String, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not write the downloaded result file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// True for errors raised before any request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ClientError::NotAPdf { .. }
                | ClientError::FileTooLarge { .. }
                | ClientError::NoFileSelected
                | ClientError::UnknownModel { .. }
                | ClientError::Busy
                | ClientError::FileNotFound { .. }
                | ClientError::FileReadFailed { .. }
        )
    }

    /// HTTP status carried by an application error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
