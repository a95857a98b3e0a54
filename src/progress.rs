//! Progress-callback trait for workflow events.
//!
//! Inject an [`Arc<dyn UploadProgressCallback>`] via
//! [`crate::config::ClientConfigBuilder::progress_callback`] to be told when
//! the catalog loads and when an upload starts, finishes, or fails. The CLI
//! uses it to drive a terminal spinner; a GUI could forward the events to its
//! own event loop.
//!
//! # Example
//!
//! ```rust
//! use pdfparse_client::{ClientConfig, UploadProgressCallback};
//! use std::sync::Arc;
//!
//! struct Log;
//!
//! impl UploadProgressCallback for Log {
//!     fn on_upload_start(&self, file_name: &str, _size: u64, model: &str) {
//!         eprintln!("uploading {file_name} with {model}");
//!     }
//! }
//!
//! let config = ClientConfig::builder()
//!     .progress_callback(Arc::new(Log))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by [`crate::workflow::UploadWorkflow`] as the session progresses.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync`: catalog
/// refetches and uploads may run on different tasks.
pub trait UploadProgressCallback: Send + Sync {
    /// Called before the catalog request is sent.
    fn on_catalog_start(&self) {}

    /// Called after a catalog fetch settles.
    ///
    /// # Arguments
    /// * `model_count`: number of models now listed (0 on failure)
    /// * `error`: user-facing error, if the fetch failed
    fn on_catalog_loaded(&self, model_count: usize, error: Option<&str>) {
        let _ = (model_count, error);
    }

    /// Called just before the multipart request is sent.
    fn on_upload_start(&self, file_name: &str, size: u64, model: &str) {
        let _ = (file_name, size, model);
    }

    /// Called when the service returned a result.
    ///
    /// # Arguments
    /// * `output_len`: byte length of the returned `data` string
    /// * `elapsed_ms`: wall-clock time of the request
    fn on_upload_complete(&self, output_len: usize, elapsed_ms: u64) {
        let _ = (output_len, elapsed_ms);
    }

    /// Called when the upload attempt failed.
    fn on_upload_error(&self, error: &str) {
        let _ = error;
    }
}

/// A no-op implementation; the default when no callback is configured.
pub struct NoopProgressCallback;

impl UploadProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ClientConfig`].
pub type ProgressCallback = Arc<dyn UploadProgressCallback>;
