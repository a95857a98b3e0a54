//! Configuration for the upload client.
//!
//! Every knob lives in [`ClientConfig`], built via [`ClientConfigBuilder`].
//! The defaults point at a parsing service on `http://localhost:8000` and
//! pre-select the `gemini-2.5-flash` model, which is what the service ships
//! with.

use crate::error::ClientError;
use crate::progress::ProgressCallback;
use std::fmt;

/// Base URL of the parsing service when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Model selected when the catalog does not contain the current selection.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Configuration for an [`crate::workflow::UploadWorkflow`].
///
/// # Example
/// ```rust
/// use pdfparse_client::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .base_url("http://parser.internal:8000/")
///     .default_model("gemini-2.5-pro")
///     .build()
///     .unwrap();
/// assert_eq!(config.base_url, "http://parser.internal:8000");
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Service root; `/models` and `/upload` are appended. Default: `http://localhost:8000`.
    pub base_url: String,

    /// Fallback model identifier. Default: `gemini-2.5-flash`.
    ///
    /// Used as the initial selection, and again whenever a catalog fetch
    /// returns a list that no longer contains the current selection.
    pub default_model: String,

    /// Whole-request timeout in seconds. Default: None (transport default).
    ///
    /// Parsing a long PDF with a vision model can take minutes, so no limit
    /// is imposed unless the caller asks for one.
    pub request_timeout_secs: Option<u64>,

    /// Optional event sink for catalog and upload events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            request_timeout_secs: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn UploadProgressCallback>"),
            )
            .finish()
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Full URL of a service endpoint, e.g. `endpoint("models")`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Builder for [`ClientConfig`].
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim().trim_end_matches('/').to_string();
        self
    }

    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.config.default_model = model.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, ClientError> {
        let c = &self.config;
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(ClientError::InvalidConfig(format!(
                "base URL must start with http:// or https://, got '{}'",
                c.base_url
            )));
        }
        if c.default_model.trim().is_empty() {
            return Err(ClientError::InvalidConfig(
                "default model must not be empty".into(),
            ));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(ClientError::InvalidConfig(
                "request timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
