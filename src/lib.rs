//! # pdfparse-client
//!
//! Client for a PDF parsing service: choose an AI model, upload a PDF, and
//! view (or save) the text/JSON the service extracts from it.
//!
//! The service itself is out of scope; this crate drives the user-facing
//! workflow against its two endpoints.
//!
//! ## Workflow Overview
//!
//! ```text
//! GET /models ──▶ catalog ──▶ select_model
//!                                  │
//! PDF on disk ──▶ select_file ─────┤ (type + 50 MiB checks)
//!                                  ▼
//!                 submit ──▶ POST /upload (multipart pdf + model)
//!                                  │
//!                                  ▼
//!                 OutputView: formatted JSON ⇄ raw, download as .json
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdfparse_client::{ClientConfig, UploadWorkflow, ViewMode};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let workflow = UploadWorkflow::new(ClientConfig::default())?;
//!     workflow.init().await?;
//!     workflow.select_file_path("report.pdf")?;
//!     let output = workflow.submit().await?;
//!     println!("{}", output.render(ViewMode::Formatted));
//!     workflow.download(".");
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfparse` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod file;
pub mod output;
pub mod progress;
pub mod workflow;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use api::{HttpParserApi, Model, ParserApi};
pub use catalog::ModelCatalog;
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::ClientError;
pub use file::{format_file_size, validate_file, SelectedFile, MAX_FILE_SIZE};
pub use output::{download_filename, format_json, is_json, OutputView, ViewMode};
pub use progress::{NoopProgressCallback, ProgressCallback, UploadProgressCallback};
pub use workflow::{UploadState, UploadStatus, UploadWorkflow};
