//! Rendering and saving the service's `data` string.
//!
//! The service returns a plain string that is usually, but not always, a
//! JSON document. When it parses, callers get two views of it (pretty-printed
//! and untouched) and a `.json` download; when it does not, only the raw text.

use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Which rendering of a JSON result to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    /// Pretty-printed with 2-space indentation. (default)
    #[default]
    Formatted,
    /// The exact string the service returned.
    Raw,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Formatted => ViewMode::Raw,
            ViewMode::Raw => ViewMode::Formatted,
        }
    }
}

/// True when `s` is a complete JSON value.
pub fn is_json(s: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(s).is_ok()
}

/// Pretty-print `s` with 2-space indentation, or return it unchanged if it
/// is not JSON.
pub fn format_json(s: &str) -> String {
    pretty(s).unwrap_or_else(|| s.to_string())
}

fn pretty(s: &str) -> Option<String> {
    let value = serde_json::from_str::<serde_json::Value>(s).ok()?;
    serde_json::to_string_pretty(&value).ok()
}

/// A result string with its formatted rendering precomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputView {
    raw: String,
    formatted: Option<String>,
}

impl OutputView {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let formatted = pretty(&raw);
        Self { raw, formatted }
    }

    /// Whether the result parsed as JSON (and so offers a view toggle).
    pub fn is_json(&self) -> bool {
        self.formatted.is_some()
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The pretty-printed JSON, if the result is JSON.
    pub fn formatted(&self) -> Option<&str> {
        self.formatted.as_deref()
    }

    /// Text to show for `mode`. Non-JSON output is always raw.
    pub fn render(&self, mode: ViewMode) -> &str {
        match (mode, &self.formatted) {
            (ViewMode::Formatted, Some(f)) => f,
            _ => &self.raw,
        }
    }

    /// What a download writes: formatted JSON, or the raw text.
    pub fn download_content(&self) -> &str {
        self.render(ViewMode::Formatted)
    }
}

/// Name of the download artifact for an upload called `source_name`.
///
/// A trailing `.pdf` (any case) becomes `.json`; names without one get
/// `.json` appended.
pub fn download_filename(source_name: &str) -> String {
    let stem = match source_name.len().checked_sub(4) {
        Some(cut)
            if source_name.is_char_boundary(cut)
                && source_name[cut..].eq_ignore_ascii_case(".pdf") =>
        {
            &source_name[..cut]
        }
        _ => source_name,
    };
    format!("{stem}.json")
}

/// Save `content` as `dir/<download_filename(source_name)>`.
///
/// Content goes to a temp file in `dir` first and is renamed into place; the
/// temp file is removed on every failure path.
pub fn save_download(content: &str, source_name: &str, dir: &Path) -> Result<PathBuf, ClientError> {
    let target = dir.join(download_filename(source_name));
    let write_err = |source: std::io::Error| ClientError::OutputWriteFailed {
        path: target.clone(),
        source,
    };

    std::fs::create_dir_all(dir).map_err(write_err)?;
    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(&target).map_err(|e| write_err(e.error))?;

    debug!("Saved {} bytes to {}", content.len(), target.display());
    Ok(target)
}
