//! File selection: the user's chosen PDF, its validation, and size display.
//!
//! A [`SelectedFile`] carries the three things a browser `File` exposes
//! (name, size, MIME type) plus where its bytes live. Files picked from disk
//! are not read until upload time, so rejecting a 2 GB file costs a single
//! `stat`.

use crate::error::ClientError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Largest accepted upload: 50 MiB.
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Where the bytes of a selected file come from.
#[derive(Debug, Clone)]
pub enum FileSource {
    /// On disk; read when the upload body is built.
    Path(PathBuf),
    /// Already in memory.
    Memory(Vec<u8>),
}

/// A file the user picked for upload.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    /// File name as sent in the multipart `filename` attribute.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type, e.g. `application/pdf`.
    pub mime_type: String,
    pub source: FileSource,
}

impl SelectedFile {
    /// Describe an on-disk file. The MIME type is derived from the extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let meta = std::fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ClientError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => ClientError::FileReadFailed {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        if !meta.is_file() {
            return Err(ClientError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.pdf".to_string());
        let mime_type = mime_from_name(&name).to_string();

        debug!("Selected {} ({} bytes, {})", path.display(), meta.len(), mime_type);
        Ok(Self {
            name,
            size: meta.len(),
            mime_type,
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    /// Wrap an in-memory buffer.
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            mime_type: mime_type.into(),
            source: FileSource::Memory(bytes),
        }
    }

    /// Load the file contents for the request body.
    pub async fn read_bytes(&self) -> Result<Vec<u8>, ClientError> {
        match &self.source {
            FileSource::Memory(bytes) => Ok(bytes.clone()),
            FileSource::Path(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|e| ClientError::FileReadFailed {
                        path: path.clone(),
                        source: e,
                    })
            }
        }
    }
}

/// MIME type a browser would assign from the file name.
pub fn mime_from_name(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "json" => "application/json",
        "txt" => "text/plain",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// Check type, then size. Returns the rejection as a [`ClientError`].
///
/// The type must mention `pdf` and be a well-formed `type/subtype` so the
/// multipart part can carry it unchanged.
pub fn validate_file(file: &SelectedFile) -> Result<(), ClientError> {
    let mime = &file.mime_type;
    if !mime.to_ascii_lowercase().contains("pdf") || !is_mime_syntax(mime) {
        return Err(ClientError::NotAPdf {
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
        });
    }
    if file.size > MAX_FILE_SIZE {
        return Err(ClientError::FileTooLarge {
            name: file.name.clone(),
            size: file.size,
        });
    }
    Ok(())
}

/// `type/subtype`, optionally followed by `;` parameters, both parts made of
/// RFC 6838 token characters.
fn is_mime_syntax(mime: &str) -> bool {
    let essence = mime.split(';').next().unwrap_or_default().trim();
    let token = |s: &str| {
        !s.is_empty()
            && s.bytes()
                .all(|b| b.is_ascii_alphanumeric() || b"!#$&-^_.+".contains(&b))
    };
    essence
        .split_once('/')
        .is_some_and(|(ty, sub)| token(ty) && token(sub))
}

/// Human-readable size: `0 Bytes`, `512 Bytes`, `1.5 KB`, `2 MB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}
