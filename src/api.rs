//! HTTP access to the parsing service.
//!
//! Two endpoints, both JSON:
//!
//! ```text
//! GET  {base}/models   → 200 { "models": [{ value, name, description }] }
//! POST {base}/upload   → 200 { "data": "<text or JSON string>" }
//!      multipart: pdf=<file>, model=<value>
//! any non-2xx          →     { "error": "<message>" }
//! ```
//!
//! [`ParserApi`] is the seam the workflow talks through; [`HttpParserApi`]
//! is the reqwest implementation. Tests substitute their own.

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::file::SelectedFile;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Shown when `/models` cannot be reached.
pub const MODELS_UNREACHABLE: &str = "Failed to fetch models. Please check your connection.";
/// Shown when `/models` answers 200 with an unexpected body.
pub const MODELS_UNEXPECTED: &str = "Failed to load available models";
/// Shown when `/upload` cannot be reached.
pub const UPLOAD_UNREACHABLE: &str = "Failed to upload PDF. Please check your connection.";
/// Shown when `/upload` answers 200 with an unexpected body.
pub const UPLOAD_UNEXPECTED: &str =
    "Error occurred while processing. Please make sure the backend server is running.";

/// A selectable parsing model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Identifier sent as the `model` form field.
    pub value: String,
    /// Display label.
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<Model>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    data: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    error: Option<String>,
}

/// Operations the workflow needs from the parsing service.
#[async_trait]
pub trait ParserApi: Send + Sync {
    /// Fetch the model catalog, in service order.
    async fn list_models(&self) -> Result<Vec<Model>, ClientError>;

    /// Upload `file` for parsing with `model`; returns the `data` string.
    async fn upload_pdf(&self, file: &SelectedFile, model: &str) -> Result<String, ClientError>;
}

/// [`ParserApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpParserApi {
    client: reqwest::Client,
    models_url: String,
    upload_url: String,
}

impl HttpParserApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            models_url: config.endpoint("models"),
            upload_url: config.endpoint("upload"),
        })
    }
}

#[async_trait]
impl ParserApi for HttpParserApi {
    async fn list_models(&self) -> Result<Vec<Model>, ClientError> {
        debug!("GET {}", self.models_url);
        let response = self
            .client
            .get(&self.models_url)
            .send()
            .await
            .map_err(|e| transport_error(MODELS_UNREACHABLE, e))?;

        let body: ModelsResponse = handle_response(response, MODELS_UNEXPECTED).await?;
        debug!("Catalog returned {} models", body.models.len());
        Ok(body.models)
    }

    async fn upload_pdf(&self, file: &SelectedFile, model: &str) -> Result<String, ClientError> {
        let bytes = file.read_bytes().await?;
        let part = Part::bytes(bytes)
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|_| ClientError::NotAPdf {
                name: file.name.clone(),
                mime_type: file.mime_type.clone(),
            })?;
        let form = Form::new().part("pdf", part).text("model", model.to_string());

        debug!("POST {} ({}, {} bytes, model={})", self.upload_url, file.name, file.size, model);
        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(UPLOAD_UNREACHABLE, e))?;

        let body: UploadResponse = handle_response(response, UPLOAD_UNEXPECTED).await?;
        Ok(body.data)
    }
}

fn transport_error(message: &str, e: reqwest::Error) -> ClientError {
    warn!("{}: {}", message, e);
    ClientError::Transport {
        message: message.to_string(),
        detail: e.to_string(),
    }
}

/// Turn a response into `T`, or into the service's error message.
///
/// Non-2xx: the body's `error` field when it is a non-empty string, else
/// `HTTP error! status: N`. 2xx with a body that is not a `T`:
/// [`ClientError::UnexpectedResponse`] carrying `unexpected`.
async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
    unexpected: &str,
) -> Result<T, ClientError> {
    let status = response.status();

    if !status.is_success() {
        let body = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<ApiErrorResponse>(&body)
            .ok()
            .and_then(|e| e.error)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
        warn!("Service returned {}: {}", status, message);
        return Err(ClientError::Api {
            message,
            status: status.as_u16(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| ClientError::UnexpectedResponse {
            message: unexpected.to_string(),
            detail: e.to_string(),
        })?;
    serde_json::from_slice(&body).map_err(|e| ClientError::UnexpectedResponse {
        message: unexpected.to_string(),
        detail: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_description_optional() {
        let m: Model = serde_json::from_str(r#"{"value":"a","name":"A"}"#).unwrap();
        assert_eq!(m.description, "");
    }

    #[test]
    fn models_envelope_keeps_order() {
        let body = r#"{"models":[
            {"value":"z","name":"Zed","description":"last alphabetically"},
            {"value":"a","name":"Ay","description":"first alphabetically"}
        ]}"#;
        let r: ModelsResponse = serde_json::from_str(body).unwrap();
        let values: Vec<_> = r.models.iter().map(|m| m.value.as_str()).collect();
        assert_eq!(values, ["z", "a"]);
    }

    #[test]
    fn error_envelope_tolerates_missing_field() {
        let e: ApiErrorResponse = serde_json::from_str(r#"{"detail":"nope"}"#).unwrap();
        assert!(e.error.is_none());
    }

    #[test]
    fn endpoints_from_config() {
        let config = ClientConfig::builder()
            .base_url("http://127.0.0.1:9/")
            .build()
            .unwrap();
        let api = HttpParserApi::new(&config).unwrap();
        assert_eq!(api.models_url, "http://127.0.0.1:9/models");
        assert_eq!(api.upload_url, "http://127.0.0.1:9/upload");
    }
}
