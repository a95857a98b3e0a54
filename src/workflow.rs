//! The upload workflow controller.
//!
//! [`UploadWorkflow`] is the single state holder behind the client: it owns
//! the model catalog, the selected file and model, and the status of the
//! current attempt. Front ends call its operations and render its snapshot.
//!
//! ```text
//!            select_file / select_model
//!   ┌──────────────────────────────────────────┐
//!   ▼                                          │
//! Idle ──submit──▶ Loading ──ok──▶ Success(output)
//!   ▲                 │                        │
//!   │                 └──err──▶ Error(message) │
//!   └──────────────────────────────────────────┘
//! ```
//!
//! State sits behind a mutex that is never held across an `.await`, so a
//! catalog refetch can run while an upload is in flight. `Loading` doubles as
//! the busy flag: a second `submit`, or a change of file or model, is refused
//! until the first attempt settles.

use crate::api::{HttpParserApi, Model, ParserApi};
use crate::catalog::ModelCatalog;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::file::{validate_file, SelectedFile};
use crate::output::{save_download, OutputView, ViewMode};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Status left behind when an upload future is dropped before it settles.
pub const UPLOAD_INTERRUPTED: &str = "The upload was interrupted before it completed.";

/// Status of the current upload attempt. Exactly one holds at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadStatus {
    #[default]
    Idle,
    Loading,
    Success(OutputView),
    Error(String),
}

impl UploadStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, UploadStatus::Loading)
    }

    pub fn output(&self) -> Option<&OutputView> {
        match self {
            UploadStatus::Success(view) => Some(view),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            UploadStatus::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Everything a front end renders for the upload half of the page.
#[derive(Debug, Clone)]
pub struct UploadState {
    pub selected_file: Option<SelectedFile>,
    pub selected_model: String,
    pub status: UploadStatus,
    pub view_mode: ViewMode,
}

impl UploadState {
    fn new(model: String) -> Self {
        Self {
            selected_file: None,
            selected_model: model,
            status: UploadStatus::Idle,
            view_mode: ViewMode::default(),
        }
    }

    /// Output and error are only ever shown for the current selection.
    fn clear_result(&mut self) {
        self.status = UploadStatus::Idle;
        self.view_mode = ViewMode::default();
    }

    /// The text currently on screen, honouring the view mode.
    pub fn rendered_output(&self) -> Option<&str> {
        self.status.output().map(|o| o.render(self.view_mode))
    }
}

/// Controller for one session: pick a model, pick a PDF, submit, view.
pub struct UploadWorkflow {
    config: ClientConfig,
    api: Arc<dyn ParserApi>,
    state: Mutex<UploadState>,
    catalog: Mutex<ModelCatalog>,
}

impl UploadWorkflow {
    /// Create a workflow talking HTTP to `config.base_url`.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let api = HttpParserApi::new(&config)?;
        Ok(Self::with_api(config, Arc::new(api)))
    }

    /// Create a workflow over any [`ParserApi`].
    pub fn with_api(config: ClientConfig, api: Arc<dyn ParserApi>) -> Self {
        let state = UploadState::new(config.default_model.clone());
        Self {
            config,
            api,
            state: Mutex::new(state),
            catalog: Mutex::new(ModelCatalog::default()),
        }
    }

    /// Load the model catalog. Equivalent to [`Self::refetch_models`].
    pub async fn init(&self) -> Result<(), ClientError> {
        self.refetch_models().await
    }

    /// Fetch `/models` once. On success the list is replaced and the
    /// selection kept if still listed, else reset to the configured default.
    /// On failure the list is emptied and the error recorded; no retry.
    ///
    /// Refetches may overlap. A response that settles after a newer fetch
    /// was started is dropped without touching the list or the selection,
    /// and `on_catalog_loaded` is not fired for it.
    pub async fn refetch_models(&self) -> Result<(), ClientError> {
        let ticket = self.catalog.lock().begin_fetch();
        if let Some(cb) = &self.config.progress_callback {
            cb.on_catalog_start();
        }

        let result = self.api.list_models().await;

        match result {
            Ok(models) => {
                let count = models.len();
                {
                    // Lock order: catalog, then state.
                    let mut catalog = self.catalog.lock();
                    if !catalog.apply_models(ticket, models) {
                        debug!("Dropping stale model list (fetch #{})", ticket);
                        return Ok(());
                    }
                    let mut state = self.state.lock();
                    let resolved =
                        catalog.resolve_selection(&state.selected_model, &self.config.default_model);
                    if state.selected_model != resolved {
                        debug!("Selection '{}' not listed; using '{}'", state.selected_model, resolved);
                        state.selected_model = resolved;
                    }
                }
                info!("Loaded {} models", count);
                if let Some(cb) = &self.config.progress_callback {
                    cb.on_catalog_loaded(count, None);
                }
                Ok(())
            }
            Err(e) => {
                let message = e.to_string();
                warn!("Error fetching models: {}", message);
                if !self.catalog.lock().apply_error(ticket, message.clone()) {
                    debug!("Dropping stale model error (fetch #{})", ticket);
                    return Err(e);
                }
                if let Some(cb) = &self.config.progress_callback {
                    cb.on_catalog_loaded(0, Some(&message));
                }
                Err(e)
            }
        }
    }

    /// Make `file` the active selection.
    ///
    /// A file that fails validation is refused and the previous selection,
    /// output, and status are left untouched; the message is only returned
    /// for the caller to show. An accepted file clears any prior output and
    /// error.
    pub fn select_file(&self, file: SelectedFile) -> Result<(), ClientError> {
        let mut state = self.state.lock();
        if state.status.is_loading() {
            return Err(ClientError::Busy);
        }
        validate_file(&file)?;

        debug!("File selected: {} ({} bytes)", file.name, file.size);
        state.selected_file = Some(file);
        state.clear_result();
        Ok(())
    }

    /// [`Self::select_file`] for a file on disk.
    pub fn select_file_path(&self, path: impl AsRef<Path>) -> Result<(), ClientError> {
        self.select_file(SelectedFile::from_path(path)?)
    }

    /// Choose the model for the next upload; clears any prior output and
    /// error. When a catalog is loaded the value must be one of its models.
    pub fn select_model(&self, value: impl Into<String>) -> Result<(), ClientError> {
        let value = value.into();
        {
            let catalog = self.catalog.lock();
            if !catalog.is_empty() && !catalog.contains(&value) {
                return Err(ClientError::UnknownModel { value });
            }
        }

        let mut state = self.state.lock();
        if state.status.is_loading() {
            return Err(ClientError::Busy);
        }
        debug!("Model selected: {}", value);
        state.selected_model = value;
        state.clear_result();
        Ok(())
    }

    /// Upload the selected file with the selected model.
    ///
    /// Without a file the status becomes the "select a PDF file first" error
    /// and nothing is sent. While another upload is in flight the call is
    /// refused with [`ClientError::Busy`] and the state is not touched.
    /// Otherwise exactly one request is made and the status always leaves
    /// `Loading`, including when the returned future is dropped early.
    pub async fn submit(&self) -> Result<OutputView, ClientError> {
        let (file, model) = {
            let mut state = self.state.lock();
            if state.status.is_loading() {
                return Err(ClientError::Busy);
            }
            let Some(file) = state.selected_file.clone() else {
                state.status = UploadStatus::Error(ClientError::NoFileSelected.to_string());
                return Err(ClientError::NoFileSelected);
            };
            state.status = UploadStatus::Loading;
            state.view_mode = ViewMode::default();
            (file, state.selected_model.clone())
        };

        let guard = LoadingGuard {
            state: &self.state,
            settled: false,
        };

        info!("Uploading {} with model {}", file.name, model);
        if let Some(cb) = &self.config.progress_callback {
            cb.on_upload_start(&file.name, file.size, &model);
        }
        let start = Instant::now();

        let result = self.api.upload_pdf(&file, &model).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(data) => {
                let view = OutputView::new(data);
                info!(
                    "Upload of {} finished in {}ms ({} bytes, json={})",
                    file.name,
                    elapsed_ms,
                    view.raw().len(),
                    view.is_json()
                );
                if let Some(cb) = &self.config.progress_callback {
                    cb.on_upload_complete(view.raw().len(), elapsed_ms);
                }
                guard.settle(UploadStatus::Success(view.clone()));
                Ok(view)
            }
            Err(e) => {
                let message = e.to_string();
                error!("Upload error: {}", message);
                if let Some(cb) = &self.config.progress_callback {
                    cb.on_upload_error(&message);
                }
                guard.settle(UploadStatus::Error(message));
                Err(e)
            }
        }
    }

    /// Flip between formatted and raw views. Only JSON output has two views;
    /// otherwise this is a no-op. Returns the mode now in effect.
    pub fn toggle_view_mode(&self) -> ViewMode {
        let mut state = self.state.lock();
        let has_toggle = state.status.output().is_some_and(OutputView::is_json);
        if has_toggle {
            state.view_mode = state.view_mode.toggled();
        }
        state.view_mode
    }

    /// Set the view mode directly; same rules as [`Self::toggle_view_mode`].
    pub fn set_view_mode(&self, mode: ViewMode) -> ViewMode {
        let mut state = self.state.lock();
        if state.status.output().is_some_and(OutputView::is_json) {
            state.view_mode = mode;
        }
        state.view_mode
    }

    /// Save the current output into `dir` as `<file stem>.json`.
    ///
    /// JSON output is written formatted, anything else as-is. Failures are
    /// logged and reported as `None`; the workflow state is never changed.
    pub fn download(&self, dir: impl AsRef<Path>) -> Option<PathBuf> {
        let (content, source_name) = {
            let state = self.state.lock();
            let output = state.status.output()?;
            let file = state.selected_file.as_ref()?;
            (output.download_content().to_string(), file.name.clone())
        };

        match save_download(&content, &source_name, dir.as_ref()) {
            Ok(path) => {
                info!("Downloaded result to {}", path.display());
                Some(path)
            }
            Err(e) => {
                error!("Error downloading JSON: {}", e);
                None
            }
        }
    }

    // ── Read access ──────────────────────────────────────────────────────

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Copy of the upload state.
    pub fn snapshot(&self) -> UploadState {
        self.state.lock().clone()
    }

    pub fn status(&self) -> UploadStatus {
        self.state.lock().status.clone()
    }

    pub fn selected_model(&self) -> String {
        self.state.lock().selected_model.clone()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.state.lock().view_mode
    }

    /// Copy of the catalog state.
    pub fn catalog(&self) -> ModelCatalog {
        self.catalog.lock().clone()
    }

    /// The catalog entry for the selected model, if listed.
    pub fn selected_model_info(&self) -> Option<Model> {
        let model = self.selected_model();
        self.catalog.lock().find(&model).cloned()
    }

    /// Whether a submit would start an upload: a file is selected and no
    /// upload is in flight.
    pub fn can_submit(&self) -> bool {
        let state = self.state.lock();
        state.selected_file.is_some() && !state.status.is_loading()
    }
}

/// Moves the status out of `Loading` when an upload ends, however it ends.
struct LoadingGuard<'a> {
    state: &'a Mutex<UploadState>,
    settled: bool,
}

impl LoadingGuard<'_> {
    fn settle(mut self, status: UploadStatus) {
        self.state.lock().status = status;
        self.settled = true;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut state = self.state.lock();
        if state.status.is_loading() {
            warn!("Upload dropped while in flight");
            state.status = UploadStatus::Error(UPLOAD_INTERRUPTED.to_string());
        }
    }
}
