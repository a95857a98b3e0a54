//! Integration tests against an in-process fake of the parsing service.
//!
//! Each test binds an axum router to `127.0.0.1:0` and points an
//! [`UploadWorkflow`] at it, so the real reqwest multipart path is exercised
//! end to end without any external service.
//!
//! Run with:
//!   cargo test --test service -- --nocapture

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use pdfparse_client::api::{MODELS_UNREACHABLE, UPLOAD_UNEXPECTED, UPLOAD_UNREACHABLE};
use pdfparse_client::{
    ClientConfig, ClientError, UploadProgressCallback, UploadStatus, UploadWorkflow, ViewMode,
    MAX_FILE_SIZE,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Fake service ─────────────────────────────────────────────────────────────

/// One multipart request as the fake service saw it.
#[derive(Debug, Default, Clone)]
struct Received {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Vec<u8>,
    model: String,
}

#[derive(Clone)]
struct Service {
    uploads: Arc<Mutex<Vec<Received>>>,
    reply: Value,
}

impl Service {
    fn replying(data: &str) -> Self {
        Self {
            uploads: Arc::new(Mutex::new(Vec::new())),
            reply: json!({ "data": data }),
        }
    }

    fn upload_count(&self) -> usize {
        self.uploads.lock().len()
    }
}

async fn list_models() -> Json<Value> {
    Json(json!({
        "models": [
            { "value": "gemini-2.5-flash", "name": "Gemini 2.5 Flash", "description": "Fast" },
            { "value": "gemini-2.5-pro", "name": "Gemini 2.5 Pro", "description": "Accurate" }
        ]
    }))
}

async fn record_upload(State(service): State<Service>, mut multipart: Multipart) -> Json<Value> {
    let mut received = Received::default();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "pdf" => {
                received.file_name = field.file_name().map(str::to_string);
                received.content_type = field.content_type().map(str::to_string);
                received.bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
            }
            "model" => received.model = field.text().await.unwrap_or_default(),
            _ => {}
        }
    }
    service.uploads.lock().push(received);
    Json(service.reply.clone())
}

fn echo_router(service: Service) -> Router {
    Router::new()
        .route("/models", get(list_models))
        .route("/upload", post(record_upload))
        .with_state(service)
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{addr}")
}

/// A base URL nothing is listening on.
async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}

fn workflow_for(base_url: &str) -> UploadWorkflow {
    let config = ClientConfig::builder()
        .base_url(base_url)
        .build()
        .expect("valid config");
    UploadWorkflow::new(config).expect("client builds")
}

fn write_pdf(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"%PDF-1.7\n%test\n").expect("write test pdf");
    path
}

// ── Happy path ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn upload_sends_pdf_and_model_fields() {
    let service = Service::replying("{\"invoice\":\"A-17\",\"total\":12.5}");
    let base = spawn(echo_router(service.clone())).await;
    let dir = tempfile::tempdir().unwrap();

    let wf = workflow_for(&base);
    wf.init().await.expect("catalog loads");
    assert_eq!(wf.catalog().models().len(), 2);
    assert_eq!(wf.selected_model(), "gemini-2.5-flash");

    wf.select_model("gemini-2.5-pro").unwrap();
    wf.select_file_path(write_pdf(dir.path(), "report.pdf")).unwrap();
    let output = wf.submit().await.expect("upload succeeds");

    let uploads = service.uploads.lock().clone();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].model, "gemini-2.5-pro");
    assert_eq!(uploads[0].file_name.as_deref(), Some("report.pdf"));
    assert_eq!(uploads[0].content_type.as_deref(), Some("application/pdf"));
    assert_eq!(uploads[0].bytes, b"%PDF-1.7\n%test\n");

    assert!(output.is_json());
    assert_eq!(
        wf.snapshot().rendered_output(),
        Some("{\n  \"invoice\": \"A-17\",\n  \"total\": 12.5\n}")
    );
    assert_eq!(wf.toggle_view_mode(), ViewMode::Raw);
    assert_eq!(
        wf.snapshot().rendered_output(),
        Some("{\"invoice\":\"A-17\",\"total\":12.5}")
    );

    let saved = wf.download(dir.path().join("out")).expect("download saved");
    assert_eq!(saved.file_name().unwrap(), "report.json");
    assert_eq!(
        std::fs::read_to_string(saved).unwrap(),
        "{\n  \"invoice\": \"A-17\",\n  \"total\": 12.5\n}"
    );
}

#[tokio::test]
async fn plain_text_result_is_raw_only() {
    let base = spawn(echo_router(Service::replying("hello world"))).await;
    let dir = tempfile::tempdir().unwrap();

    let wf = workflow_for(&base);
    wf.select_file_path(write_pdf(dir.path(), "notes.pdf")).unwrap();
    let output = wf.submit().await.unwrap();

    assert!(!output.is_json());
    assert_eq!(wf.toggle_view_mode(), ViewMode::Formatted);
    assert_eq!(wf.snapshot().rendered_output(), Some("hello world"));

    let saved = wf.download(dir.path()).unwrap();
    assert_eq!(std::fs::read_to_string(saved).unwrap(), "hello world");
}

#[tokio::test]
async fn progress_events_fire_in_order() {
    #[derive(Default)]
    struct Events {
        log: Mutex<Vec<String>>,
        completes: AtomicUsize,
    }
    impl UploadProgressCallback for Events {
        fn on_catalog_loaded(&self, model_count: usize, _error: Option<&str>) {
            self.log.lock().push(format!("catalog:{model_count}"));
        }
        fn on_upload_start(&self, file_name: &str, _size: u64, model: &str) {
            self.log.lock().push(format!("start:{file_name}:{model}"));
        }
        fn on_upload_complete(&self, output_len: usize, _elapsed_ms: u64) {
            self.completes.fetch_add(1, Ordering::SeqCst);
            self.log.lock().push(format!("done:{output_len}"));
        }
    }

    let base = spawn(echo_router(Service::replying("[1,2]"))).await;
    let dir = tempfile::tempdir().unwrap();
    let events = Arc::new(Events::default());

    let config = ClientConfig::builder()
        .base_url(&base)
        .progress_callback(events.clone())
        .build()
        .unwrap();
    let wf = UploadWorkflow::new(config).unwrap();
    wf.init().await.unwrap();
    wf.select_file_path(write_pdf(dir.path(), "a.pdf")).unwrap();
    wf.submit().await.unwrap();

    assert_eq!(
        *events.log.lock(),
        vec!["catalog:2", "start:a.pdf:gemini-2.5-flash", "done:5"]
    );
    assert_eq!(events.completes.load(Ordering::SeqCst), 1);
}

// ── Validation never reaches the network ─────────────────────────────────────

#[tokio::test]
async fn submit_without_file_sends_no_request() {
    let service = Service::replying("unused");
    let base = spawn(echo_router(service.clone())).await;

    let wf = workflow_for(&base);
    let err = wf.submit().await.unwrap_err();
    assert_eq!(err.to_string(), "Please select a PDF file first.");
    assert_eq!(service.upload_count(), 0);
}

#[tokio::test]
async fn oversized_and_non_pdf_files_are_rejected() {
    let service = Service::replying("unused");
    let base = spawn(echo_router(service.clone())).await;
    let dir = tempfile::tempdir().unwrap();
    let wf = workflow_for(&base);

    let big = dir.path().join("huge.pdf");
    std::fs::File::create(&big)
        .and_then(|f| f.set_len(MAX_FILE_SIZE + 1))
        .unwrap();
    let err = wf.select_file_path(&big).unwrap_err();
    assert_eq!(err.to_string(), "File size must be less than 50MB.");

    let txt = dir.path().join("notes.txt");
    std::fs::write(&txt, b"plain").unwrap();
    let err = wf.select_file_path(&txt).unwrap_err();
    assert_eq!(err.to_string(), "Please select a PDF file.");

    assert!(wf.snapshot().selected_file.is_none());
    assert!(matches!(wf.submit().await, Err(ClientError::NoFileSelected)));
    assert_eq!(service.upload_count(), 0);
}

// ── Service errors ───────────────────────────────────────────────────────────

#[tokio::test]
async fn backend_error_message_is_verbatim() {
    let app = Router::new().route(
        "/upload",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Gemini quota exhausted" })),
            )
        }),
    );
    let base = spawn(app).await;
    let dir = tempfile::tempdir().unwrap();

    let wf = workflow_for(&base);
    wf.select_file_path(write_pdf(dir.path(), "a.pdf")).unwrap();
    let err = wf.submit().await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(wf.status(), UploadStatus::Error("Gemini quota exhausted".into()));
}

#[tokio::test]
async fn non_json_error_body_falls_back_to_status() {
    let app = Router::new().route(
        "/upload",
        post(|| async { (StatusCode::BAD_GATEWAY, "Bad Gateway") }),
    );
    let base = spawn(app).await;
    let dir = tempfile::tempdir().unwrap();

    let wf = workflow_for(&base);
    wf.select_file_path(write_pdf(dir.path(), "a.pdf")).unwrap();
    wf.submit().await.unwrap_err();

    assert_eq!(wf.status().error(), Some("HTTP error! status: 502"));
}

#[tokio::test]
async fn malformed_success_body_is_reported() {
    let app = Router::new().route(
        "/upload",
        post(|| async { Json(json!({ "result": "wrong field" })) }),
    );
    let base = spawn(app).await;
    let dir = tempfile::tempdir().unwrap();

    let wf = workflow_for(&base);
    wf.select_file_path(write_pdf(dir.path(), "a.pdf")).unwrap();
    let err = wf.submit().await.unwrap_err();

    assert!(matches!(err, ClientError::UnexpectedResponse { .. }));
    assert_eq!(wf.status().error(), Some(UPLOAD_UNEXPECTED));
}

#[tokio::test]
async fn catalog_error_is_surfaced_and_list_left_empty() {
    let app = Router::new().route(
        "/models",
        get(|| async {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "Model registry offline" })),
            )
        }),
    );
    let base = spawn(app).await;

    let wf = workflow_for(&base);
    let err = wf.init().await.unwrap_err();
    assert_eq!(err.to_string(), "Model registry offline");

    let catalog = wf.catalog();
    assert!(catalog.is_empty());
    assert!(!catalog.loading());
    assert_eq!(catalog.error(), Some("Model registry offline"));
}

// ── Unreachable service ──────────────────────────────────────────────────────

#[tokio::test]
async fn unreachable_service_is_not_fatal() {
    let base = dead_url().await;
    let dir = tempfile::tempdir().unwrap();
    let wf = workflow_for(&base);

    let err = wf.init().await.unwrap_err();
    assert_eq!(err.to_string(), MODELS_UNREACHABLE);

    wf.select_file_path(write_pdf(dir.path(), "a.pdf")).unwrap();
    let err = wf.submit().await.unwrap_err();
    assert!(matches!(err, ClientError::Transport { .. }));

    let status = wf.status();
    assert!(!status.is_loading());
    assert_eq!(status.error(), Some(UPLOAD_UNREACHABLE));

    // Still usable: a fresh selection clears the error.
    wf.select_file_path(write_pdf(dir.path(), "b.pdf")).unwrap();
    assert_eq!(wf.status(), UploadStatus::Idle);
    assert!(wf.can_submit());
}
