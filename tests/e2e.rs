//! End-to-end tests for the process lifecycle against a mock service.
//!
//! A `wiremock` server stands in for the process endpoint, the per-job URL
//! and the output file host. The poll interval is shortened to a few
//! milliseconds so the wait loop can be exercised quickly; the number of
//! status checks is asserted through mock expectations.

use cloudconvert::{
    convert_file, convert_file_sync, convert_url, output_stream, ApiKey, ClientConfig,
    CloudConvertError, Conversion, ErrorKind, Process, ProcessProgressCallback, ProcessStatus,
};
use futures::StreamExt;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const JOB_PATH: &str = "/process/abc123";
const POLL: Duration = Duration::from_millis(10);

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Route library logs to the test harness; `RUST_LOG=debug` shows requests.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn api_key() -> ApiKey {
    ApiKey::new("test-key").expect("valid key")
}

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::builder()
        .base_url(format!("{}/process", server.uri()))
        .poll_interval(POLL)
        .build()
        .expect("valid config")
}

fn job_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), JOB_PATH)
}

/// Mount the creation endpoint answering with `body`.
async fn mount_create(server: &MockServer, body: Value) {
    Mock::given(method("POST"))
        .and(path("/process"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Start a server whose creation endpoint hands out a job URL on itself.
async fn server_with_process() -> MockServer {
    init_tracing();
    let server = MockServer::start().await;
    mount_create(&server, json!({ "id": "abc123", "url": job_url(&server) })).await;
    server
}

fn finished(server: &MockServer) -> Value {
    json!({
        "step": "finished",
        "percent": 100,
        "message": "Conversion finished!",
        "output": { "url": format!("{}/files/out.png", server.uri()), "filename": "out.png" }
    })
}

fn converting() -> Value {
    json!({ "step": "convert", "percent": 40, "message": "Converting file" })
}

/// Answers with the given bodies in order, repeating the last one.
struct StepSequence {
    calls: Arc<AtomicUsize>,
    bodies: Vec<Value>,
}

impl StepSequence {
    fn new(bodies: Vec<Value>) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            bodies,
        }
    }
}

impl Respond for StepSequence {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        let body = &self.bodies[n.min(self.bodies.len() - 1)];
        ResponseTemplate::new(200).set_body_json(body.clone())
    }
}

/// Mount the status endpoint, expecting exactly `expected` checks.
async fn mount_status_sequence(server: &MockServer, bodies: Vec<Value>, expected: u64) {
    Mock::given(method("GET"))
        .and(path(JOB_PATH))
        .respond_with(StepSequence::new(bodies))
        .expect(expected)
        .mount(server)
        .await;
}

async fn mount_output(server: &MockServer, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path("/files/out.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(server)
        .await;
}

async fn mount_upload_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(JOB_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "step": "wait" })))
        .mount(server)
        .await;
}

/// Bodies of every request received on `p`, decoded lossily.
async fn bodies_on(server: &MockServer, p: &str) -> Vec<String> {
    server
        .received_requests()
        .await
        .expect("request recording enabled")
        .into_iter()
        .filter(|r| r.url.path() == p && r.method.as_str() == "POST")
        .map(|r| String::from_utf8_lossy(&r.body).into_owned())
        .collect()
}

/// Value of a text field in a multipart body.
fn multipart_field(body: &str, name: &str) -> Option<String> {
    let marker = format!("name=\"{name}\"");
    let start = body.find(&marker)?;
    let rest = &body[start..];
    let value_start = rest.find("\r\n\r\n")? + 4;
    let value = &rest[value_start..];
    let end = value.find("\r\n")?;
    Some(value[..end].to_string())
}

// ── Creation ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_normalises_scheme_relative_url() {
    let server = MockServer::start().await;
    mount_create(&server, json!({ "url": "//api.example.com/process/abc123" })).await;

    let process = Process::create("jpg", "png", &api_key(), &config_for(&server))
        .await
        .expect("create should succeed");

    assert_eq!(process.url(), "https://api.example.com/process/abc123");
    assert_eq!(process.input_format(), "jpg");
    assert_eq!(process.output_format(), "png");
    assert!(process.last_status().is_none());
}

#[tokio::test]
async fn test_create_sends_formats_and_key_but_no_options() {
    let server = server_with_process().await;

    let process = Process::create("jpg", "png", &api_key(), &config_for(&server))
        .await
        .expect("create should succeed");
    assert_eq!(process.url(), job_url(&server));

    let bodies = bodies_on(&server, "/process").await;
    assert_eq!(bodies.len(), 1);
    let body = &bodies[0];
    assert!(body.contains("inputformat=jpg"), "got: {body}");
    assert!(body.contains("outputformat=png"), "got: {body}");
    assert!(body.contains("apikey=test-key"), "got: {body}");
    assert!(!body.contains("email"), "got: {body}");
}

#[tokio::test]
async fn test_create_surfaces_api_error_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "error": "Invalid API key" })),
        )
        .mount(&server)
        .await;

    let err = Process::create("jpg", "png", &api_key(), &config_for(&server))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Remote);
    assert_eq!(err.remote_message(), Some("Invalid API key"));
}

#[tokio::test]
async fn test_create_rejects_non_json_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = Process::create("jpg", "png", &api_key(), &config_for(&server))
        .await
        .unwrap_err();

    assert!(
        matches!(err, CloudConvertError::InvalidResponse { status: 502, .. }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn test_create_requires_url_field() {
    let server = MockServer::start().await;
    mount_create(&server, json!({ "id": "abc123" })).await;

    let err = Process::create("jpg", "png", &api_key(), &config_for(&server))
        .await
        .unwrap_err();

    assert!(matches!(err, CloudConvertError::InvalidResponse { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_create_transport_failure_is_remote() {
    let config = ClientConfig::builder()
        .base_url("http://127.0.0.1:1/process")
        .build()
        .unwrap();

    let err = Process::create("jpg", "png", &api_key(), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, CloudConvertError::Transport { .. }), "got: {err:?}");
    assert_eq!(err.kind(), ErrorKind::Remote);
}

// ── Input submission ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_upload_sends_fixed_fields_options_and_file() {
    let server = server_with_process().await;
    mount_upload_ok(&server).await;
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("photo.jpg");
    std::fs::write(&input, b"JPEGDATA").unwrap();

    let mut process = Process::create("jpg", "png", &api_key(), &config_for(&server))
        .await
        .unwrap();
    process.set_option("email", "1");
    process.upload(&input).await.expect("upload should succeed");

    let bodies = bodies_on(&server, JOB_PATH).await;
    assert_eq!(bodies.len(), 1);
    let body = &bodies[0];
    assert_eq!(multipart_field(body, "input").as_deref(), Some("upload"));
    assert_eq!(multipart_field(body, "format").as_deref(), Some("png"));
    assert_eq!(multipart_field(body, "filename").as_deref(), Some("input.jpg"));
    assert_eq!(multipart_field(body, "email").as_deref(), Some("1"));
    assert!(body.contains("name=\"file\""), "got: {body}");
    assert!(body.contains("JPEGDATA"), "got: {body}");
}

#[tokio::test]
async fn test_upload_option_overrides_reserved_field() {
    let server = server_with_process().await;
    mount_upload_ok(&server).await;

    let mut process = Process::create("jpg", "png", &api_key(), &config_for(&server))
        .await
        .unwrap();
    process.set_option("format", "webp");
    process.upload_bytes(b"JPEGDATA".to_vec()).await.unwrap();

    let body = &bodies_on(&server, JOB_PATH).await[0];
    assert_eq!(multipart_field(body, "format").as_deref(), Some("webp"));
}

#[tokio::test]
async fn test_upload_missing_file_sends_nothing() {
    let server = server_with_process().await;
    Mock::given(method("POST"))
        .and(path(JOB_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let mut process = Process::create("jpg", "png", &api_key(), &config_for(&server))
        .await
        .unwrap();
    let err = process.upload("/definitely/not/here.jpg").await.unwrap_err();

    assert!(matches!(err, CloudConvertError::InputReadFailed { .. }), "got: {err:?}");
    assert_eq!(err.kind(), ErrorKind::LocalIo);
}

#[tokio::test]
async fn test_upload_remote_error_is_surfaced() {
    let server = server_with_process().await;
    Mock::given(method("POST"))
        .and(path(JOB_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "File too large" })))
        .mount(&server)
        .await;

    let mut process = Process::create("jpg", "png", &api_key(), &config_for(&server))
        .await
        .unwrap();
    let err = process.upload_bytes(vec![0u8; 16]).await.unwrap_err();

    assert_eq!(err.remote_message(), Some("File too large"));
}

#[tokio::test]
async fn test_upload_by_url_uses_per_call_format() {
    let server = server_with_process().await;
    Mock::given(method("POST"))
        .and(path(JOB_PATH))
        .and(body_string_contains("input=download"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "step": "input" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut process = Process::create("docx", "pdf", &api_key(), &config_for(&server))
        .await
        .unwrap();
    process.set_option("email", "0");
    let reply = process
        .upload_by_url("https://example.com/report.docx", "report.docx", "odt")
        .await
        .expect("remote input should be accepted");
    assert_eq!(reply.step.as_ref().map(|s| s.as_str()), Some("input"));

    let body = &bodies_on(&server, JOB_PATH).await[0];
    assert!(body.contains("format=odt"), "got: {body}");
    assert!(body.contains("filename=report.docx"), "got: {body}");
    assert!(
        body.contains("link=https%3A%2F%2Fexample.com%2Freport.docx"),
        "got: {body}"
    );
    assert!(body.contains("email=0"), "got: {body}");
}

// ── Status, cancel, delete ───────────────────────────────────────────────────

#[tokio::test]
async fn test_status_replaces_snapshot() {
    let server = server_with_process().await;
    mount_status_sequence(&server, vec![converting(), json!({ "step": "output" })], 2).await;

    let mut process = Process::create("jpg", "png", &api_key(), &config_for(&server))
        .await
        .unwrap();

    let first = process.status().await.unwrap().clone();
    assert_eq!(first.percent, Some(40.0));
    assert_eq!(first.message.as_deref(), Some("Converting file"));

    process.status().await.unwrap();
    let snapshot = process.last_status().expect("snapshot stored");
    assert_eq!(snapshot.step.as_ref().map(|s| s.as_str()), Some("output"));
    assert_eq!(snapshot.percent, None);
    assert_eq!(snapshot.message, None);
}

#[tokio::test]
async fn test_cancel_and_delete_hit_action_urls() {
    let server = server_with_process().await;
    for action in ["cancel", "delete"] {
        Mock::given(method("GET"))
            .and(path(format!("{JOB_PATH}/{action}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "step": "error", "message": format!("{action} requested") })),
            )
            .expect(1)
            .mount(&server)
            .await;
    }

    let mut process = Process::create("jpg", "png", &api_key(), &config_for(&server))
        .await
        .unwrap();

    let cancelled = process.cancel().await.unwrap();
    assert_eq!(cancelled.message.as_deref(), Some("cancel requested"));

    let deleted = process.delete().await.unwrap();
    assert_eq!(deleted.message.as_deref(), Some("delete requested"));
    assert_eq!(
        process.last_status().and_then(|s| s.message.as_deref()),
        Some("delete requested")
    );
}

// ── Waiting ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_wait_finishes_on_third_check() {
    let server = server_with_process().await;
    mount_status_sequence(
        &server,
        vec![converting(), converting(), finished(&server)],
        3,
    )
    .await;

    let mut process = Process::create("jpg", "png", &api_key(), &config_for(&server))
        .await
        .unwrap();

    let start = Instant::now();
    let status = process
        .wait_for_completion(Duration::from_secs(120))
        .await
        .expect("wait should succeed");

    assert!(status.is_complete());
    assert!(start.elapsed() >= POLL * 3, "three intervals must elapse");
    server.verify().await;
}

#[tokio::test]
async fn test_wait_fails_on_first_error_step() {
    let server = server_with_process().await;
    mount_status_sequence(
        &server,
        vec![json!({ "step": "error", "message": "unsupported format" })],
        1,
    )
    .await;

    let mut process = Process::create("jpg", "png", &api_key(), &config_for(&server))
        .await
        .unwrap();

    let err = process
        .wait_for_completion(Duration::from_secs(120))
        .await
        .unwrap_err();

    match err {
        CloudConvertError::ConversionFailed { ref message } => {
            assert_eq!(message, "unsupported format")
        }
        ref other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::Remote);
    server.verify().await;
}

#[tokio::test]
async fn test_wait_error_after_progress_still_fails() {
    let server = server_with_process().await;
    mount_status_sequence(
        &server,
        vec![
            converting(),
            json!({ "step": "error", "message": "conversion crashed" }),
        ],
        2,
    )
    .await;

    let mut process = Process::create("jpg", "png", &api_key(), &config_for(&server))
        .await
        .unwrap();
    let err = process.wait().await.unwrap_err();

    assert_eq!(err.remote_message(), Some("conversion crashed"));
    server.verify().await;
}

#[tokio::test]
async fn test_wait_times_out_after_budget_plus_one_checks() {
    let server = server_with_process().await;
    // 30ms budget at 10ms intervals = 3 ticks, checked while the counter <= 3.
    mount_status_sequence(&server, vec![converting()], 4).await;

    let mut process = Process::create("jpg", "png", &api_key(), &config_for(&server))
        .await
        .unwrap();

    let err = process
        .wait_for_completion(POLL * 3)
        .await
        .unwrap_err();

    match err {
        CloudConvertError::Timeout { polls, waited } => {
            assert_eq!(polls, 4);
            assert_eq!(waited, POLL * 3);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    server.verify().await;
}

#[tokio::test]
async fn test_wait_finished_without_output_keeps_polling() {
    let server = server_with_process().await;
    mount_status_sequence(&server, vec![json!({ "step": "finished" })], 3).await;

    let mut process = Process::create("jpg", "png", &api_key(), &config_for(&server))
        .await
        .unwrap();
    let err = process.wait_for_completion(POLL * 2).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    server.verify().await;
}

// ── Output retrieval ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_download_requires_finished_status() {
    let server = server_with_process().await;
    let process = Process::create("jpg", "png", &api_key(), &config_for(&server))
        .await
        .unwrap();
    let dir = TempDir::new().unwrap();

    let err = process.download(dir.path().join("out.png")).await.unwrap_err();
    assert!(matches!(err, CloudConvertError::OutputNotReady));
    assert_eq!(err.kind(), ErrorKind::Precondition);

    let err = process.download_to_memory().await.unwrap_err();
    assert!(matches!(err, CloudConvertError::OutputNotReady));
}

#[tokio::test]
async fn test_download_to_file_memory_and_stream() {
    let server = server_with_process().await;
    mount_status_sequence(&server, vec![finished(&server)], 1).await;
    let content = b"\x89PNG converted bytes".to_vec();
    mount_output(&server, &content).await;

    let mut process = Process::create("jpg", "png", &api_key(), &config_for(&server))
        .await
        .unwrap();
    process.wait().await.unwrap();

    let dir = TempDir::new().unwrap();
    let target = dir.path().join("out.png");
    let written = process.download(&target).await.expect("download to file");
    assert_eq!(written, content.len() as u64);
    assert_eq!(std::fs::read(&target).unwrap(), content);

    let in_memory = process.download_to_memory().await.expect("download to memory");
    assert_eq!(in_memory.as_ref(), content.as_slice());

    let mut chunks = output_stream(&process).await.expect("open stream");
    let mut streamed = Vec::new();
    while let Some(chunk) = chunks.next().await {
        streamed.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(streamed, content);
}

#[tokio::test]
async fn test_failed_download_leaves_partial_file() {
    let server = server_with_process().await;
    mount_status_sequence(&server, vec![finished(&server)], 1).await;
    Mock::given(method("GET"))
        .and(path("/files/out.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut process = Process::create("jpg", "png", &api_key(), &config_for(&server))
        .await
        .unwrap();
    process.status().await.unwrap();

    let dir = TempDir::new().unwrap();
    let target = dir.path().join("out.png");
    let err = process.download(&target).await.unwrap_err();

    assert!(
        matches!(err, CloudConvertError::DownloadFailed { status: 404, .. }),
        "got: {err:?}"
    );
    assert!(target.exists(), "target is created before the transfer");
}

// ── One-shot flow ────────────────────────────────────────────────────────────

#[derive(Default)]
struct CountingCallback {
    created: AtomicUsize,
    submitted: AtomicUsize,
    polls: AtomicU64,
    completed: AtomicUsize,
    saved: AtomicU64,
}

impl ProcessProgressCallback for CountingCallback {
    fn on_process_created(&self, _process_url: &str) {
        self.created.fetch_add(1, Ordering::SeqCst);
    }

    fn on_input_submitted(&self, _filename: &str) {
        self.submitted.fetch_add(1, Ordering::SeqCst);
    }

    fn on_poll(&self, attempt: u64, _status: &ProcessStatus) {
        self.polls.store(attempt, Ordering::SeqCst);
    }

    fn on_completed(&self, _status: &ProcessStatus) {
        self.completed.fetch_add(1, Ordering::SeqCst);
    }

    fn on_output_saved(&self, bytes_written: u64) {
        self.saved.store(bytes_written, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_convert_file_runs_whole_lifecycle() {
    let server = server_with_process().await;
    mount_upload_ok(&server).await;
    mount_status_sequence(&server, vec![converting(), finished(&server)], 2).await;
    mount_output(&server, b"converted").await;

    let tracker = Arc::new(CountingCallback::default());
    let config = ClientConfig::builder()
        .base_url(format!("{}/process", server.uri()))
        .poll_interval(POLL)
        .progress_callback(tracker.clone())
        .build()
        .unwrap();

    let dir = TempDir::new().unwrap();
    let input = dir.path().join("photo.jpg");
    std::fs::write(&input, b"JPEGDATA").unwrap();
    let output = dir.path().join("nested/photo.png");

    let job = Conversion::new("jpg", "png").option("email", "1");
    let summary = convert_file(&job, &input, &output, &api_key(), &config)
        .await
        .expect("conversion should succeed");

    assert_eq!(summary.process_url, job_url(&server));
    assert_eq!(summary.bytes_written, 9);
    assert!(summary.status.is_complete());
    assert_eq!(std::fs::read(&output).unwrap(), b"converted");

    let upload_body = &bodies_on(&server, JOB_PATH).await[0];
    assert_eq!(multipart_field(upload_body, "email").as_deref(), Some("1"));

    assert_eq!(tracker.created.load(Ordering::SeqCst), 1);
    assert_eq!(tracker.submitted.load(Ordering::SeqCst), 1);
    assert_eq!(tracker.polls.load(Ordering::SeqCst), 2);
    assert_eq!(tracker.completed.load(Ordering::SeqCst), 1);
    assert_eq!(tracker.saved.load(Ordering::SeqCst), 9);
}

#[tokio::test]
async fn test_convert_url_submits_link() {
    let server = server_with_process().await;
    Mock::given(method("POST"))
        .and(path(JOB_PATH))
        .and(body_string_contains("input=download"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "step": "input" })))
        .expect(1)
        .mount(&server)
        .await;
    mount_status_sequence(&server, vec![finished(&server)], 1).await;
    mount_output(&server, b"%PDF-1.7").await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("report.pdf");
    let job = Conversion::new("docx", "pdf");
    let summary = convert_url(
        &job,
        "https://example.com/report.docx",
        "report.docx",
        &output,
        &api_key(),
        &config_for(&server),
    )
    .await
    .expect("conversion should succeed");

    assert_eq!(summary.bytes_written, 8);
    assert_eq!(std::fs::read(&output).unwrap(), b"%PDF-1.7");
    let body = &bodies_on(&server, JOB_PATH).await[0];
    assert!(body.contains("format=pdf"), "got: {body}");
}

#[test]
fn test_convert_file_sync_outside_runtime() {
    let server = tokio_test::block_on(async {
        let server = server_with_process().await;
        mount_upload_ok(&server).await;
        mount_status_sequence(&server, vec![finished(&server)], 1).await;
        mount_output(&server, b"sync").await;
        server
    });

    let dir = TempDir::new().unwrap();
    let input = dir.path().join("photo.jpg");
    std::fs::write(&input, b"JPEGDATA").unwrap();
    let output = dir.path().join("photo.png");

    let summary = convert_file_sync(
        &Conversion::new("jpg", "png"),
        &input,
        &output,
        &api_key(),
        &config_for(&server),
    )
    .expect("blocking conversion should succeed");

    assert_eq!(summary.bytes_written, 4);
    assert_eq!(std::fs::read(&output).unwrap(), b"sync");
}

// ── Timeouts and reply status ────────────────────────────────────────────────

#[tokio::test]
async fn test_create_missing_url_reports_reply_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/process"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = Process::create("jpg", "png", &api_key(), &config_for(&server))
        .await
        .unwrap_err();

    assert!(
        matches!(err, CloudConvertError::InvalidResponse { status: 500, .. }),
        "got: {err:?}"
    );
    assert!(err.to_string().contains("HTTP 500"), "got: {err}");
}

async fn mount_slow_output(server: &MockServer, content: &[u8], delay: Duration) {
    Mock::given(method("GET"))
        .and(path("/files/out.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(content.to_vec())
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_request_timeout_does_not_bound_output_download() {
    let server = server_with_process().await;
    mount_status_sequence(&server, vec![finished(&server)], 1).await;
    mount_slow_output(&server, b"slow output", Duration::from_millis(500)).await;

    let config = ClientConfig::builder()
        .base_url(format!("{}/process", server.uri()))
        .poll_interval(POLL)
        .request_timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let mut process = Process::create("jpg", "png", &api_key(), &config)
        .await
        .unwrap();
    process.status().await.unwrap();

    let dir = TempDir::new().unwrap();
    let target = dir.path().join("out.png");
    let written = process
        .download(&target)
        .await
        .expect("output download must outlive the API-call timeout");
    assert_eq!(written, 11);
    assert_eq!(std::fs::read(&target).unwrap(), b"slow output");

    let mut chunks = output_stream(&process).await.expect("open stream");
    let mut streamed = Vec::new();
    while let Some(chunk) = chunks.next().await {
        streamed.extend_from_slice(&chunk.unwrap());
    }
    assert_eq!(streamed, b"slow output");
}

#[tokio::test]
async fn test_request_timeout_bounds_status_call() {
    let server = server_with_process().await;
    Mock::given(method("GET"))
        .and(path(JOB_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(converting())
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .base_url(format!("{}/process", server.uri()))
        .request_timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    let mut process = Process::create("jpg", "png", &api_key(), &config)
        .await
        .unwrap();

    let err = process.status().await.unwrap_err();
    assert!(matches!(err, CloudConvertError::Transport { .. }), "got: {err:?}");
    assert!(process.last_status().is_none());
}

#[tokio::test]
async fn test_download_timeout_bounds_in_memory_download() {
    let server = server_with_process().await;
    mount_status_sequence(&server, vec![finished(&server)], 1).await;
    mount_slow_output(&server, b"late", Duration::from_millis(500)).await;

    let config = ClientConfig::builder()
        .base_url(format!("{}/process", server.uri()))
        .poll_interval(POLL)
        .download_timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    let mut process = Process::create("jpg", "png", &api_key(), &config)
        .await
        .unwrap();
    process.status().await.unwrap();

    let err = process.download_to_memory().await.unwrap_err();
    assert!(matches!(err, CloudConvertError::Transport { .. }), "got: {err:?}");
    assert_eq!(err.kind(), ErrorKind::Remote);
}
