//! Integration tests for the batch execution strategies.
//!
//! Every strategy must return exactly one record per submitted file, whatever
//! mix of per-item and strategy-level failures the mock service produces.

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use codesim_embeddings::{
    EmbeddingClient, EmbeddingRecord, ServiceConfig, SourceFile, find_similar_pairs,
};
use codesim_runner::{
    EmbedRunner, EmbedTransform, FrameBackend, FrameEmbedder, RunnerKind, ThreadedEmbedder,
};

/// Deterministic vector for an input text, so reruns are comparable.
fn vector_for(text: &str) -> Vec<f64> {
    let bytes: f64 = text.bytes().map(f64::from).sum();
    vec![bytes, text.len() as f64, 1.0]
}

/// Replies with one deterministic vector per input text, single or batched.
struct EmbedResponder;

impl Respond for EmbedResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let inputs: Vec<String> = match &body["input"] {
            Value::String(text) => vec![text.clone()],
            Value::Array(items) => items
                .iter()
                .map(|v| v.as_str().unwrap_or_default().to_string())
                .collect(),
            _ => Vec::new(),
        };
        let data: Vec<Value> = inputs
            .iter()
            .enumerate()
            .map(|(index, text)| json!({"embedding": vector_for(text), "index": index}))
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({"data": data}))
    }
}

/// Serves single-text requests but rejects batched (array-input) ones.
struct SingleOnlyResponder;

impl Respond for SingleOnlyResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        if body["input"].is_array() {
            ResponseTemplate::new(500).set_body_string("batched input unsupported")
        } else {
            EmbedResponder.respond(request)
        }
    }
}

async fn mock_service() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(EmbedResponder)
        .mount(&server)
        .await;
    server
}

fn client_for(server: &MockServer) -> EmbeddingClient {
    EmbeddingClient::new(ServiceConfig::new(server.uri(), "test-key"))
}

fn sample_files() -> Vec<SourceFile> {
    vec![
        SourceFile::new("a.py", "def a(): return 1"),
        SourceFile::new("b.py", "def b(): return 2"),
        SourceFile::new("c.py", "def c(): return 3"),
    ]
}

fn by_filename(mut records: Vec<EmbeddingRecord>) -> Vec<EmbeddingRecord> {
    records.sort_by(|a, b| a.filename.cmp(&b.filename));
    records
}

#[tokio::test]
async fn threaded_produces_one_record_per_file() {
    let server = mock_service().await;
    let files = sample_files();

    let records = ThreadedEmbedder::new(client_for(&server))
        .embed_files(files.clone())
        .await;

    let records = by_filename(records);
    assert_eq!(records.len(), files.len());
    for (record, file) in records.iter().zip(&files) {
        assert_eq!(record.filename, file.filename);
        assert_eq!(record.embedding, vector_for(&file.code));
    }
}

#[tokio::test]
async fn threaded_isolates_per_file_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(body_string_contains("boom"))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(EmbedResponder)
        .mount(&server)
        .await;

    let files = vec![
        SourceFile::new("good1.py", "def a(): return 1"),
        SourceFile::new("bad.py", "def boom(): raise ValueError"),
        SourceFile::new("good2.py", "def b(): return 2"),
    ];

    let records = by_filename(
        ThreadedEmbedder::new(client_for(&server))
            .embed_files(files)
            .await,
    );

    assert_eq!(records.len(), 3);
    assert!(records[0].embedding.is_empty());
    assert!(!records[1].embedding.is_empty());
    assert!(!records[2].embedding.is_empty());
}

#[tokio::test]
async fn frame_construction_issues_no_requests() {
    let server = mock_service().await;
    let _embedder = FrameEmbedder::new(
        client_for(&server),
        FrameBackend::Local,
        EmbedTransform::Batched,
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn distributed_frame_batches_and_reassociates() {
    let server = mock_service().await;
    let files = vec![
        SourceFile::new("a.py", "def a(): return 1"),
        SourceFile::new("b.py", "def bb(): return 22"),
        SourceFile::new("c.py", "def ccc(): return 333"),
        SourceFile::new("d.py", "def dddd(): return 4444"),
    ];

    let runner = EmbedRunner::new(RunnerKind::Ray, client_for(&server)).with_distributed_workers(2);
    let records = by_filename(runner.run(files.clone()).await);

    assert_eq!(records.len(), files.len());
    for (record, file) in records.iter().zip(&files) {
        assert_eq!(record.embedding, vector_for(&file.code));
    }

    // Two workers, two partitions, one batched request each.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn ray_without_workers_falls_back_to_threads() {
    let server = mock_service().await;
    let files = sample_files();

    let runner = EmbedRunner::new(RunnerKind::Ray, client_for(&server));
    let records = by_filename(runner.run(files.clone()).await);

    assert_eq!(records.len(), files.len());
    for (record, file) in records.iter().zip(&files) {
        assert_eq!(record.embedding, vector_for(&file.code));
    }
}

#[tokio::test]
async fn ray_re_executes_fully_when_a_batch_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(SingleOnlyResponder)
        .mount(&server)
        .await;

    let files = sample_files();
    let runner = EmbedRunner::new(RunnerKind::Ray, client_for(&server)).with_distributed_workers(2);
    let records = by_filename(runner.run(files.clone()).await);

    // The batched attempt dies, the threaded re-execution covers every file.
    assert_eq!(records.len(), files.len());
    for (record, file) in records.iter().zip(&files) {
        assert_eq!(record.embedding, vector_for(&file.code));
    }
}

#[tokio::test]
async fn daft_udf_isolates_row_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .and(body_string_contains("boom"))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(EmbedResponder)
        .mount(&server)
        .await;

    let files = vec![
        SourceFile::new("good1.py", "def a(): return 1"),
        SourceFile::new("bad.py", "def boom(): raise ValueError"),
        SourceFile::new("good2.py", "def b(): return 2"),
    ];

    let runner = EmbedRunner::new(RunnerKind::Daft, client_for(&server));
    let records = by_filename(runner.run(files).await);

    assert_eq!(records.len(), 3);
    assert!(records[0].embedding.is_empty());
    assert!(!records[1].embedding.is_empty());
    assert!(!records[2].embedding.is_empty());
}

#[tokio::test]
async fn reruns_reproduce_identical_similarity_pairs() {
    let server = mock_service().await;
    let files = sample_files();

    let runner = EmbedRunner::new(RunnerKind::Threads, client_for(&server));
    let first = by_filename(runner.run(files.clone()).await);
    let second = by_filename(runner.run(files).await);

    let pairs_first = find_similar_pairs(&first, 0.5).unwrap();
    let pairs_second = find_similar_pairs(&second, 0.5).unwrap();
    assert_eq!(pairs_first, pairs_second);
}
