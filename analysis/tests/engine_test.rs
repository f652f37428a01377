//! Integration tests for the enhanced analysis engine.

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use codesim_analysis::{AnalysisEngine, AnalysisError, AnalysisReport, AnalyzeRunner};
use codesim_embeddings::chat::ChatClient;
use codesim_embeddings::{EmbeddingError, EmbeddingRecord, ServiceConfig, save_records};

async fn write_embeddings(dir: &TempDir) -> codesim_embeddings::Result<std::path::PathBuf> {
    let path = dir.path().join("embeddings.json");
    let records = vec![
        EmbeddingRecord::new("a.py", "def a(): return 1", vec![1.0, 0.0]),
        EmbeddingRecord::new("b.py", "def b(): return 2", vec![1.0, 0.0]),
        EmbeddingRecord::new("c.py", "def c(): return 3", vec![0.0, 1.0]),
    ];
    save_records(&path, &records).await?;
    Ok(path)
}

fn chat_reply() -> serde_json::Value {
    serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content":
            r#"{"what": "w", "key_functions": ["f"], "improvements": "i", "complexity": "c"}"#
        }}],
    })
}

#[tokio::test]
async fn engine_produces_pairs_and_reports() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let embeddings = write_embeddings(&dir).await.unwrap();

    let chat = ChatClient::new(ServiceConfig::new(server.uri(), "test-key"));
    let analysis = AnalysisEngine::new(chat, AnalyzeRunner::Local)
        .run(&embeddings)
        .await
        .unwrap();

    assert_eq!(analysis.runner, "local");

    // Only a.py and b.py share a direction above 0.8.
    assert_eq!(analysis.similar_pairs.len(), 1);
    assert_eq!(analysis.similar_pairs[0].file1, "a.py");
    assert_eq!(analysis.similar_pairs[0].file2, "b.py");

    assert_eq!(analysis.analyses.len(), 3);
    assert!(
        analysis
            .analyses
            .values()
            .all(|report| matches!(report, AnalysisReport::Parsed(_)))
    );
}

#[tokio::test]
async fn missing_embeddings_abort_before_any_remote_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let chat = ChatClient::new(ServiceConfig::new(server.uri(), "test-key"));
    let result = AnalysisEngine::new(chat, AnalyzeRunner::Local)
        .run(dir.path().join("nope.json"))
        .await;

    assert!(matches!(
        result,
        Err(AnalysisError::Embedding(EmbeddingError::StoreMissing(_)))
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn unparseable_replies_degrade_per_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "not json at all"}}],
            })),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let embeddings = write_embeddings(&dir).await.unwrap();

    let chat = ChatClient::new(ServiceConfig::new(server.uri(), "test-key"));
    let analysis = AnalysisEngine::new(chat, AnalyzeRunner::Local)
        .run(&embeddings)
        .await
        .unwrap();

    assert_eq!(analysis.analyses.len(), 3);
    for report in analysis.analyses.values() {
        assert_eq!(
            report,
            &AnalysisReport::Unparsed {
                raw: "not json at all".to_string()
            }
        );
    }
}

#[tokio::test]
async fn failed_calls_degrade_per_file_without_stopping() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let embeddings = write_embeddings(&dir).await.unwrap();

    let chat = ChatClient::new(ServiceConfig::new(server.uri(), "test-key"));
    let analysis = AnalysisEngine::new(chat, AnalyzeRunner::Local)
        .run(&embeddings)
        .await
        .unwrap();

    assert_eq!(analysis.analyses.len(), 3);
    for report in analysis.analyses.values() {
        let AnalysisReport::Unparsed { raw } = report else {
            panic!("expected a raw fallback report");
        };
        assert!(raw.starts_with("Error analyzing code: "));
    }
}

#[tokio::test]
async fn ray_without_workers_still_completes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let embeddings = write_embeddings(&dir).await.unwrap();

    let chat = ChatClient::new(ServiceConfig::new(server.uri(), "test-key"));
    let analysis = AnalysisEngine::new(chat, AnalyzeRunner::Ray)
        .run(&embeddings)
        .await
        .unwrap();

    // The artifact keeps the requested runner name.
    assert_eq!(analysis.runner, "ray");
    assert_eq!(analysis.analyses.len(), 3);
}

#[tokio::test]
async fn artifact_serializes_with_expected_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let embeddings = write_embeddings(&dir).await.unwrap();

    let chat = ChatClient::new(ServiceConfig::new(server.uri(), "test-key"));
    let analysis = AnalysisEngine::new(chat, AnalyzeRunner::Local)
        .run(&embeddings)
        .await
        .unwrap();

    let value = serde_json::to_value(&analysis).unwrap();
    assert_eq!(value["runner"], "local");
    assert!(value["similar_pairs"].is_array());
    assert_eq!(value["analyses"]["a.py"]["what"], "w");
}
