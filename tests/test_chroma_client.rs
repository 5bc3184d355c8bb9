use docvec::domain::entities::collection::CollectionHandle;
use docvec::domain::entities::document::DocumentRecords;
use docvec::domain::error::DomainError;
use docvec::domain::ports::vector_engine::VectorEngine;
use docvec::domain::values::metadata::Metadata;
use docvec::infrastructure::chroma::client::ChromaClient;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn handle() -> CollectionHandle {
    CollectionHandle {
        id: "c0ffee".into(),
        name: "documents".into(),
        metadata: Metadata::new(),
    }
}

#[tokio::test]
async fn test_heartbeat_ok() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/heartbeat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"nanosecond heartbeat": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let client = ChromaClient::new(&server.uri());
    client.heartbeat().await.unwrap();
    assert_eq!(client.endpoint(), server.uri());
}

#[tokio::test]
async fn test_heartbeat_unreachable() {
    let client = ChromaClient::new("http://127.0.0.1:1");
    let err = client.heartbeat().await.unwrap_err();
    assert!(matches!(err, DomainError::EngineUnavailable(_)));
}

#[tokio::test]
async fn test_heartbeat_server_error_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/heartbeat"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = ChromaClient::new(&server.uri()).heartbeat().await.unwrap_err();
    assert!(matches!(err, DomainError::EngineUnavailable(_)));
}

#[tokio::test]
async fn test_get_or_create_collection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/collections"))
        .and(body_partial_json(json!({
            "name": "documents",
            "get_or_create": true,
            "metadata": {"description": "document vector store"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "c0ffee",
            "name": "documents",
            "metadata": {"description": "document vector store"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let meta: Metadata = json!({"description": "document vector store"})
        .as_object()
        .cloned()
        .unwrap();
    let handle = ChromaClient::new(&server.uri())
        .get_or_create_collection("documents", &meta)
        .await
        .unwrap();
    assert_eq!(handle.id, "c0ffee");
    assert_eq!(handle.metadata["description"], "document vector store");
}

#[tokio::test]
async fn test_add_error_body_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/collections/c0ffee/add"))
        .respond_with(
            ResponseTemplate::new(500).set_body_string("Embedding dimension 3 does not match collection dimensionality 1536"),
        )
        .mount(&server)
        .await;

    let records = DocumentRecords {
        ids: vec!["a".into()],
        embeddings: vec![vec![0.1, 0.2, 0.3]],
        documents: vec!["text".into()],
        metadatas: vec![Metadata::new()],
    };
    let err = ChromaClient::new(&server.uri())
        .add(&handle(), records)
        .await
        .unwrap_err();
    match err {
        DomainError::EngineWrite(msg) => assert!(msg.contains("does not match collection dimensionality")),
        other => panic!("expected EngineWrite, got {other:?}"),
    }
}

#[tokio::test]
async fn test_get_fills_missing_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/collections/c0ffee/get"))
        .and(body_partial_json(json!({"ids": ["a", "b"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ids": ["a", "b"],
            "documents": ["first", null],
            "metadatas": [{"source": "x"}, null]
        })))
        .mount(&server)
        .await;

    let ids = vec!["a".to_string(), "b".to_string()];
    let batch = ChromaClient::new(&server.uri())
        .get(&handle(), Some(ids.as_slice()))
        .await
        .unwrap();
    assert_eq!(batch.ids, ids);
    assert_eq!(batch.documents, vec!["first".to_string(), String::new()]);
    assert_eq!(batch.metadatas[0]["source"], "x");
    assert!(batch.metadatas[1].is_empty());
}

#[tokio::test]
async fn test_query_sends_filter_and_decodes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/collections/c0ffee/query"))
        .and(body_partial_json(json!({
            "n_results": 2,
            "where": {"source": "bakery"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ids": [["pie", "cake"]],
            "documents": [["apple pie", "apple cake"]],
            "metadatas": [[{"source": "bakery"}, {"source": "bakery"}]],
            "distances": [[0.12, 0.4]],
            "embeddings": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let filter = json!({"source": "bakery"});
    let raw = ChromaClient::new(&server.uri())
        .query(&handle(), &[vec![0.5, 0.5]], 2, Some(&filter))
        .await
        .unwrap();
    assert_eq!(raw.ids, vec![vec!["pie".to_string(), "cake".to_string()]]);
    let distances = raw.distances.unwrap();
    assert_eq!(distances[0][0], Some(0.12));
}

#[tokio::test]
async fn test_query_malformed_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/collections/c0ffee/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = ChromaClient::new(&server.uri())
        .query(&handle(), &[vec![0.5]], 1, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Parse(_)));
}

#[tokio::test]
async fn test_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/collections/c0ffee/count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(7)))
        .mount(&server)
        .await;

    assert_eq!(ChromaClient::new(&server.uri()).count(&handle()).await.unwrap(), 7);
}

#[tokio::test]
async fn test_delete_sends_ids() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/collections/c0ffee/delete"))
        .and(body_partial_json(json!({"ids": ["gone"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    ChromaClient::new(&server.uri())
        .delete(&handle(), &["gone".to_string()])
        .await
        .unwrap();
}
