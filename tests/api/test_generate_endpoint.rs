// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /api/generate and the service endpoints

use ai_proof_vault::api::http_server::{create_app, AppState, BANNER};
use ai_proof_vault::proof::ProofEngine;
use ai_proof_vault::storage::{
    ContentStore, IndexEntry, IndexError, LocalIndex, MemoryContentStore, SqliteIndex,
};
use ai_proof_vault::vision::registry::MOCK_SELECTORS;
use ai_proof_vault::vision::{MockVisionProvider, ProviderRegistry, VisionError};
use ai_proof_vault::Fingerprint;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

const BOUNDARY: &str = "vault-test-boundary";

fn multipart(image: Option<&[u8]>, model: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(image) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"img.png\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY
            )
            .as_bytes(),
        );
        body.extend_from_slice(image);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(model) = model {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"model\"\r\n\r\n{}\r\n",
                BOUNDARY, model
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn post(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

struct TestApp {
    app: Router,
    provider: MockVisionProvider,
    store: MemoryContentStore,
}

fn test_app_with_index(index: Arc<dyn LocalIndex>, max_image_bytes: usize) -> TestApp {
    let provider = MockVisionProvider::with_description("a red circle").with_model("provider-x");
    let mut registry = ProviderRegistry::new("mock");
    registry.register(MOCK_SELECTORS, Arc::new(provider.clone()));
    let store = MemoryContentStore::new();

    let engine = ProofEngine::new(index, Arc::new(registry), Arc::new(store.clone()));
    let app = create_app(AppState::new(Arc::new(engine), max_image_bytes));
    TestApp {
        app,
        provider,
        store,
    }
}

fn test_app() -> TestApp {
    test_app_with_index(Arc::new(SqliteIndex::open_in_memory().unwrap()), 1024 * 1024)
}

/// Index whose writes always fail
struct FailingIndex;

#[async_trait]
impl LocalIndex for FailingIndex {
    async fn upsert(&self, _entry: IndexEntry) -> Result<(), IndexError> {
        Err(IndexError::Task("database is locked".to_string()))
    }

    async fn lookup(&self, _fingerprint: &Fingerprint) -> Result<Option<IndexEntry>, IndexError> {
        Ok(None)
    }

    async fn count(&self) -> Result<u64, IndexError> {
        Ok(0)
    }
}

#[tokio::test]
async fn test_root_banner() {
    let t = test_app();
    let response = t
        .app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], BANNER.as_bytes());
}

#[tokio::test]
async fn test_health_reports_index_and_store() {
    let t = test_app();
    let response = t
        .app
        .clone()
        .oneshot(post("/api/generate", multipart(Some(b"IMG_A"), None)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    t.store.set_offline(true);
    let response = t
        .app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["index_entries"], 1);
    assert_eq!(json["default_provider"], "mock");
    assert_eq!(json["version"]["version"], ai_proof_vault::version::VERSION_NUMBER);
    assert_eq!(json["version"]["build"], ai_proof_vault::version::VERSION);
    assert_eq!(json["version"]["record_schema"], "0.1.0");
    assert!(json["version"]["features"]
        .as_array()
        .unwrap()
        .iter()
        .any(|f| f == "sqlite-index"));
    assert!(json["store"].as_str().unwrap().starts_with("unavailable"));
}

#[tokio::test]
async fn test_generate_returns_proof() {
    let t = test_app();
    let response = t
        .app
        .oneshot(post("/api/generate", multipart(Some(b"IMG_A"), None)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["description"], "a red circle");
    assert_eq!(json["model"], "provider-x");
    assert!(json["timestamp"].as_i64().unwrap() > 0);
    assert!(json["address"].as_str().unwrap().starts_with("mem://"));
    assert_eq!(t.provider.calls(), 1);
}

#[tokio::test]
async fn test_generate_without_image_is_400() {
    let t = test_app();
    let response = t
        .app
        .oneshot(post("/api/generate", multipart(None, Some("mock"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error_type"], "input_error");
    assert!(json["request_id"].is_string());
    assert_eq!(t.provider.calls(), 0);
    assert_eq!(t.store.put_count(), 0);
}

#[tokio::test]
async fn test_generate_with_empty_image_is_400() {
    let t = test_app();
    let response = t
        .app
        .oneshot(post("/api/generate", multipart(Some(b""), None)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(t.provider.calls(), 0);
}

#[tokio::test]
async fn test_generate_unknown_model_is_400() {
    let t = test_app();
    let response = t
        .app
        .oneshot(post("/api/generate", multipart(Some(b"IMG_A"), Some("dall-e"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error_type"], "unsupported_provider");
    assert_eq!(json["message"], "Unsupported model: dall-e");
    let available = json["details"]["available_models"].as_array().unwrap();
    assert!(available.iter().any(|m| m == "mock"));
    assert_eq!(t.provider.calls(), 0);
    assert_eq!(t.store.put_count(), 0);
}

#[tokio::test]
async fn test_generate_provider_failure_is_500() {
    let t = test_app();
    t.provider
        .inject_error(VisionError::failure("mock", "HTTP 503"))
        .await;

    let response = t
        .app
        .oneshot(post("/api/generate", multipart(Some(b"IMG_A"), None)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = json_body(response).await;
    assert_eq!(json["error_type"], "provider_failure");
    assert_eq!(json["details"]["provider"], "mock");
    assert_eq!(t.store.put_count(), 0);
}

#[tokio::test]
async fn test_generate_store_outage_is_500() {
    let t = test_app();
    t.store.set_offline(true);

    let response = t
        .app
        .oneshot(post("/api/generate", multipart(Some(b"IMG_A"), None)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(response).await["error_type"], "store_unavailable");
}

#[tokio::test]
async fn test_generate_index_failure_reports_address() {
    let t = test_app_with_index(Arc::new(FailingIndex), 1024 * 1024);

    let response = t
        .app
        .oneshot(post("/api/generate", multipart(Some(b"IMG_A"), None)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = json_body(response).await;
    assert_eq!(json["error_type"], "index_persist_failure");
    assert_eq!(
        json["details"]["fingerprint"],
        Fingerprint::of(b"IMG_A").as_str()
    );

    let address = json["details"]["address"].as_str().unwrap();
    let stored = t.store.get(&address.into()).await.unwrap();
    assert!(!stored.is_empty());
}

#[tokio::test]
async fn test_generate_oversized_image_is_rejected() {
    let t = test_app_with_index(Arc::new(SqliteIndex::open_in_memory().unwrap()), 16);

    let response = t
        .app
        .oneshot(post("/api/generate", multipart(Some(&[7u8; 64]), None)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json_body(response).await["error_type"], "input_error");
    assert_eq!(t.provider.calls(), 0);
}

#[tokio::test]
async fn test_generate_oversized_unknown_part_is_413() {
    let t = test_app_with_index(Arc::new(SqliteIndex::open_in_memory().unwrap()), 100);

    let mut body = format!(
        "--{}\r\nContent-Disposition: form-data; name=\"junk\"\r\n\r\n",
        BOUNDARY
    )
    .into_bytes();
    body.extend_from_slice(&vec![b'x'; 200 * 1024]);
    body.extend_from_slice(b"\r\n");
    // Reuse the image part and closing boundary from the standard form
    body.extend_from_slice(&multipart(Some(b"IMG_A"), None));

    let response = t.app.oneshot(post("/api/generate", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let json = json_body(response).await;
    assert_eq!(json["error_type"], "input_error");
    assert_eq!(json["details"]["limit_bytes"], 100);
    assert_eq!(t.provider.calls(), 0);
}

#[tokio::test]
async fn test_generate_image_at_limit_is_accepted() {
    let t = test_app_with_index(Arc::new(SqliteIndex::open_in_memory().unwrap()), 100);

    let response = t
        .app
        .oneshot(post(
            "/api/generate",
            multipart(Some(&[9u8; 100]), Some("  MOCK ")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(t.provider.calls(), 1);
}
