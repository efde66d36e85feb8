// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /api/verify

use ai_proof_vault::api::http_server::{create_app, AppState};
use ai_proof_vault::proof::ProofEngine;
use ai_proof_vault::storage::{ContentAddress, MemoryContentStore, SqliteIndex};
use ai_proof_vault::vision::registry::MOCK_SELECTORS;
use ai_proof_vault::vision::{MockVisionProvider, ProviderRegistry};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "verify-boundary";

fn upload(field: &str, image: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"img.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n",
        BOUNDARY, field
    )
    .into_bytes();
    body.extend_from_slice(image);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/verify")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn generate_request(image: &[u8]) -> Request<Body> {
    let mut request = upload("image", image);
    *request.uri_mut() = "/api/generate".parse().unwrap();
    request
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn setup() -> (Router, MemoryContentStore) {
    let provider = MockVisionProvider::with_description("a red circle").with_model("provider-x");
    let mut registry = ProviderRegistry::new("mock");
    registry.register(MOCK_SELECTORS, Arc::new(provider));
    let store = MemoryContentStore::new();

    let engine = ProofEngine::new(
        Arc::new(SqliteIndex::open_in_memory().unwrap()),
        Arc::new(registry),
        Arc::new(store.clone()),
    );
    (
        create_app(AppState::new(Arc::new(engine), 1024 * 1024)),
        store,
    )
}

#[tokio::test]
async fn test_generate_then_verify_round_trip() {
    let (app, _) = setup();

    let (status, generated) = call(&app, generate_request(b"IMG_A")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, verified) = call(&app, upload("image", b"IMG_A")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        verified,
        json!({
            "valid": true,
            "description": "a red circle",
            "model": "provider-x",
            "timestamp": generated["timestamp"],
            "address": generated["address"]
        })
    );
}

#[tokio::test]
async fn test_verify_unknown_image() {
    let (app, _) = setup();
    call(&app, generate_request(b"IMG_A")).await;

    let (status, verified) = call(&app, upload("image", b"IMG_B")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified, json!({"valid": false, "reason": "no_proof_found"}));
}

#[tokio::test]
async fn test_verify_with_store_outage() {
    let (app, store) = setup();
    let (_, generated) = call(&app, generate_request(b"IMG_A")).await;
    store.set_offline(true);

    let (status, verified) = call(&app, upload("image", b"IMG_A")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified["valid"], true);
    assert_eq!(verified["caveat"], "record_unavailable");
    assert_eq!(verified["address"], generated["address"]);
    assert!(verified.get("description").is_none());
    assert!(verified.get("reason").is_none());
}

#[tokio::test]
async fn test_verify_tampered_record() {
    let (app, store) = setup();
    let (_, generated) = call(&app, generate_request(b"IMG_A")).await;
    let address = ContentAddress::new(generated["address"].as_str().unwrap());
    store
        .tamper(&address, br#"{"fingerprint":"nope"}"#.to_vec())
        .await;

    let (status, verified) = call(&app, upload("image", b"IMG_A")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(verified["valid"], false);
    assert_eq!(verified["reason"], "hash_mismatch");
}

#[tokio::test]
async fn test_verify_without_image_is_400() {
    let (app, _) = setup();

    let (status, body) = call(&app, upload("photo", b"IMG_A")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "input_error");
}
