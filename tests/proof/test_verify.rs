// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Verify path: every outcome of the verdict, including degraded ones

use ai_proof_vault::proof::{ProofEngine, ProofRecord, VerifyOutcome};
use ai_proof_vault::storage::{
    ContentStore, IndexEntry, LocalIndex, MemoryContentStore, SqliteIndex, StoreError,
};
use ai_proof_vault::vision::registry::MOCK_SELECTORS;
use ai_proof_vault::vision::{Description, MockVisionProvider, ProviderRegistry};
use ai_proof_vault::Fingerprint;
use std::sync::Arc;

fn setup() -> (ProofEngine, SqliteIndex, MemoryContentStore) {
    let provider = MockVisionProvider::with_description("a red circle").with_model("provider-x");
    let mut registry = ProviderRegistry::new("mock");
    registry.register(MOCK_SELECTORS, Arc::new(provider));

    let index = SqliteIndex::open_in_memory().unwrap();
    let store = MemoryContentStore::new();
    let engine = ProofEngine::new(
        Arc::new(index.clone()),
        Arc::new(registry),
        Arc::new(store.clone()),
    );
    (engine, index, store)
}

#[tokio::test]
async fn test_round_trip_confirms_same_fields() {
    let (engine, _, _) = setup();
    let proof = engine.generate(b"IMG_A", None).await.unwrap();

    let outcome = engine.verify(b"IMG_A").await.unwrap();
    assert_eq!(
        outcome,
        VerifyOutcome::Confirmed {
            fingerprint: Fingerprint::of(b"IMG_A"),
            address: proof.address,
            description: "a red circle".to_string(),
            model: "provider-x".to_string(),
            timestamp: proof.timestamp,
        }
    );
}

#[tokio::test]
async fn test_unknown_image_has_no_proof() {
    let (engine, _, store) = setup();
    engine.generate(b"IMG_A", None).await.unwrap();

    let outcome = engine.verify(b"IMG_B").await.unwrap();
    assert_eq!(
        outcome,
        VerifyOutcome::NoProofFound {
            fingerprint: Fingerprint::of(b"IMG_B")
        }
    );
    assert!(!outcome.is_valid());
    assert_eq!(store.get_count(), 0);
}

#[tokio::test]
async fn test_single_byte_change_is_a_different_image() {
    let (engine, _, _) = setup();
    engine.generate(b"IMG_A", None).await.unwrap();

    let outcome = engine.verify(b"IMG_a").await.unwrap();
    assert!(matches!(outcome, VerifyOutcome::NoProofFound { .. }));
}

#[tokio::test]
async fn test_store_outage_is_valid_but_unconfirmed() {
    let (engine, _, store) = setup();
    let proof = engine.generate(b"IMG_A", None).await.unwrap();
    store.set_offline(true);

    let outcome = engine.verify(b"IMG_A").await.unwrap();
    assert!(outcome.is_valid());
    assert!(!outcome.is_confirmed());
    match outcome {
        VerifyOutcome::RecordUnavailable {
            address,
            indexed_at,
            cause,
            ..
        } => {
            assert_eq!(address, proof.address);
            assert_eq!(indexed_at, proof.timestamp);
            assert!(matches!(cause, StoreError::Unavailable(_)));
        }
        other => panic!("expected RecordUnavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_expired_record_is_valid_but_unconfirmed() {
    let (engine, _, store) = setup();
    let proof = engine.generate(b"IMG_A", None).await.unwrap();
    store.evict(&proof.address).await;

    match engine.verify(b"IMG_A").await.unwrap() {
        VerifyOutcome::RecordUnavailable { cause, .. } => {
            assert!(matches!(cause, StoreError::Miss(_)));
        }
        other => panic!("expected RecordUnavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_record_for_other_image_is_mismatch() {
    let (engine, _, store) = setup();
    let proof = engine.generate(b"IMG_A", None).await.unwrap();

    let foreign = ProofRecord::new(
        Fingerprint::of(b"IMG_B"),
        Description {
            description: "a blue square".to_string(),
            model: "provider-x".to_string(),
        },
        proof.timestamp,
    );
    store
        .tamper(&proof.address, foreign.to_bytes().unwrap())
        .await;

    let outcome = engine.verify(b"IMG_A").await.unwrap();
    assert_eq!(
        outcome,
        VerifyOutcome::HashMismatch {
            fingerprint: Fingerprint::of(b"IMG_A"),
            address: proof.address,
        }
    );
    assert!(!outcome.is_valid());
}

#[tokio::test]
async fn test_corrupt_record_is_mismatch() {
    let (engine, _, store) = setup();
    let proof = engine.generate(b"IMG_A", None).await.unwrap();
    store.tamper(&proof.address, vec![0xff, 0x00, 0x13]).await;

    assert!(matches!(
        engine.verify(b"IMG_A").await.unwrap(),
        VerifyOutcome::HashMismatch { .. }
    ));
}

#[tokio::test]
async fn test_legacy_record_confirms() {
    let (engine, index, store) = setup();
    let fingerprint = Fingerprint::of(b"IMG_OLD");
    let legacy = serde_json::json!({
        "image_hash": fingerprint.as_str(),
        "description": "an old photo",
        "model": "gpt-4o-mini",
        "timestamp": 1_690_000_000,
        "vault_version": "0.1.0"
    });
    let address = store
        .put(serde_json::to_vec(&legacy).unwrap())
        .await
        .unwrap();
    index
        .upsert(IndexEntry {
            fingerprint: fingerprint.clone(),
            address: address.clone(),
            created_at: 1_690_000_000,
        })
        .await
        .unwrap();

    match engine.verify(b"IMG_OLD").await.unwrap() {
        VerifyOutcome::Confirmed {
            description,
            model,
            timestamp,
            ..
        } => {
            assert_eq!(description, "an old photo");
            assert_eq!(model, "gpt-4o-mini");
            assert_eq!(timestamp, 1_690_000_000);
        }
        other => panic!("expected Confirmed, got {:?}", other),
    }
}
