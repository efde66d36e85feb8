// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Storage bridge HTTP client
//!
//! Talks to a storage gateway that fronts a decentralized content-addressed
//! network (e.g. a Filecoin warm-storage SDK running as a sidecar).
//!
//! ```text
//! Vault (this) → HTTP → Storage bridge → storage provider network
//! ```
//!
//! Bridge API:
//! - `POST /pieces` (octet-stream body) → `{"pieceCid": "..."}`
//! - `GET /pieces/{cid}` → raw bytes, 404 when unknown
//! - `GET /health`
//!
//! The target network is sent in the `X-Store-Network` header. Account
//! funding and service approval happen out of band before the vault starts.

use async_trait::async_trait;
use anyhow::bail;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::content_store::{ContentAddress, ContentStore, StoreError};
use crate::config::{StoreConfig, StoreNetwork};

const NETWORK_HEADER: &str = "X-Store-Network";

#[derive(Debug, serde::Deserialize)]
struct PutResponse {
    #[serde(rename = "pieceCid", alias = "cid", default)]
    piece_cid: Option<String>,
}

#[derive(Clone, Debug)]
pub struct StoreBridgeClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    network: StoreNetwork,
}

impl StoreBridgeClient {
    pub fn new(config: &StoreConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = Url::parse(&config.url)?;
        if base_url.cannot_be_a_base() {
            bail!("store URL '{}' cannot carry a path", config.url);
        }

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
            network: config.network,
        })
    }

    /// Base URL plus path segments, each percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let builder = builder.header(NETWORK_HEADER, self.network.as_str());
        match self.api_key {
            Some(ref key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    fn transport_error(e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Unavailable("request timed out".to_string())
        } else {
            StoreError::Unavailable(e.to_string())
        }
    }
}

/// Map a non-success status on `put`
fn put_status_error(status: StatusCode, body: &str) -> StoreError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            StoreError::Unavailable(format!("authentication rejected ({})", status))
        }
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            StoreError::Unavailable(format!("{} - {}", status, body))
        }
        _ => StoreError::WriteFailure(format!("{} - {}", status, body)),
    }
}

/// Map a non-success status on `get`
fn get_status_error(status: StatusCode, address: &ContentAddress, body: &str) -> StoreError {
    match status {
        StatusCode::NOT_FOUND | StatusCode::GONE => StoreError::Miss(address.to_string()),
        _ => StoreError::Unavailable(format!("{} - {}", status, body)),
    }
}

fn parse_put_response(body: &str) -> Result<ContentAddress, StoreError> {
    let parsed: PutResponse = serde_json::from_str(body).map_err(|e| {
        StoreError::WriteFailure(format!("unparseable bridge response '{}': {}", body, e))
    })?;

    parsed
        .piece_cid
        .filter(|cid| !cid.is_empty())
        .map(ContentAddress::new)
        .ok_or_else(|| {
            StoreError::WriteFailure(format!("bridge did not return an address: '{}'", body))
        })
}

#[async_trait]
impl ContentStore for StoreBridgeClient {
    async fn put(&self, data: Vec<u8>) -> Result<ContentAddress, StoreError> {
        let size = data.len();
        let url = self.endpoint(&["pieces"]);
        let start_time = std::time::Instant::now();

        debug!("[STORE-HTTP] POST {} ({} bytes, network={})", url, size, self.network.as_str());

        let response = self
            .request(self.client.post(url))
            .header("Content-Type", "application/octet-stream")
            .body(data)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("[STORE-HTTP] upload failed: status={}, body='{}'", status, body);
            return Err(put_status_error(status, &body));
        }

        // Accepted but unreadable reply: outcome unknown
        let body = response.text().await.map_err(Self::transport_error)?;

        let address = parse_put_response(&body)?;
        info!(
            "[STORE-HTTP] uploaded {} bytes in {}ms: {}",
            size,
            start_time.elapsed().as_millis(),
            address
        );
        Ok(address)
    }

    async fn get(&self, address: &ContentAddress) -> Result<Vec<u8>, StoreError> {
        let url = self.endpoint(&["pieces", address.as_str()]);
        debug!("[STORE-HTTP] GET {}", url);

        let response = self
            .request(self.client.get(url))
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("[STORE-HTTP] download failed: status={}, address={}", status, address);
            return Err(get_status_error(status, address, &body));
        }

        let content = response.bytes().await.map_err(Self::transport_error)?;
        Ok(content.to_vec())
    }

    async fn health(&self) -> Result<(), StoreError> {
        let url = self.endpoint(&["health"]);
        let response = self
            .request(self.client.get(url))
            .send()
            .await
            .map_err(Self::transport_error)?;

        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "health check failed with status: {}",
                response.status()
            )));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "bridge"
    }
}
