//! The optional cache tier sitting in front of the generative service.
//!
//! Everything here is an optimization. Callers treat both `Ok(None)` and
//! `Err(_)` as a miss.
use crate::errors::{GatewayError, GatewayResult};
use crate::ingestion::llm::reqwest_client;
use async_trait::async_trait;
use fridge::FridgeScan;
use serde::Deserialize;
use serde_json::json;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheTier: Send + Sync {
    async fn lookup_scan(&self, hash: String) -> GatewayResult<Option<FridgeScan>>;
    async fn store_scan(&self, hash: String, scan: FridgeScan) -> GatewayResult<()>;
    async fn lookup_image(&self, id: String) -> GatewayResult<Option<String>>;
    async fn store_image(&self, id: String, url: String) -> GatewayResult<()>;
}

#[async_trait]
impl CacheTier for Box<dyn CacheTier> {
    async fn lookup_scan(&self, hash: String) -> GatewayResult<Option<FridgeScan>> {
        (**self).lookup_scan(hash).await
    }
    async fn store_scan(&self, hash: String, scan: FridgeScan) -> GatewayResult<()> {
        (**self).store_scan(hash, scan).await
    }
    async fn lookup_image(&self, id: String) -> GatewayResult<Option<String>> {
        (**self).lookup_image(id).await
    }
    async fn store_image(&self, id: String, url: String) -> GatewayResult<()> {
        (**self).store_image(id, url).await
    }
}

/// Used when no cache tier is configured: every lookup misses, every store succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

#[async_trait]
impl CacheTier for NoCache {
    async fn lookup_scan(&self, _hash: String) -> GatewayResult<Option<FridgeScan>> {
        Ok(None)
    }
    async fn store_scan(&self, _hash: String, _scan: FridgeScan) -> GatewayResult<()> {
        Ok(())
    }
    async fn lookup_image(&self, _id: String) -> GatewayResult<Option<String>> {
        Ok(None)
    }
    async fn store_image(&self, _id: String, _url: String) -> GatewayResult<()> {
        Ok(())
    }
}

#[derive(Deserialize)]
struct ScanLookup {
    #[serde(default)]
    success: bool,
    data: Option<FridgeScan>,
}

#[derive(Deserialize)]
struct ImageLookup {
    url: Option<String>,
}

/// Talks to a cache server over its small JSON API.
#[derive(Debug, Clone)]
pub struct HttpCacheTier {
    base_url: String,
}

impl HttpCacheTier {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post(&self, route: &str, body: serde_json::Value) -> GatewayResult<reqwest::Response> {
        let response = reqwest_client
            .post(format!("{}/{}", self.base_url, route))
            .json(&body)
            .send()
            .await?;
        Ok(response)
    }
}

fn undecodable(e: reqwest::Error) -> GatewayError {
    GatewayError::Cache(format!("Undecodable cache response: {e}"))
}

#[async_trait]
impl CacheTier for HttpCacheTier {
    async fn lookup_scan(&self, hash: String) -> GatewayResult<Option<FridgeScan>> {
        let response = self.post("get-recipes", json!({ "hash": hash })).await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let lookup: ScanLookup = response.json().await.map_err(undecodable)?;
        Ok(lookup.data.filter(|_| lookup.success))
    }

    async fn store_scan(&self, hash: String, scan: FridgeScan) -> GatewayResult<()> {
        let response = self
            .post("save-recipes", json!({ "hash": hash, "data": scan }))
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(GatewayError::Cache(format!(
                "save-recipes returned {}",
                response.status()
            )))
        }
    }

    async fn lookup_image(&self, id: String) -> GatewayResult<Option<String>> {
        let response = reqwest_client
            .get(format!("{}/get-image", self.base_url))
            .query(&[("id", &id)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Ok(None);
        }
        let lookup: ImageLookup = response.json().await.map_err(undecodable)?;
        Ok(lookup.url.filter(|url| !url.is_empty()))
    }

    async fn store_image(&self, id: String, url: String) -> GatewayResult<()> {
        let response = self
            .post("upload-image", json!({ "id": id, "image": url }))
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(GatewayError::Cache(format!(
                "upload-image returned {}",
                response.status()
            )))
        }
    }
}
