//! Catalog blob storage boundary.
//!
//! The two reference documents live in object storage behind plain HTTP
//! GETs: a static master list, and a per-rotation vendor list keyed by the
//! most recent reset date.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use log::info;
use serde::Deserialize;

use crate::catalog::Catalogs;
use crate::catalog::error::CatalogError;
use crate::catalog::rotation;

const MASTER_CATALOG_KEY: &str = "master-shader-collectible-list.json";

/// Master catalog rows: collectible id -> `{ "hash": canonical item id }`.
#[derive(Debug, Deserialize)]
struct MasterEntry {
    hash: String,
}

/// Vendor catalog rows: canonical item id -> `{ "name": display name }`.
#[derive(Debug, Deserialize)]
struct VendorEntry {
    name: String,
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetches both reference maps for the rotation active at `now`.
    async fn load(&self, now: DateTime<Utc>) -> Result<Catalogs, CatalogError>;
}

pub struct HttpCatalogStore {
    client: reqwest::Client,
    pub base_url: String,
}

impl HttpCatalogStore {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    async fn fetch_document(&self, key: &str) -> Result<String, CatalogError> {
        let url = format!("{}/{}", self.base_url, key);
        let resp = self.client.get(&url).send().await?;

        if !resp.status().is_success() {
            return Err(CatalogError::UnexpectedStatus {
                key: key.to_string(),
                status: resp.status().as_u16(),
            });
        }

        let body = resp.text().await?;
        info!("downloaded catalog `{}` ({} bytes)", key, body.len());
        Ok(body)
    }

    fn vendor_key(now: DateTime<Utc>) -> String {
        let reset = rotation::previous_reset(now);
        format!("vendor-shaders/{}.json", reset.format("%Y-%m-%d"))
    }
}

#[async_trait]
impl CatalogStore for HttpCatalogStore {
    async fn load(&self, now: DateTime<Utc>) -> Result<Catalogs, CatalogError> {
        let master_body = self.fetch_document(MASTER_CATALOG_KEY).await?;
        let master_raw: HashMap<String, MasterEntry> = serde_json::from_str(&master_body)
            .map_err(|source| CatalogError::MalformedCatalog {
                key: MASTER_CATALOG_KEY.to_string(),
                source,
            })?;

        let vendor_key = Self::vendor_key(now);
        let vendor_body = self.fetch_document(&vendor_key).await?;
        let vendor_raw: HashMap<String, VendorEntry> = serde_json::from_str(&vendor_body)
            .map_err(|source| CatalogError::MalformedCatalog {
                key: vendor_key.clone(),
                source,
            })?;

        let catalogs = Catalogs {
            master: master_raw
                .into_iter()
                .map(|(collectible_id, entry)| (collectible_id, entry.hash))
                .collect(),
            vendor: vendor_raw
                .into_iter()
                .map(|(item_id, entry)| (item_id, entry.name))
                .collect(),
        };

        info!(
            "catalogs loaded: {} tracked collectibles, {} vendor items",
            catalogs.master.len(),
            catalogs.vendor.len()
        );
        Ok(catalogs)
    }
}
