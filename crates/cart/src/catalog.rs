//! Read-only access to flower metadata and live stock.
//!
//! The catalog is the source of truth for names, images, unit prices and the
//! available quantity; the cart only ever reads it, re-fetching per add or
//! render. A fetch failure must block the add - the cart never bypasses stock
//! validation.

use std::future::Future;
use std::sync::Arc;

use petal_market_core::{FlowerId, Price};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Flower metadata as served by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: FlowerId,
    pub name: String,
    /// Image file name, resolved against the shop's static image directory.
    pub image: String,
    pub unit_price: Price,
    /// Available stock at fetch time.
    pub quantity: u32,
}

/// Error fetching or decoding catalog data.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("flower {0} not found")]
    NotFound(FlowerId),

    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("catalog response could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read-only fetch of catalog entries.
///
/// No caching contract: each call may hit the collaborator directly.
pub trait CatalogClient: Send + Sync {
    /// Fetch a single flower by id.
    fn flower(
        &self,
        id: FlowerId,
    ) -> impl Future<Output = Result<CatalogEntry, CatalogError>> + Send;

    /// Fetch the full flower list.
    fn flowers(&self) -> impl Future<Output = Result<Vec<CatalogEntry>, CatalogError>> + Send;
}

/// Catalog client over the shop's JSON API.
///
/// Hits `GET {base_url}/api/flower/{id}` and `GET {base_url}/api/flowers`.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    inner: Arc<HttpCatalogClientInner>,
}

#[derive(Debug)]
struct HttpCatalogClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalogClient {
    /// Create a new catalog client for the given shop base URL.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            inner: Arc::new(HttpCatalogClientInner {
                client: reqwest::Client::new(),
                base_url: base_url.trim_end_matches('/').to_string(),
            }),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        not_found: Option<FlowerId>,
    ) -> Result<T, CatalogError> {
        let url = format!("{}{path}", self.inner.base_url);
        let response = self.inner.client.get(&url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND
            && let Some(id) = not_found
        {
            return Err(CatalogError::NotFound(id));
        }
        if !status.is_success() {
            return Err(CatalogError::Status(status));
        }

        // Read as text first for better parse diagnostics.
        let body = response.text().await?;
        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %body.chars().take(200).collect::<String>(),
                    "failed to parse catalog response"
                );
                Err(CatalogError::Parse(e))
            }
        }
    }
}

impl CatalogClient for HttpCatalogClient {
    fn flower(
        &self,
        id: FlowerId,
    ) -> impl Future<Output = Result<CatalogEntry, CatalogError>> + Send {
        async move { self.get_json(&format!("/api/flower/{id}"), Some(id)).await }
    }

    fn flowers(&self) -> impl Future<Output = Result<Vec<CatalogEntry>, CatalogError>> + Send {
        async move { self.get_json("/api/flowers", None).await }
    }
}
