//! MongoDB Data API client.
//!
//! Reads collections over the hosted Data API (REST), so the tool does not
//! need a wire-protocol driver. A full scan is a paged sequence of `find`
//! calls; the pages are stitched back together before any record is
//! transformed.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::source::{Document, SourceStore};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Request body for a Data API `find` operation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FindRequest {
    data_source: String,
    database: String,
    collection: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    skip: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u64>,
}

/// Response from a Data API `find` operation.
#[derive(Debug, Deserialize)]
struct FindResponse {
    documents: Vec<Document>,
}

/// Document-store client speaking the Data API.
pub struct MongoStore {
    config: SourceConfig,
    batch_size: usize,
    client: Client,
    connected: bool,
}

impl MongoStore {
    /// Creates a client with a configured HTTP transport. `batch_size` is
    /// the page size used when scanning a collection.
    #[must_use]
    pub fn new(config: SourceConfig, batch_size: usize) -> Self {
        Self {
            config,
            batch_size: batch_size.max(1),
            client: create_http_client(),
            connected: false,
        }
    }

    fn build_url(&self, action: &str) -> String {
        format!(
            "{}/action/{}",
            self.config.data_api_url.trim_end_matches('/'),
            action
        )
    }

    async fn find(&self, collection: &str, skip: u64, limit: u64) -> Result<Vec<Document>> {
        let request = FindRequest {
            data_source: self.config.data_source.clone(),
            database: self.config.database.clone(),
            collection: collection.to_string(),
            skip: Some(skip),
            limit: Some(limit),
        };

        let response = self
            .client
            .post(self.build_url("find"))
            .header("Content-Type", "application/json")
            .header("api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::SourceConnection(format!("Data API request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(http_error(status, &body));
        }

        let parsed: FindResponse = response
            .json()
            .await
            .map_err(|e| Error::Extraction(format!("failed to parse Data API response: {e}")))?;
        Ok(parsed.documents)
    }
}

fn create_http_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

fn http_error(status: u16, body: &str) -> Error {
    match status {
        429 => Error::RateLimit(60),
        401 | 403 => Error::Authentication(format!("Data API auth failed: {body}")),
        _ => Error::SourceConnection(format!("Data API error {status}: {body}")),
    }
}

#[async_trait]
impl SourceStore for MongoStore {
    async fn connect(&mut self) -> Result<()> {
        // Probe the endpoint with a minimal find; an empty collection is a
        // valid answer, only transport and auth failures matter here.
        self.find("products", 0, 1).await?;
        self.connected = true;
        Ok(())
    }

    async fn scan(&self, collection: &str) -> Result<Vec<Document>> {
        if !self.connected {
            return Err(Error::SourceConnection("not connected".to_string()));
        }

        let limit = self.batch_size as u64;
        let mut documents = Vec::new();
        let mut skip = 0u64;

        loop {
            let page = self.find(collection, skip, limit).await?;
            let fetched = page.len() as u64;
            documents.extend(page);
            if fetched < limit {
                break;
            }
            skip += fetched;
        }

        debug!(collection, count = documents.len(), "collection scan complete");
        Ok(documents)
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        Ok(())
    }
}

#[cfg(test)]
#[path = "mongo_tests.rs"]
mod tests;
