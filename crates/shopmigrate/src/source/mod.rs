//! Source store boundary.

pub mod mongo;

use async_trait::async_trait;

use crate::error::Result;

pub use crate::document::Document;

/// Read-only contract against the document store.
///
/// The migration only ever scans whole collections; filtering and
/// pagination are not part of the contract, so a scan must be able to hold
/// an entire collection in memory.
#[async_trait]
pub trait SourceStore: Send + Sync {
    /// Connect and verify the store is reachable.
    async fn connect(&mut self) -> Result<()>;

    /// Fetch every record of a collection, in store order.
    async fn scan(&self, collection: &str) -> Result<Vec<Document>>;

    /// Release the connection. Safe to call when never connected.
    async fn close(&mut self) -> Result<()>;
}
