//! Destination store boundary.

pub mod postgres;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{NewOrder, NewProduct, NewUser, UserRecord};

/// Save/find contract against the relational store.
///
/// Inserts return the primary key generated by the store; the migration
/// never supplies destination identifiers itself. Schema definition and
/// constraint enforcement (including the unique index on user email) are
/// the store's concern.
#[async_trait]
pub trait DestinationStore: Send + Sync {
    /// Connect and make sure the destination is ready to accept records.
    async fn connect(&mut self) -> Result<()>;

    /// Insert one product, returning its generated primary key.
    async fn insert_product(&self, product: &NewProduct) -> Result<String>;

    /// Insert one user, returning its generated primary key.
    async fn insert_user(&self, user: &NewUser) -> Result<String>;

    /// Insert one order, returning its generated primary key.
    async fn insert_order(&self, order: &NewOrder) -> Result<String>;

    /// Find a user by primary key. `Ok(None)` when the row does not exist.
    async fn find_user(&self, id: &str) -> Result<Option<UserRecord>>;

    /// Release the connection. Safe to call when never connected.
    async fn close(&mut self) -> Result<()>;
}
