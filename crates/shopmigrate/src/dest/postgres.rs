//! PostgreSQL destination store backed by sqlx.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

use crate::config::DestinationConfig;
use crate::dest::DestinationStore;
use crate::error::{Error, Result};
use crate::model::{NewOrder, NewProduct, NewUser, UserRecord};

/// Destination tables, created on connect when absent. Primary keys are
/// generated by the database; `users.email` carries the unique constraint
/// that surfaces duplicate source emails as per-record errors.
const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS products (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name TEXT NOT NULL,
    price DOUBLE PRECISION NOT NULL,
    category TEXT NOT NULL,
    in_stock BOOLEAN NOT NULL,
    tags TEXT[] NOT NULL DEFAULT '{}'
);

CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    age INTEGER,
    address JSONB,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS orders (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID REFERENCES users(id),
    items JSONB NOT NULL,
    total DOUBLE PRECISION NOT NULL,
    status TEXT NOT NULL,
    order_date TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

/// Relational store client.
pub struct PostgresStore {
    config: DestinationConfig,
    pool: Option<PgPool>,
}

impl PostgresStore {
    /// Creates a client; no connection is made until [`DestinationStore::connect`].
    #[must_use]
    pub fn new(config: DestinationConfig) -> Self {
        Self { config, pool: None }
    }

    fn pool(&self) -> Result<&PgPool> {
        self.pool
            .as_ref()
            .ok_or_else(|| Error::DestinationConnection("not connected".to_string()))
    }

    fn parse_key(id: &str) -> Result<Uuid> {
        Uuid::parse_str(id)
            .map_err(|e| Error::Load(format!("invalid destination key '{id}': {e}")))
    }
}

#[async_trait]
impl DestinationStore for PostgresStore {
    async fn connect(&mut self) -> Result<()> {
        let pool = PgPoolOptions::new()
            .max_connections(self.config.max_connections)
            .connect(&self.config.connection_string)
            .await
            .map_err(|e| Error::DestinationConnection(format!("PostgreSQL connect failed: {e}")))?;

        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|e| Error::DestinationConnection(format!("schema bootstrap failed: {e}")))?;
        debug!("destination schema ready");

        self.pool = Some(pool);
        Ok(())
    }

    async fn insert_product(&self, product: &NewProduct) -> Result<String> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO products (name, price, category, in_stock, tags) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.category)
        .bind(product.in_stock)
        .bind(&product.tags)
        .fetch_one(self.pool()?)
        .await
        .map_err(|e| Error::Load(e.to_string()))?;

        Ok(id.to_string())
    }

    async fn insert_user(&self, user: &NewUser) -> Result<String> {
        let address = user.address.as_ref().map(serde_json::to_value).transpose()?;

        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO users (name, email, age, address, created_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.age)
        .bind(address)
        .bind(user.created_at)
        .fetch_one(self.pool()?)
        .await
        .map_err(|e| Error::Load(e.to_string()))?;

        Ok(id.to_string())
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<String> {
        let user_id = order
            .user_id
            .as_deref()
            .map(Self::parse_key)
            .transpose()?;
        let items = serde_json::to_value(&order.items)?;

        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO orders (user_id, items, total, status, order_date) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(user_id)
        .bind(items)
        .bind(order.total)
        .bind(&order.status)
        .bind(order.order_date)
        .fetch_one(self.pool()?)
        .await
        .map_err(|e| Error::Load(e.to_string()))?;

        Ok(id.to_string())
    }

    async fn find_user(&self, id: &str) -> Result<Option<UserRecord>> {
        // A key that does not parse cannot name a row.
        let Ok(key) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let row = sqlx::query("SELECT id, name, email FROM users WHERE id = $1")
            .bind(key)
            .fetch_optional(self.pool()?)
            .await
            .map_err(|e| Error::Load(e.to_string()))?;

        Ok(row.map(|r| UserRecord {
            id: r.get::<Uuid, _>("id").to_string(),
            name: r.get("name"),
            email: r.get("email"),
        }))
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(pool) = self.pool.take() {
            pool.close().await;
        }
        Ok(())
    }
}
