//! Order phase: migrated last, resolves references recorded by the earlier
//! phases.
//!
//! Two foreign keys are resolved per record under missing-data uncertainty.
//! A user reference that cannot be resolved degrades to no reference; a
//! product reference that cannot be resolved is carried through as the raw
//! source id. Neither counts as a migration error; only store failures do.

use chrono::Utc;
use tracing::{debug, warn};

use crate::dest::DestinationStore;
use crate::document::{self, Document};
use crate::error::{Error, Result};
use crate::idmap::{EntityKind, IdMap};
use crate::model::{NewOrder, OrderItem};
use crate::report::{MigrationReport, RecordError};
use crate::source::SourceStore;

/// Migrates every order document. Runs only after the product and user
/// mappings are complete.
///
/// # Errors
///
/// Only scan failures propagate; individual record failures are collected
/// into the report and the loop continues.
pub async fn run(
    source: &dyn SourceStore,
    dest: &dyn DestinationStore,
    ids: &IdMap,
    report: &mut MigrationReport,
) -> Result<()> {
    let docs = source.scan(EntityKind::Order.collection()).await?;
    let bar = super::phase_progress_bar(docs.len() as u64, "orders");

    for doc in &docs {
        let source_id = document::id_of(doc);
        match migrate_one(dest, ids, doc).await {
            Ok(_) => {
                report.orders_migrated += 1;
                bar.inc(1);
                if report.orders_migrated % super::PROGRESS_EVERY == 0 {
                    debug!(migrated = report.orders_migrated, "orders migrated so far");
                }
            }
            Err(e) => {
                report
                    .errors
                    .push(RecordError::record(EntityKind::Order, source_id, e));
            }
        }
    }

    bar.finish_and_clear();
    Ok(())
}

async fn migrate_one(
    dest: &dyn DestinationStore,
    ids: &IdMap,
    doc: &Document,
) -> Result<String> {
    let order = NewOrder {
        user_id: resolve_user(dest, ids, doc).await?,
        items: resolve_items(ids, doc)?,
        total: document::require_f64(doc, "total")?,
        status: document::require_str(doc, "status")?,
        order_date: document::datetime(doc, "orderDate").unwrap_or_else(Utc::now),
    };
    dest.insert_order(&order).await
}

/// Maps the source user reference to a destination key.
///
/// An order without a user, an unmapped user id, and a mapping whose row no
/// longer exists all degrade to no reference. Only store failures propagate.
async fn resolve_user(
    dest: &dyn DestinationStore,
    ids: &IdMap,
    doc: &Document,
) -> Result<Option<String>> {
    let Some(source_user) = doc.get("userId").and_then(document::ref_id) else {
        return Ok(None);
    };

    let Some(mapped) = ids.get(EntityKind::User, &source_user) else {
        warn!(user = %source_user, "no id mapping for order user, storing order without user");
        return Ok(None);
    };

    match dest.find_user(mapped).await? {
        Some(user) => Ok(Some(user.id)),
        None => {
            warn!(user = %mapped, "mapped user not found in destination, storing order without user");
            Ok(None)
        }
    }
}

/// Rewrites line items against the product mapping. An unmapped product id
/// is carried through verbatim rather than dropping the item.
fn resolve_items(ids: &IdMap, doc: &Document) -> Result<Vec<OrderItem>> {
    let items = doc
        .get("products")
        .and_then(|v| v.as_array())
        .ok_or_else(|| Error::Transform("order has no products array".to_string()))?;

    items
        .iter()
        .map(|item| {
            let source_product = item
                .get("productId")
                .and_then(document::ref_id)
                .ok_or_else(|| Error::Transform("line item has no productId".to_string()))?;

            let product_id = match ids.get(EntityKind::Product, &source_product) {
                Some(mapped) => mapped.to_string(),
                None => {
                    warn!(product = %source_product, "no id mapping for line item product, keeping source id");
                    source_product
                }
            };

            Ok(OrderItem {
                product_id,
                quantity: item.get("quantity").and_then(|v| v.as_i64()).unwrap_or(0),
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "order_tests.rs"]
mod tests;
