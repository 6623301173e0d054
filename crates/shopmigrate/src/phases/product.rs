//! Product phase: no dependencies, migrated first.

use tracing::debug;

use crate::dest::DestinationStore;
use crate::document::{self, Document};
use crate::error::Result;
use crate::idmap::{EntityKind, IdMap};
use crate::model::NewProduct;
use crate::report::{MigrationReport, RecordError};
use crate::source::SourceStore;

/// Migrates every product document, recording an id mapping per success for
/// the order phase to resolve against.
///
/// # Errors
///
/// Only scan failures propagate; individual record failures are collected
/// into the report and the loop continues.
pub async fn run(
    source: &dyn SourceStore,
    dest: &dyn DestinationStore,
    ids: &mut IdMap,
    report: &mut MigrationReport,
) -> Result<()> {
    let docs = source.scan(EntityKind::Product.collection()).await?;
    let bar = super::phase_progress_bar(docs.len() as u64, "products");

    for doc in &docs {
        let source_id = document::id_of(doc);
        match migrate_one(dest, doc).await {
            Ok(dest_id) => {
                report.products_migrated += 1;
                ids.insert(EntityKind::Product, &source_id, dest_id);
                bar.inc(1);
                if report.products_migrated % super::PROGRESS_EVERY == 0 {
                    debug!(migrated = report.products_migrated, "products migrated so far");
                }
            }
            Err(e) => {
                report
                    .errors
                    .push(RecordError::record(EntityKind::Product, source_id, e));
            }
        }
    }

    bar.finish_and_clear();
    Ok(())
}

async fn migrate_one(dest: &dyn DestinationStore, doc: &Document) -> Result<String> {
    let product = to_product(doc)?;
    dest.insert_product(&product).await
}

/// Converts a loose product document into its typed destination shape.
/// Missing `tags` becomes an empty list; the scalar fields are required.
fn to_product(doc: &Document) -> Result<NewProduct> {
    Ok(NewProduct {
        name: document::require_str(doc, "name")?,
        price: document::require_f64(doc, "price")?,
        category: document::require_str(doc, "category")?,
        in_stock: document::require_bool(doc, "inStock")?,
        tags: document::string_array(doc, "tags"),
    })
}
