//! User phase: no dependencies, migrated second.

use chrono::Utc;
use tracing::debug;

use crate::dest::DestinationStore;
use crate::document::{self, Document};
use crate::error::Result;
use crate::idmap::{EntityKind, IdMap};
use crate::model::NewUser;
use crate::report::{MigrationReport, RecordError};
use crate::source::SourceStore;

/// Migrates every user document, recording an id mapping per success.
///
/// A duplicate email is rejected by the destination's unique constraint and
/// lands in the report as a per-record error; the loop continues.
///
/// # Errors
///
/// Only scan failures propagate.
pub async fn run(
    source: &dyn SourceStore,
    dest: &dyn DestinationStore,
    ids: &mut IdMap,
    report: &mut MigrationReport,
) -> Result<()> {
    let docs = source.scan(EntityKind::User.collection()).await?;
    let bar = super::phase_progress_bar(docs.len() as u64, "users");

    for doc in &docs {
        let source_id = document::id_of(doc);
        match migrate_one(dest, doc).await {
            Ok(dest_id) => {
                report.users_migrated += 1;
                ids.insert(EntityKind::User, &source_id, dest_id);
                bar.inc(1);
                if report.users_migrated % super::PROGRESS_EVERY == 0 {
                    debug!(migrated = report.users_migrated, "users migrated so far");
                }
            }
            Err(e) => {
                report
                    .errors
                    .push(RecordError::record(EntityKind::User, source_id, e));
            }
        }
    }

    bar.finish_and_clear();
    Ok(())
}

async fn migrate_one(dest: &dyn DestinationStore, doc: &Document) -> Result<String> {
    let user = to_user(doc)?;
    dest.insert_user(&user).await
}

/// Converts a loose user document into its typed destination shape.
/// A missing `createdAt` defaults to the migration time.
fn to_user(doc: &Document) -> Result<NewUser> {
    let address = match doc.get("address") {
        Some(value) if value.is_object() => Some(serde_json::from_value(value.clone())?),
        _ => None,
    };

    Ok(NewUser {
        name: document::require_str(doc, "name")?,
        email: document::require_str(doc, "email")?,
        age: document::opt_i64(doc, "age").and_then(|v| i32::try_from(v).ok()),
        address,
        created_at: document::datetime(doc, "createdAt").unwrap_or_else(Utc::now),
    })
}
