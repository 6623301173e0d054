//! Migration orchestration: connection lifecycle and phase sequencing.

use std::time::Instant;

use tracing::{error, info, warn};

use crate::config::MigrationConfig;
use crate::dest::postgres::PostgresStore;
use crate::dest::DestinationStore;
use crate::error::Result;
use crate::idmap::IdMap;
use crate::phases;
use crate::report::{MigrationReport, RecordError};
use crate::source::mongo::MongoStore;
use crate::source::SourceStore;

/// Drives the three migration phases against a pair of stores.
///
/// Phase order is a hard invariant: orders reference both product and user
/// keys, so those mappings must be complete before the order phase starts.
pub struct Pipeline {
    source: Box<dyn SourceStore>,
    dest: Box<dyn DestinationStore>,
}

impl Pipeline {
    /// Builds a pipeline over explicit store implementations.
    #[must_use]
    pub fn new(source: Box<dyn SourceStore>, dest: Box<dyn DestinationStore>) -> Self {
        Self { source, dest }
    }

    /// Builds a pipeline against the real stores described by the
    /// configuration.
    #[must_use]
    pub fn from_config(config: &MigrationConfig) -> Self {
        let source = MongoStore::new(config.source.clone(), config.options.batch_size);
        let dest = PostgresStore::new(config.destination.clone());
        Self::new(Box::new(source), Box::new(dest))
    }

    /// Runs the migration to completion and returns the reconciliation
    /// report.
    ///
    /// Never fails: a fatal condition (a store refusing to connect, or an
    /// error escaping a phase) is recorded as a single `Fatal` entry and
    /// the partial report accumulated so far is returned. Both stores are
    /// released on every exit path.
    pub async fn run(mut self) -> MigrationReport {
        let start = Instant::now();
        let mut report = MigrationReport::default();
        let mut ids = IdMap::new();

        if let Err(e) = self.execute(&mut ids, &mut report).await {
            error!(error = %e, "fatal migration error");
            report.errors.push(RecordError::fatal(e));
        }

        if let Err(e) = self.source.close().await {
            warn!(error = %e, "failed to close source store");
        }
        if let Err(e) = self.dest.close().await {
            warn!(error = %e, "failed to close destination store");
        }

        report.duration_secs = start.elapsed().as_secs_f64();
        info!(
            products = report.products_migrated,
            users = report.users_migrated,
            orders = report.orders_migrated,
            errors = report.errors.len(),
            "migration finished in {:.2}s",
            report.duration_secs
        );

        report
    }

    async fn execute(&mut self, ids: &mut IdMap, report: &mut MigrationReport) -> Result<()> {
        info!("connecting to source and destination stores");
        self.source.connect().await?;
        self.dest.connect().await?;

        info!("migrating products");
        phases::product::run(self.source.as_ref(), self.dest.as_ref(), ids, report).await?;

        info!("migrating users");
        phases::user::run(self.source.as_ref(), self.dest.as_ref(), ids, report).await?;

        info!(mappings = ids.len(), "migrating orders");
        phases::order::run(self.source.as_ref(), self.dest.as_ref(), ids, report).await?;

        Ok(())
    }
}
