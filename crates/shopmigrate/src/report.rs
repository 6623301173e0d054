//! Reconciliation report accumulated across a run.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::idmap::EntityKind;

/// What a report entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorTag {
    /// A product record failed.
    Product,
    /// A user record failed.
    User,
    /// An order record failed.
    Order,
    /// The run itself failed; remaining phases were skipped.
    Fatal,
}

impl From<EntityKind> for ErrorTag {
    fn from(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Product => Self::Product,
            EntityKind::User => Self::User,
            EntityKind::Order => Self::Order,
        }
    }
}

impl fmt::Display for ErrorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Product => write!(f, "Product"),
            Self::User => write!(f, "User"),
            Self::Order => write!(f, "Order"),
            Self::Fatal => write!(f, "Fatal"),
        }
    }
}

/// One failed record, tagged with what it was and where it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordError {
    /// Entity kind, or [`ErrorTag::Fatal`] for run-level failures.
    pub tag: ErrorTag,
    /// Source identifier of the failed record; absent for fatal entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
    /// Human-readable failure reason.
    pub message: String,
}

impl RecordError {
    /// Entry for a single failed record.
    pub fn record(kind: EntityKind, source_id: impl Into<String>, error: impl fmt::Display) -> Self {
        Self {
            tag: kind.into(),
            source_id: Some(source_id.into()),
            message: error.to_string(),
        }
    }

    /// Entry for a run-level failure.
    pub fn fatal(error: impl fmt::Display) -> Self {
        Self {
            tag: ErrorTag::Fatal,
            source_id: None,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source_id {
            Some(id) => write!(f, "{} {}: {}", self.tag, id, self.message),
            None => write!(f, "{}: {}", self.tag, self.message),
        }
    }
}

/// Counts and errors accumulated across a migration run.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Products written to the destination store.
    pub products_migrated: u64,
    /// Users written to the destination store.
    pub users_migrated: u64,
    /// Orders written to the destination store.
    pub orders_migrated: u64,
    /// One entry per failed record, in processing order.
    pub errors: Vec<RecordError>,
    /// Wall-clock duration of the run in seconds.
    pub duration_secs: f64,
}

impl MigrationReport {
    /// Total records written across all phases.
    #[must_use]
    pub fn total_migrated(&self) -> u64 {
        self.products_migrated + self.users_migrated + self.orders_migrated
    }

    /// True when the run hit a fatal condition and skipped phases.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.errors.iter().any(|e| e.tag == ErrorTag::Fatal)
    }

    /// Process exit code: `0` clean, `1` completed with record errors,
    /// `2` fatal.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.is_fatal() {
            2
        } else if self.errors.is_empty() {
            0
        } else {
            1
        }
    }

    /// Dumps the error list as a JSON artifact, replacing any file left by a
    /// previous run.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_errors_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.errors)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), count = self.errors.len(), "wrote error report");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_error_display() {
        let err = RecordError::record(EntityKind::User, "abc123", "duplicate email");
        assert_eq!(err.to_string(), "User abc123: duplicate email");

        let fatal = RecordError::fatal("connection refused");
        assert_eq!(fatal.to_string(), "Fatal: connection refused");
    }

    #[test]
    fn test_exit_codes() {
        let mut report = MigrationReport::default();
        assert_eq!(report.exit_code(), 0);

        report
            .errors
            .push(RecordError::record(EntityKind::Product, "x", "bad price"));
        assert_eq!(report.exit_code(), 1);
        assert!(!report.is_fatal());

        report.errors.push(RecordError::fatal("source unreachable"));
        assert_eq!(report.exit_code(), 2);
        assert!(report.is_fatal());
    }

    #[test]
    fn test_total_migrated() {
        let report = MigrationReport {
            products_migrated: 2,
            users_migrated: 1,
            orders_migrated: 1,
            ..Default::default()
        };
        assert_eq!(report.total_migrated(), 4);
    }

    #[test]
    fn test_write_errors_file_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.json");

        let mut report = MigrationReport::default();
        report
            .errors
            .push(RecordError::record(EntityKind::Order, "o1", "no products array"));
        report.write_errors_file(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<RecordError> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].source_id.as_deref(), Some("o1"));

        // A later run with no errors replaces the artifact.
        let clean = MigrationReport::default();
        clean.write_errors_file(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<RecordError> = serde_json::from_str(&content).unwrap();
        assert!(parsed.is_empty());
    }
}
