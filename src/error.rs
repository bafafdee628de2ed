//! Error types for evostats.
//!
//! All errors are strongly typed using thiserror, one enum per pipeline
//! layer plus a top-level [`EvoError`] that wraps them. Every error is
//! fatal for the current run: the pipeline never hands a partially
//! populated table to the statistics layer.

use std::path::PathBuf;

use thiserror::Error;

use crate::entity::{EntityId, Generation};

/// Errors raised while reading experiment files into records.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed file name '{name}': {reason}")]
    MalformedFileName {
        name: String,
        reason: String,
    },

    #[error("Malformed record in {} at line {line}: {reason}", .path.display())]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Entity {id} referenced by {} has no base record", .origin.display())]
    MissingEntity {
        id: EntityId,
        origin: PathBuf,
    },

    #[error("Invalid layout {}: {reason}", .path.display())]
    InvalidLayout {
        path: PathBuf,
        reason: String,
    },
}

impl IngestError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed_record(
        path: impl Into<PathBuf>,
        line: usize,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedRecord {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}

/// Errors raised by table queries and derived-column construction.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Unknown column '{column}'")]
    UnknownColumn {
        column: String,
    },

    #[error("Entity {id} has no row")]
    UnknownEntity {
        id: EntityId,
    },

    #[error("Column '{column}' already exists")]
    DuplicateColumn {
        column: String,
    },

    #[error("Invalid parameter: {reason}")]
    InvalidParameter {
        reason: String,
    },
}

/// Errors raised while expanding or summarizing per-generation values.
#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Column '{column}' is not numeric (generation {generation}, entity {entity})")]
    NonNumericValue {
        column: String,
        generation: Generation,
        entity: EntityId,
    },

    #[error("Entity {entity} has no value in generation {generation}")]
    AbsentValue {
        generation: Generation,
        entity: EntityId,
    },

    #[error("Entity {entity} has non-finite value {value} in generation {generation}")]
    NonFiniteValue {
        generation: Generation,
        entity: EntityId,
        value: f64,
    },

    #[error("Generation series is ragged: {generations} generations, {entities} entities, {values} values")]
    RaggedSeries {
        generations: usize,
        entities: usize,
        values: usize,
    },

    #[error("Generation indices are not dense and zero-based: expected {expected}, found {found}")]
    UnsortedOrSparseGeneration {
        expected: Generation,
        found: Generation,
    },
}

impl StatsError {
    /// Returns true if this error reports a missing, non-finite or
    /// non-numeric value.
    ///
    /// All three are the "non-numeric value" condition of the summarizer
    /// contract; they differ only in where it was detected.
    #[must_use]
    pub const fn is_non_numeric(&self) -> bool {
        matches!(
            self,
            Self::NonNumericValue { .. } | Self::AbsentValue { .. } | Self::NonFiniteValue { .. }
        )
    }

    /// Returns the offending entity, if the error names one.
    #[must_use]
    pub const fn entity(&self) -> Option<EntityId> {
        match self {
            Self::NonNumericValue { entity, .. }
            | Self::AbsentValue { entity, .. }
            | Self::NonFiniteValue { entity, .. } => Some(*entity),
            _ => None,
        }
    }
}

/// Top-level error type for evostats.
#[derive(Debug, Error)]
pub enum EvoError {
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("Statistics error: {0}")]
    Stats(#[from] StatsError),

    #[error("Export error: {message}")]
    Export {
        message: String,
    },
}

impl EvoError {
    /// Creates an export error.
    #[must_use]
    pub fn export(message: impl Into<String>) -> Self {
        Self::Export {
            message: message.into(),
        }
    }

    /// Returns true if this is an ingest error.
    #[must_use]
    pub const fn is_ingest(&self) -> bool {
        matches!(self, Self::Ingest(_))
    }

    /// Returns true if this is a table error.
    #[must_use]
    pub const fn is_table(&self) -> bool {
        matches!(self, Self::Table(_))
    }

    /// Returns true if this is a statistics error.
    #[must_use]
    pub const fn is_stats(&self) -> bool {
        matches!(self, Self::Stats(_))
    }

    /// Returns the offending entity, if the error names one.
    #[must_use]
    pub const fn entity(&self) -> Option<EntityId> {
        match self {
            Self::Ingest(IngestError::MissingEntity { id, .. }) => Some(*id),
            Self::Stats(stats) => stats.entity(),
            _ => None,
        }
    }
}

impl From<std::io::Error> for EvoError {
    fn from(err: std::io::Error) -> Self {
        Self::export(err.to_string())
    }
}

impl From<serde_json::Error> for EvoError {
    fn from(err: serde_json::Error) -> Self {
        Self::export(err.to_string())
    }
}

/// Result type alias for evostats operations.
pub type EvoResult<T> = Result<T, EvoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_entity_names_id_and_source() {
        let err = IngestError::MissingEntity {
            id: EntityId::new(42).unwrap(),
            origin: PathBuf::from("generations/generation_3/identifiers.txt"),
        };
        let msg = format!("{err}");
        assert!(msg.contains("42"));
        assert!(msg.contains("generation_3"));
    }

    #[test]
    fn test_malformed_record_names_line() {
        let err = IngestError::malformed_record("fitness.csv", 7, "expected 2 fields");
        let msg = format!("{err}");
        assert!(msg.contains("fitness.csv"));
        assert!(msg.contains("line 7"));
    }

    #[test]
    fn test_sparse_generation_message() {
        let err = StatsError::UnsortedOrSparseGeneration { expected: 2, found: 5 };
        let msg = format!("{err}");
        assert!(msg.contains("expected 2"));
        assert!(msg.contains("found 5"));
    }

    #[test]
    fn test_non_numeric_predicate() {
        let absent = StatsError::AbsentValue {
            generation: 0,
            entity: EntityId::new(8).unwrap(),
        };
        assert!(absent.is_non_numeric());
        assert!(format!("{absent}").contains("Entity 8"));
        assert!(StatsError::NonFiniteValue {
            generation: 2,
            entity: EntityId::new(1).unwrap(),
            value: f64::INFINITY,
        }
        .is_non_numeric());
        assert!(!StatsError::RaggedSeries { generations: 1, entities: 1, values: 2 }.is_non_numeric());
    }

    #[test]
    fn test_evo_error_from_layers() {
        let ingest: EvoError = IngestError::MissingEntity {
            id: EntityId::new(3).unwrap(),
            origin: PathBuf::from("fitness.csv"),
        }
        .into();
        assert!(ingest.is_ingest());
        assert_eq!(ingest.entity(), EntityId::new(3));

        let table: EvoError = TableError::UnknownColumn { column: "x".to_string() }.into();
        assert!(table.is_table());
        assert_eq!(table.entity(), None);

        let stats: EvoError = StatsError::AbsentValue {
            generation: 1,
            entity: EntityId::new(5).unwrap(),
        }
        .into();
        assert!(stats.is_stats());
        assert_eq!(stats.entity(), EntityId::new(5));
    }

    #[test]
    fn test_export_error() {
        let err = EvoError::export("disk full");
        assert!(!err.is_ingest());
        assert!(format!("{err}").contains("disk full"));
    }
}
