//! Fitness Attacher: the flat `identifier,value` table.

use std::path::Path;

use tracing::info;

use crate::entity::{EntityId, RecordSet};
use crate::error::IngestError;
use crate::layout::ExperimentLayout;

use super::read_text;

/// One parsed row of the fitness table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitnessRow {
    /// Entity the row refers to.
    pub id: EntityId,
    /// `None` when the row carries the "no fitness" sentinel.
    pub fitness: Option<f64>,
}

/// Parses a comma-delimited fitness table.
///
/// Blank lines are skipped and fields are trimmed. Only the first two
/// fields are read; trailing fields are ignored. A value equal to
/// `sentinel` yields a row with no fitness.
///
/// # Errors
/// `MalformedRecord` if a row has fewer than two fields, the identifier
/// does not parse, or the value is not a finite number.
pub fn parse_fitness_table(
    text: &str,
    path: &Path,
    sentinel: &str,
) -> Result<Vec<FitnessRow>, IngestError> {
    let mut rows = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_no = idx + 1;
        let mut fields = line.split(',');
        let (Some(raw_id), Some(raw_value)) = (fields.next(), fields.next()) else {
            return Err(IngestError::malformed_record(path, line_no, "expected 'identifier,value'"));
        };

        let id = raw_id
            .parse::<EntityId>()
            .map_err(|e| IngestError::malformed_record(path, line_no, e.to_string()))?;
        let raw_value = raw_value.trim();
        let fitness = if raw_value == sentinel {
            None
        } else {
            let value = raw_value
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| {
                    IngestError::malformed_record(
                        path,
                        line_no,
                        format!("fitness '{raw_value}' is not a finite number"),
                    )
                })?;
            Some(value)
        };
        rows.push(FitnessRow { id, fitness });
    }
    Ok(rows)
}

/// Attaches fitness values from `path` to existing records.
///
/// Sentinel rows leave the entity without a fitness value.
///
/// # Errors
/// - `Io` if the table cannot be read
/// - `MalformedRecord` if a row does not parse
/// - `MissingEntity` if a row names an entity with no record
pub fn attach_fitness(
    mut records: RecordSet,
    path: &Path,
    layout: &ExperimentLayout,
) -> Result<RecordSet, IngestError> {
    let rows = parse_fitness_table(&read_text(path)?, path, &layout.fitness_sentinel)?;

    let mut set = 0usize;
    let mut skipped = 0usize;
    for row in rows {
        let record = records
            .get_mut(row.id)
            .ok_or_else(|| IngestError::MissingEntity {
                id: row.id,
                origin: path.to_path_buf(),
            })?;
        match row.fitness {
            Some(value) => {
                record.fitness = Some(value);
                set += 1;
            }
            None => skipped += 1,
        }
    }

    info!(set, skipped, "attached fitness");
    Ok(records)
}
