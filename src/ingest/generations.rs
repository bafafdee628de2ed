//! Generation Indexer: per-generation membership lists.
//!
//! Each generation folder (`generation_<index>`) holds an identifier list
//! with one entity per line. Listing an entity appends that generation
//! to its membership list. A folder must be processed once per run;
//! processing it again appends duplicate memberships.

use std::path::Path;

use tracing::{debug, info};

use crate::entity::{EntityId, RecordSet};
use crate::error::IngestError;
use crate::layout::ExperimentLayout;

use super::{file_name, read_text, sorted_entries};

/// Parses an identifier list: the first whitespace token of every
/// non-blank line.
///
/// # Errors
/// `MalformedRecord` if a token is not a positive integer.
pub fn parse_identifiers(text: &str, path: &Path) -> Result<Vec<EntityId>, IngestError> {
    let mut ids = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let Some(token) = line.split_whitespace().next() else {
            continue;
        };
        let id = token
            .parse::<EntityId>()
            .map_err(|e| IngestError::malformed_record(path, idx + 1, e.to_string()))?;
        ids.push(id);
    }
    Ok(ids)
}

/// Attaches generation membership from every folder under `dir`.
///
/// Entries that are not directories are ignored.
///
/// # Errors
/// - `Io` if a folder or identifier list cannot be read
/// - `MalformedFileName` if a folder name does not encode a generation
/// - `MalformedRecord` if an identifier does not parse
/// - `MissingEntity` if a listed entity has no descriptor record
pub fn attach_generations(
    mut records: RecordSet,
    dir: &Path,
    layout: &ExperimentLayout,
) -> Result<RecordSet, IngestError> {
    let mut folders = 0usize;
    let mut memberships = 0usize;

    for folder in sorted_entries(dir)? {
        if !folder.is_dir() {
            continue;
        }
        let generation = layout.generation_naming.generation(file_name(&folder)?)?;
        let list = folder.join(&layout.identifiers_file);
        let ids = parse_identifiers(&read_text(&list)?, &list)?;

        for id in &ids {
            let record = records
                .get_mut(*id)
                .ok_or_else(|| IngestError::MissingEntity {
                    id: *id,
                    origin: list.clone(),
                })?;
            record.push_generation(generation);
        }

        debug!(generation, members = ids.len(), "indexed generation");
        folders += 1;
        memberships += ids.len();
    }

    info!(generations = folders, memberships, "attached generation membership");
    Ok(records)
}
