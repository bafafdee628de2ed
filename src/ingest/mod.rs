//! Readers for the per-entity experiment files.
//!
//! Stages run in a fixed order, each consuming the [`RecordSet`] built by
//! the previous one:
//!
//! 1. [`merge_descriptors`] for phenotype, then behavioral descriptors
//! 2. [`attach_generations`] for generation membership
//! 3. [`attach_fitness`] for the fitness table
//!
//! Every file is opened, read fully and closed before the next one.
//!
//! [`RecordSet`]: crate::entity::RecordSet

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::IngestError;

pub mod descriptors;
pub mod fitness;
pub mod generations;
pub mod schedule;

pub use descriptors::{merge_descriptors, parse_descriptor, MergeMode};
pub use fitness::{attach_fitness, parse_fitness_table, FitnessRow};
pub use generations::{attach_generations, parse_identifiers};
pub use schedule::{read_weight_schedule, WeightSchedule};

fn read_text(path: &Path) -> Result<String, IngestError> {
    fs::read_to_string(path).map_err(|e| IngestError::io(path, e))
}

/// Lists directory entries sorted by path so runs are reproducible.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| IngestError::io(dir, e))? {
        let entry = entry.map_err(|e| IngestError::io(dir, e))?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> Result<&str, IngestError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| IngestError::MalformedFileName {
            name: path.display().to_string(),
            reason: "name is not valid UTF-8".to_string(),
        })
}
