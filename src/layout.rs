//! Experiment directory layout.
//!
//! Every path the pipeline reads is relative to an experiment root. The
//! defaults reproduce the directory convention written by the evolution
//! runs; a layout can also be loaded from JSON where any missing key
//! falls back to its default.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EvoResult, IngestError};
use crate::naming::NamingConvention;

/// Paths and naming rules for one experiment directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentLayout {
    /// Phenotype descriptor files, one per entity.
    pub phenotype_dir: PathBuf,
    /// Behavioral descriptor files, one per entity.
    pub behavioral_dir: PathBuf,
    /// Parent folder of the per-generation folders.
    pub generations_dir: PathBuf,
    /// Membership list inside each generation folder.
    pub identifiers_file: String,
    /// Flat `identifier,value` fitness table.
    pub fitness_file: PathBuf,
    /// Optional per-generation weight schedule.
    pub schedule_file: PathBuf,
    /// Extension (without the dot) of descriptor files; others are ignored.
    pub descriptor_extension: String,
    /// Fitness value marking "no fitness recorded".
    pub fitness_sentinel: String,
    /// How descriptor file names encode the entity identifier.
    pub entity_naming: NamingConvention,
    /// How generation folder names encode the generation number.
    pub generation_naming: NamingConvention,
}

impl Default for ExperimentLayout {
    fn default() -> Self {
        Self {
            phenotype_dir: PathBuf::from("data_fullevolution/descriptors"),
            behavioral_dir: PathBuf::from("data_fullevolution/descriptors/behavioural"),
            generations_dir: PathBuf::from("generations"),
            identifiers_file: "identifiers.txt".to_string(),
            fitness_file: PathBuf::from("data_fullevolution/fitness.csv"),
            schedule_file: PathBuf::from("data_fullevolution/alphas.csv"),
            descriptor_extension: "txt".to_string(),
            fitness_sentinel: "None".to_string(),
            entity_naming: NamingConvention::entity_files(),
            generation_naming: NamingConvention::generation_folders(),
        }
    }
}

impl ExperimentLayout {
    /// Loads a layout from a JSON file.
    ///
    /// # Errors
    /// `Ingest(Io)` if the file cannot be opened, `Ingest(InvalidLayout)`
    /// if it is not valid layout JSON.
    pub fn from_json_file(path: &Path) -> EvoResult<Self> {
        let file = File::open(path).map_err(|e| IngestError::io(path, e))?;
        let layout: Self =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| IngestError::InvalidLayout {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        Ok(layout)
    }

    /// Resolves every path against an experiment root.
    #[must_use]
    pub fn resolve(&self, root: &Path) -> ResolvedLayout {
        ResolvedLayout {
            root: root.to_path_buf(),
            phenotype_dir: root.join(&self.phenotype_dir),
            behavioral_dir: root.join(&self.behavioral_dir),
            generations_dir: root.join(&self.generations_dir),
            fitness_file: root.join(&self.fitness_file),
            schedule_file: root.join(&self.schedule_file),
        }
    }
}

/// Absolute (root-joined) paths of one experiment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLayout {
    /// Experiment root.
    pub root: PathBuf,
    /// See [`ExperimentLayout::phenotype_dir`].
    pub phenotype_dir: PathBuf,
    /// See [`ExperimentLayout::behavioral_dir`].
    pub behavioral_dir: PathBuf,
    /// See [`ExperimentLayout::generations_dir`].
    pub generations_dir: PathBuf,
    /// See [`ExperimentLayout::fitness_file`].
    pub fitness_file: PathBuf,
    /// See [`ExperimentLayout::schedule_file`].
    pub schedule_file: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    #[test]
    fn default_layout_matches_experiment_convention() {
        let layout = ExperimentLayout::default();
        let resolved = layout.resolve(Path::new("data/exp/1"));
        assert_eq!(
            resolved.behavioral_dir,
            PathBuf::from("data/exp/1/data_fullevolution/descriptors/behavioural")
        );
        assert_eq!(
            resolved.fitness_file,
            PathBuf::from("data/exp/1/data_fullevolution/fitness.csv")
        );
        assert_eq!(layout.fitness_sentinel, "None");
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        let mut file = File::create(&path).unwrap();
        write!(
            file,
            r#"{{"fitness_file": "fit.csv", "entity_naming": {{"kind": "pattern", "pattern": "^r(\\d+)$"}}}}"#
        )
        .unwrap();

        let layout = ExperimentLayout::from_json_file(&path).unwrap();
        assert_eq!(layout.fitness_file, PathBuf::from("fit.csv"));
        assert_eq!(layout.generations_dir, PathBuf::from("generations"));
        assert_eq!(layout.entity_naming.entity_id("r5").unwrap().get(), 5);
    }

    #[test]
    fn invalid_json_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.json");
        std::fs::write(&path, "not json").unwrap();
        let err = ExperimentLayout::from_json_file(&path).unwrap_err();
        assert!(err.is_ingest());
        assert!(matches!(
            err,
            crate::EvoError::Ingest(IngestError::InvalidLayout { ref path, .. }) if path.ends_with("layout.json")
        ));
        assert!(format!("{err}").contains("Invalid layout"));
    }

    #[test]
    fn missing_layout_file_is_io_error() {
        let err = ExperimentLayout::from_json_file(Path::new("/nonexistent/layout.json")).unwrap_err();
        assert!(err.is_ingest());
    }
}
