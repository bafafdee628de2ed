//! Record Merger: per-entity descriptor files.
//!
//! A descriptor file holds whitespace-delimited `name value` lines. The
//! entity identifier is encoded in the file name. Sources are merged in
//! sequence, so a later source (behavioral) adds fields to and overrides
//! colliding fields of an earlier one (phenotype).

use std::path::Path;

use tracing::{debug, info};

use crate::entity::RecordSet;
use crate::error::IngestError;
use crate::layout::ExperimentLayout;

use super::{file_name, read_text, sorted_entries};

/// How to treat a descriptor file whose entity has no record yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    /// Create the record on first encounter.
    #[default]
    CreateMissing,
    /// Fail with `MissingEntity`; the source may only extend known entities.
    RequireExisting,
}

/// Parses the body of one descriptor file.
///
/// Lines with fewer than two tokens (blank lines, stray trailing
/// whitespace) are skipped; tokens after the value are ignored.
///
/// # Errors
/// `MalformedRecord` if a value token is not a finite number.
pub fn parse_descriptor(text: &str, path: &Path) -> Result<Vec<(String, f64)>, IngestError> {
    let mut fields = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let mut tokens = line.split_whitespace();
        let (Some(name), Some(raw)) = (tokens.next(), tokens.next()) else {
            continue;
        };
        let value = raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| {
                IngestError::malformed_record(
                    path,
                    idx + 1,
                    format!("value '{raw}' of '{name}' is not a finite number"),
                )
            })?;
        fields.push((name.to_string(), value));
    }
    Ok(fields)
}

/// Merges every descriptor file in `dir` into `records`.
///
/// Only regular files with the layout's descriptor extension are read;
/// subdirectories and other files are ignored.
///
/// # Errors
/// - `Io` if the directory or a file cannot be read
/// - `MalformedFileName` if a file name does not encode an identifier
/// - `MalformedRecord` if a line does not parse
/// - `MissingEntity` under [`MergeMode::RequireExisting`] for an unknown entity
pub fn merge_descriptors(
    mut records: RecordSet,
    dir: &Path,
    layout: &ExperimentLayout,
    mode: MergeMode,
) -> Result<RecordSet, IngestError> {
    let mut merged = 0usize;
    let mut fields_seen = 0usize;

    for path in sorted_entries(dir)? {
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(layout.descriptor_extension.as_str()) {
            debug!(path = %path.display(), "skipping non-descriptor file");
            continue;
        }

        let id = layout.entity_naming.entity_id(file_name(&path)?)?;
        let fields = parse_descriptor(&read_text(&path)?, &path)?;
        fields_seen += fields.len();

        let record = match mode {
            MergeMode::CreateMissing => records.entry(id),
            MergeMode::RequireExisting => records
                .get_mut(id)
                .ok_or_else(|| IngestError::MissingEntity {
                    id,
                    origin: path.clone(),
                })?,
        };
        record.merge_fields(fields);
        merged += 1;
        debug!(entity = %id, path = %path.display(), "merged descriptor file");
    }

    info!(
        dir = %dir.display(),
        files = merged,
        fields = fields_seen,
        entities = records.len(),
        "merged descriptors"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use crate::entity::EntityId;

    fn id(raw: u64) -> EntityId {
        EntityId::new(raw).unwrap()
    }

    #[test]
    fn parse_skips_short_lines() {
        let text = "average_height 0.07\n\nbranching 3\n   \nlonely\n";
        let fields = parse_descriptor(text, Path::new("d.txt")).unwrap();
        assert_eq!(
            fields,
            vec![("average_height".to_string(), 0.07), ("branching".to_string(), 3.0)]
        );
    }

    #[test]
    fn parse_tolerates_trailing_whitespace_and_extra_tokens() {
        let fields = parse_descriptor("speed 1.5   \nsize 2 extra\n", Path::new("d.txt")).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1], ("size".to_string(), 2.0));
    }

    #[test]
    fn parse_rejects_non_numeric_value() {
        let err = parse_descriptor("a 1\nb two\n", Path::new("d.txt")).unwrap_err();
        match err {
            IngestError::MalformedRecord { line, reason, .. } => {
                assert_eq!(line, 2);
                assert!(reason.contains("two"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn parse_rejects_non_finite_values() {
        for raw in ["nan", "NaN", "inf", "-infinity"] {
            let err = parse_descriptor(&format!("speed 1\naverage_height {raw}\n"), Path::new("d.txt"))
                .unwrap_err();
            assert!(
                matches!(err, IngestError::MalformedRecord { line: 2, .. }),
                "{raw} accepted"
            );
        }
    }

    #[test]
    fn second_source_adds_and_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let pheno = dir.path().join("pheno");
        let behave = dir.path().join("behave");
        fs::create_dir_all(&pheno).unwrap();
        fs::create_dir_all(&behave).unwrap();
        fs::write(pheno.join("phenotype_desc_1.txt"), "a 1\nshared 10\n").unwrap();
        fs::write(behave.join("behavior_desc_1.txt"), "b 2\nshared 20\n\n").unwrap();

        let layout = ExperimentLayout::default();
        let records =
            merge_descriptors(RecordSet::new(), &pheno, &layout, MergeMode::CreateMissing).unwrap();
        let records = merge_descriptors(records, &behave, &layout, MergeMode::CreateMissing).unwrap();

        let record = records.get(id(1)).unwrap();
        assert_eq!(record.field("a"), Some(1.0));
        assert_eq!(record.field("b"), Some(2.0));
        assert_eq!(record.field("shared"), Some(20.0));
    }

    #[test]
    fn ignores_other_extensions_and_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("phenotype_desc_4.txt"), "a 1\n").unwrap();
        fs::write(dir.path().join("notes.md"), "hello\n").unwrap();
        fs::create_dir_all(dir.path().join("behavioural")).unwrap();

        let records = merge_descriptors(
            RecordSet::new(),
            dir.path(),
            &ExperimentLayout::default(),
            MergeMode::CreateMissing,
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        assert!(records.contains(id(4)));
    }

    #[test]
    fn require_existing_rejects_unknown_entity() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("behavior_desc_9.txt"), "a 1\n").unwrap();

        let err = merge_descriptors(
            RecordSet::new(),
            dir.path(),
            &ExperimentLayout::default(),
            MergeMode::RequireExisting,
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::MissingEntity { id: got, .. } if got == id(9)));
    }

    #[test]
    fn malformed_file_name_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("descriptor.txt"), "a 1\n").unwrap();

        let err = merge_descriptors(
            RecordSet::new(),
            dir.path(),
            &ExperimentLayout::default(),
            MergeMode::CreateMissing,
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::MalformedFileName { .. }));
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = merge_descriptors(
            RecordSet::new(),
            &dir.path().join("absent"),
            &ExperimentLayout::default(),
            MergeMode::CreateMissing,
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::Io { .. }));
    }
}
