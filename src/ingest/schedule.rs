//! Weight-schedule table (`generation,line_weight,height_weight`).
//!
//! The core pipeline does not use these values; they are read for the
//! plotting layer, which draws them next to the generation statistics.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::entity::Generation;
use crate::error::IngestError;

use super::read_text;

/// Per-generation fitness weights, as parallel sequences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightSchedule {
    /// Generation of each row.
    pub generations: Vec<Generation>,
    /// Weight of the line-following objective.
    pub line_weight: Vec<f64>,
    /// Weight of the height objective.
    pub height_weight: Vec<f64>,
}

impl WeightSchedule {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.generations.len()
    }

    /// Returns true if the schedule has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    /// Parses the comma-delimited schedule body.
    ///
    /// # Errors
    /// `MalformedRecord` if a row does not hold exactly three parseable fields.
    pub fn parse(text: &str, path: &Path) -> Result<Self, IngestError> {
        let mut schedule = Self::default();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            let [generation, line_w, height_w] = fields[..] else {
                return Err(IngestError::malformed_record(
                    path,
                    idx + 1,
                    format!("expected 3 fields, found {}", fields.len()),
                ));
            };
            let bad = |what: &str, raw: &str| {
                IngestError::malformed_record(path, idx + 1, format!("{what} '{raw}' does not parse"))
            };
            schedule
                .generations
                .push(generation.parse().map_err(|_| bad("generation", generation))?);
            schedule
                .line_weight
                .push(line_w.parse().map_err(|_| bad("line weight", line_w))?);
            schedule
                .height_weight
                .push(height_w.parse().map_err(|_| bad("height weight", height_w))?);
        }
        Ok(schedule)
    }
}

/// Reads the schedule table at `path`.
///
/// # Errors
/// `Io` if the file cannot be read, `MalformedRecord` if a row does not parse.
pub fn read_weight_schedule(path: &Path) -> Result<WeightSchedule, IngestError> {
    WeightSchedule::parse(&read_text(path)?, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_parallel_sequences() {
        let schedule = WeightSchedule::parse("0,1.0,0.0\n1,0.75,0.25\n\n", Path::new("a.csv")).unwrap();
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.generations, vec![0, 1]);
        assert_eq!(schedule.line_weight, vec![1.0, 0.75]);
        assert_eq!(schedule.height_weight, vec![0.0, 0.25]);
    }

    #[test]
    fn rejects_short_rows() {
        let err = WeightSchedule::parse("0,1.0\n", Path::new("a.csv")).unwrap_err();
        assert!(matches!(err, IngestError::MalformedRecord { line: 1, .. }));
    }

    #[test]
    fn rejects_negative_generation() {
        let err = WeightSchedule::parse("-1,1.0,0.0\n", Path::new("a.csv")).unwrap_err();
        assert!(err.to_string().contains("generation"));
    }

    #[test]
    fn read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alphas.csv");
        std::fs::write(&path, "0,0.5,0.5\n").unwrap();
        let schedule = read_weight_schedule(&path).unwrap();
        assert!(!schedule.is_empty());
    }
}
