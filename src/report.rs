//! Export of generation summaries for the plotting layer.
//!
//! Each summarized column can be written as a small CSV
//! (`generation,count,mean,std_dev,max`), and a whole run as one JSON
//! document.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{EvoError, EvoResult};
use crate::ingest::WeightSchedule;
use crate::stats::GenerationSummary;

/// Summary of one column, with the label used on charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnReport {
    /// Summarized table column.
    pub column: String,
    /// Axis label for the column.
    pub label: String,
    /// Per-generation statistics.
    pub summary: GenerationSummary,
}

impl ColumnReport {
    /// Creates a report for one column.
    #[must_use]
    pub fn new(column: impl Into<String>, label: impl Into<String>, summary: GenerationSummary) -> Self {
        Self {
            column: column.into(),
            label: label.into(),
            summary,
        }
    }

    /// Writes one CSV row per generation, ascending.
    ///
    /// # Errors
    /// Propagates write failures.
    pub fn write_csv<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "generation,count,mean,std_dev,max")?;
        for (generation, stats) in self.summary.iter() {
            writeln!(
                out,
                "{generation},{},{},{},{}",
                stats.count, stats.mean, stats.std_dev, stats.max
            )?;
        }
        out.flush()
    }

    /// Writes `<dir>/<column>.csv` and returns its path.
    ///
    /// # Errors
    /// `Export` if the directory or file cannot be written.
    pub fn write_csv_file(&self, dir: &Path) -> EvoResult<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.csv", self.column));
        let file = File::create(&path)
            .map_err(|e| EvoError::export(format!("{}: {e}", path.display())))?;
        self.write_csv(BufWriter::new(file))?;
        Ok(path)
    }
}

/// Everything one run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Experiment root the report was computed from.
    pub experiment: PathBuf,
    /// When the report was created.
    pub generated_at: DateTime<Utc>,
    /// Number of rows in the entity table.
    pub entities: usize,
    /// One report per summarized column.
    pub columns: Vec<ColumnReport>,
    /// Weight schedule, if the experiment has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<WeightSchedule>,
}

impl RunReport {
    /// Creates an empty report stamped with the current time.
    #[must_use]
    pub fn new(experiment: impl Into<PathBuf>, entities: usize) -> Self {
        Self {
            experiment: experiment.into(),
            generated_at: Utc::now(),
            entities,
            columns: Vec::new(),
            schedule: None,
        }
    }

    /// Serializes the report as pretty JSON.
    ///
    /// # Errors
    /// `Export` on serialization or write failure.
    pub fn write_json<W: Write>(&self, out: W) -> EvoResult<()> {
        serde_json::to_writer_pretty(out, self)?;
        Ok(())
    }

    /// Writes the report to `path`.
    ///
    /// # Errors
    /// `Export` if the file cannot be written.
    pub fn write_json_file(&self, path: &Path) -> EvoResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)
            .map_err(|e| EvoError::export(format!("{}: {e}", path.display())))?;
        let mut out = BufWriter::new(file);
        self.write_json(&mut out)?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::entity::EntityId;
    use crate::stats::{summarize, GenerationSeries};

    fn report() -> ColumnReport {
        let id = |raw| EntityId::new(raw).unwrap();
        let series = GenerationSeries::from_observations([
            (0, id(1), Some(1.0)),
            (0, id(2), Some(3.0)),
            (1, id(1), Some(2.0)),
        ]);
        ColumnReport::new("fitness", "Fitness", summarize(&series).unwrap())
    }

    #[test]
    fn csv_has_one_row_per_generation() {
        let mut buf = Vec::new();
        report().write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["generation,count,mean,std_dev,max", "0,2,2,1,3", "1,1,2,0,2"]);
    }

    #[test]
    fn csv_file_named_after_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = report().write_csv_file(&dir.path().join("figures")).unwrap();
        assert!(path.ends_with("figures/fitness.csv"));
        assert!(path.is_file());
    }

    #[test]
    fn json_report_contains_columns_and_schedule() {
        let mut run = RunReport::new("data/exp/1", 12);
        run.columns.push(report());
        run.schedule = Some(WeightSchedule {
            generations: vec![0],
            line_weight: vec![1.0],
            height_weight: vec![0.0],
        });

        let mut buf = Vec::new();
        run.write_json(&mut buf).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(json["entities"], 12);
        assert_eq!(json["columns"][0]["column"], "fitness");
        assert_eq!(json["columns"][0]["summary"]["0"]["count"], 2);
        assert_eq!(json["schedule"]["line_weight"][0], 1.0);
    }
}
