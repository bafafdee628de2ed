//! evostats command line
//!
//! Aggregates one experiment directory and writes per-generation
//! statistics for each requested column.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use evostats::{
    AbsentPolicy, ColumnReport, Experiment, ExperimentLayout, RunReport, BLOCKS_COLUMN, DEFAULT_BLOCK_HEIGHT,
};

/// Columns summarized when none are given, with their chart labels.
const DEFAULT_COLUMNS: &[(&str, &str)] = &[
    ("fitness", "Fitness"),
    ("follow_line_fitness", "Distance traveled"),
    ("average_height", "Average height"),
    (BLOCKS_COLUMN, "Average height (blocks)"),
];

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Experiment directory (e.g. data/default_experiment/1)
    #[arg(value_name = "EXPERIMENT_DIR")]
    experiment: PathBuf,

    /// JSON file overriding the default directory layout
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Column to summarize (repeatable)
    #[arg(long = "column", value_name = "NAME")]
    columns: Vec<String>,

    /// Block height used to derive the blocks column from average height
    #[arg(long, default_value_t = DEFAULT_BLOCK_HEIGHT)]
    block_height: f64,

    /// Write the assembled entity table as CSV
    #[arg(long, value_name = "PATH")]
    table_csv: Option<PathBuf>,

    /// Directory receiving one CSV per summarized column
    #[arg(long, default_value = "figures")]
    out_dir: PathBuf,

    /// Also write report.json into the output directory
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Leave out entities lacking a column instead of failing
    #[arg(long, default_value_t = false)]
    drop_absent: bool,
}

fn label_for(column: &str) -> String {
    DEFAULT_COLUMNS
        .iter()
        .find(|(name, _)| *name == column)
        .map_or_else(|| column.to_string(), |(_, label)| (*label).to_string())
}

/// Builds the log filter from `RUST_LOG`-style directives, falling back
/// to `info` when they are unset or invalid.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn main() -> Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(directives.as_deref()))
        .with_target(false)
        .init();

    let args = Args::parse();

    let layout = match &args.layout {
        Some(path) => ExperimentLayout::from_json_file(path)
            .with_context(|| format!("loading layout {}", path.display()))?,
        None => ExperimentLayout::default(),
    };

    let mut experiment = Experiment::open(&args.experiment, layout)
        .with_context(|| format!("loading experiment {}", args.experiment.display()))?;
    if experiment.table().has_column(evostats::HEIGHT_COLUMN) {
        experiment = experiment
            .with_block_height(args.block_height)
            .context("deriving height in blocks")?;
    }
    info!(
        entities = experiment.table().len(),
        columns = experiment.table().columns().len(),
        "assembled entity table"
    );

    if let Some(path) = &args.table_csv {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        experiment
            .table()
            .write_csv(BufWriter::new(file))
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote entity table");
    }

    let columns: Vec<String> = if args.columns.is_empty() {
        DEFAULT_COLUMNS.iter().map(|(name, _)| (*name).to_string()).collect()
    } else {
        args.columns.clone()
    };

    let policy = if args.drop_absent {
        AbsentPolicy::Drop
    } else {
        AbsentPolicy::Fail
    };

    let mut report = RunReport::new(&args.experiment, experiment.table().len());
    for column in columns {
        if !experiment.table().has_column(&column) {
            warn!(column = %column, "column not present in table, skipping");
            continue;
        }
        let summary = experiment
            .summarize_with(&column, policy)
            .with_context(|| format!("summarizing {column}"))?;
        let column_report = ColumnReport::new(column.as_str(), label_for(&column), summary);
        let path = column_report
            .write_csv_file(&args.out_dir)
            .with_context(|| format!("exporting {column}"))?;
        info!(column = %column, path = %path.display(), "wrote generation summary");
        report.columns.push(column_report);
    }

    if args.json {
        report.schedule = experiment.weight_schedule().context("reading weight schedule")?;
        let path = args.out_dir.join("report.json");
        report
            .write_json_file(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote run report");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tracing::level_filters::LevelFilter;

    #[test]
    fn log_filter_defaults_to_info() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn log_filter_honors_quieter_directives() {
        assert_eq!(log_filter(Some("warn")).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(log_filter(Some("error")).max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn log_filter_honors_louder_directives() {
        assert_eq!(log_filter(Some("debug")).max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
