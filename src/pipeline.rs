//! The aggregation pipeline over one experiment directory.
//!
//! Stages run strictly in order, each consuming the record set of the
//! previous one: phenotype descriptors, behavioral descriptors,
//! generation membership, fitness. The first error aborts the run, so a
//! table is only ever assembled from a complete record set.

use std::path::{Path, PathBuf};

use tracing::{info, info_span, warn};

use crate::entity::RecordSet;
use crate::error::EvoResult;
use crate::ingest::{self, MergeMode, WeightSchedule};
use crate::layout::ExperimentLayout;
use crate::stats::{expand_by_generation, summarize, GenerationSummary};
use crate::table::EntityTable;

/// Column holding average height expressed in blocks.
pub const BLOCKS_COLUMN: &str = "avg_z_in_blocks";

/// Descriptor the blocks column is derived from.
pub const HEIGHT_COLUMN: &str = "average_height";

/// Height of one building block, in the same unit as `average_height`.
pub const DEFAULT_BLOCK_HEIGHT: f64 = 0.035;

/// Runs every ingest stage and returns the complete record set.
///
/// # Errors
/// The first ingest error encountered.
pub fn load_records(root: &Path, layout: &ExperimentLayout) -> EvoResult<RecordSet> {
    let paths = layout.resolve(root);
    let _span = info_span!("load_records", root = %root.display()).entered();

    let records = ingest::merge_descriptors(
        RecordSet::new(),
        &paths.phenotype_dir,
        layout,
        MergeMode::CreateMissing,
    )?;
    let records = ingest::merge_descriptors(
        records,
        &paths.behavioral_dir,
        layout,
        MergeMode::CreateMissing,
    )?;
    let records = ingest::attach_generations(records, &paths.generations_dir, layout)?;
    let records = ingest::attach_fitness(records, &paths.fitness_file, layout)?;

    info!(entities = records.len(), "loaded experiment records");
    Ok(records)
}

/// What to do with entities that belong to a generation but lack the
/// summarized column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AbsentPolicy {
    /// Fail with `AbsentValue`.
    #[default]
    Fail,
    /// Leave those observations out of the statistics.
    Drop,
}

/// Expands `column` by generation and summarizes it.
///
/// # Errors
/// `UnknownColumn`, `NonNumericValue`, or, under [`AbsentPolicy::Fail`],
/// `AbsentValue` when an entity with generation membership lacks `column`.
pub fn summarize_column(
    table: &EntityTable,
    column: &str,
    policy: AbsentPolicy,
) -> EvoResult<GenerationSummary> {
    let mut series = expand_by_generation(table, column)?;
    if policy == AbsentPolicy::Drop {
        let before = series.len();
        series = series.without_absent();
        if series.len() < before {
            warn!(column, dropped = before - series.len(), "dropped absent observations");
        }
    }
    let summary = summarize(&series)?;
    info!(column, observations = series.len(), generations = summary.len(), "summarized column");
    Ok(summary)
}

/// One loaded experiment: its root, layout, and assembled table.
#[derive(Debug, Clone)]
pub struct Experiment {
    root: PathBuf,
    layout: ExperimentLayout,
    table: EntityTable,
}

impl Experiment {
    /// Loads and assembles the experiment at `root`.
    ///
    /// # Errors
    /// The first ingest error encountered.
    pub fn open(root: impl Into<PathBuf>, layout: ExperimentLayout) -> EvoResult<Self> {
        let root = root.into();
        let records = load_records(&root, &layout)?;
        let table = EntityTable::assemble(&records);
        Ok(Self {
            root,
            layout,
            table,
        })
    }

    /// Experiment root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Layout the experiment was loaded with.
    #[must_use]
    pub fn layout(&self) -> &ExperimentLayout {
        &self.layout
    }

    /// The assembled entity table.
    #[must_use]
    pub fn table(&self) -> &EntityTable {
        &self.table
    }

    /// Adds the [`BLOCKS_COLUMN`] derived from [`HEIGHT_COLUMN`].
    ///
    /// # Errors
    /// `UnknownColumn` if no entity has an average height,
    /// `InvalidParameter` for a zero or non-finite block height.
    pub fn with_block_height(mut self, block_height: f64) -> EvoResult<Self> {
        self.table = self
            .table
            .with_ratio_column(BLOCKS_COLUMN, HEIGHT_COLUMN, block_height)?;
        Ok(self)
    }

    /// Generation statistics for `column`; absent values are an error.
    ///
    /// # Errors
    /// See [`summarize_column`].
    pub fn summarize(&self, column: &str) -> EvoResult<GenerationSummary> {
        summarize_column(&self.table, column, AbsentPolicy::Fail)
    }

    /// Generation statistics for `column` under an explicit absent-value policy.
    ///
    /// # Errors
    /// See [`summarize_column`].
    pub fn summarize_with(&self, column: &str, policy: AbsentPolicy) -> EvoResult<GenerationSummary> {
        summarize_column(&self.table, column, policy)
    }

    /// Reads the weight schedule, if the experiment has one.
    ///
    /// # Errors
    /// `MalformedRecord` if the file exists but does not parse.
    pub fn weight_schedule(&self) -> EvoResult<Option<WeightSchedule>> {
        let path = self.layout.resolve(&self.root).schedule_file;
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(ingest::read_weight_schedule(&path)?))
    }
}
