//! # evostats - Generation-wise statistics for evolutionary robotics runs
//!
//! An evolution run writes one small file per individual: phenotype
//! descriptors, behavioral descriptors, plus a membership list per
//! generation and a flat fitness table. evostats merges those files into
//! one entity-indexed table and summarizes any numeric column per
//! generation (mean, population standard deviation, maximum).
//!
//! ## Core Concepts
//!
//! - **Entity**: one evolved individual, keyed by a positive integer
//! - **Generation**: one evolutionary iteration; an entity can belong to several
//! - **EntityTable**: rows = entities (ascending), columns = union of all fields
//! - **GenerationSummary**: statistics keyed explicitly by generation
//!
//! ## Usage
//!
//! ```rust,no_run
//! use evostats::{Experiment, ExperimentLayout};
//!
//! # fn main() -> evostats::EvoResult<()> {
//! let experiment = Experiment::open("data/default_experiment/1", ExperimentLayout::default())?
//!     .with_block_height(evostats::DEFAULT_BLOCK_HEIGHT)?;
//!
//! let fitness = experiment.summarize("fitness")?;
//! let dense = fitness.dense()?;
//! println!("{} generations", dense.generations.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Records and identity
pub mod entity;
pub mod error;
pub mod layout;
pub mod naming;
pub mod value;

// Pipeline stages
pub mod ingest;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod table;

// Re-export primary types at crate root for convenience
pub use entity::{EntityId, EntityRecord, Generation, RecordSet};
pub use error::{EvoError, EvoResult, IngestError, StatsError, TableError};
pub use ingest::{MergeMode, WeightSchedule};
pub use layout::{ExperimentLayout, ResolvedLayout};
pub use naming::NamingConvention;
pub use pipeline::{
	load_records, summarize_column, AbsentPolicy, Experiment, BLOCKS_COLUMN, DEFAULT_BLOCK_HEIGHT,
	HEIGHT_COLUMN,
};
pub use report::{ColumnReport, RunReport};
pub use stats::{
	expand_by_generation, summarize, DenseSummary, GenerationSeries, GenerationStats,
	GenerationSummary, Observation,
};
pub use table::{EntityTable, FITNESS_COLUMN, GENERATIONS_COLUMN};
pub use value::Value;
