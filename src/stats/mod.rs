//! Generation-wise statistics.
//!
//! An entity can belong to several generations, so the entity table is
//! first re-expanded into one `(generation, value)` observation per
//! membership ([`expand_by_generation`]) and then reduced per generation
//! ([`summarize`]).

pub mod expand;
pub mod summary;

pub use expand::{expand_by_generation, GenerationSeries, Observation};
pub use summary::{summarize, DenseSummary, GenerationStats, GenerationSummary};
