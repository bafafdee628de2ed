//! Generation Summarizer.
//!
//! Statistics are keyed by generation explicitly, so sparse or
//! non-zero-based generation numbering is summarized correctly. Callers
//! that want the historical layout (one array slot per generation, slot
//! index == generation) go through [`GenerationSummary::dense`], which
//! checks the contiguity precondition instead of assuming it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::Generation;
use crate::error::StatsError;

use super::expand::GenerationSeries;

/// Population statistics of one generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Number of observations.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation (divide by N).
    pub std_dev: f64,
    /// Largest observation.
    pub max: f64,
}

impl GenerationStats {
    /// Reduces a non-empty slice of values.
    fn from_values(values: &[f64]) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            count: values.len(),
            mean,
            std_dev: variance.sqrt(),
            max,
        }
    }
}

/// Statistics per distinct generation, ascending by generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationSummary {
    by_generation: BTreeMap<Generation, GenerationStats>,
}

/// Dense layout: equal-length sequences where position `i` is generation `i`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DenseSummary {
    /// `0..G`.
    pub generations: Vec<Generation>,
    /// Mean per generation.
    pub mean: Vec<f64>,
    /// Population standard deviation per generation.
    pub std_dev: Vec<f64>,
    /// Maximum per generation.
    pub max: Vec<f64>,
}

impl GenerationSummary {
    /// Number of distinct generations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_generation.len()
    }

    /// Returns true if no generation was observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_generation.is_empty()
    }

    /// Statistics of one generation.
    #[must_use]
    pub fn get(&self, generation: Generation) -> Option<&GenerationStats> {
        self.by_generation.get(&generation)
    }

    /// Iterates `(generation, stats)` in ascending generation order.
    pub fn iter(&self) -> impl Iterator<Item = (Generation, &GenerationStats)> {
        self.by_generation.iter().map(|(g, s)| (*g, s))
    }

    /// Converts to the dense zero-based layout.
    ///
    /// # Errors
    /// `UnsortedOrSparseGeneration` unless the generations are exactly
    /// `0..len()`; `expected` names the first missing index.
    pub fn dense(&self) -> Result<DenseSummary, StatsError> {
        let mut out = DenseSummary::default();
        for (expected, (generation, stats)) in (0..).zip(self.iter()) {
            if generation != expected {
                return Err(StatsError::UnsortedOrSparseGeneration {
                    expected,
                    found: generation,
                });
            }
            out.generations.push(generation);
            out.mean.push(stats.mean);
            out.std_dev.push(stats.std_dev);
            out.max.push(stats.max);
        }
        Ok(out)
    }
}

/// Computes mean, population standard deviation and maximum for every
/// distinct generation in `series`.
///
/// # Errors
/// - `RaggedSeries` if the sequences differ in length
/// - `AbsentValue` if any observation is absent; filter with
///   [`GenerationSeries::without_absent`] or derive a column first
/// - `NonFiniteValue` for NaN or infinite observations
pub fn summarize(series: &GenerationSeries) -> Result<GenerationSummary, StatsError> {
    if !series.is_aligned() {
        return Err(StatsError::RaggedSeries {
            generations: series.generations.len(),
            entities: series.entities.len(),
            values: series.values.len(),
        });
    }

    let mut grouped: BTreeMap<Generation, Vec<f64>> = BTreeMap::new();
    for obs in series.iter() {
        let value = obs.value.ok_or(StatsError::AbsentValue {
            generation: obs.generation,
            entity: obs.entity,
        })?;
        if !value.is_finite() {
            return Err(StatsError::NonFiniteValue {
                generation: obs.generation,
                entity: obs.entity,
                value,
            });
        }
        grouped.entry(obs.generation).or_default().push(value);
    }

    let by_generation = grouped
        .into_iter()
        .map(|(generation, values)| (generation, GenerationStats::from_values(&values)))
        .collect();
    Ok(GenerationSummary { by_generation })
}
