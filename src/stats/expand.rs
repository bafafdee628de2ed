//! Generation Expander.

use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, Generation};
use crate::error::{EvoResult, StatsError};
use crate::table::{EntityTable, GENERATIONS_COLUMN};
use crate::value::Value;

/// One observation: `value` of `entity` seen in `generation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Generation the entity was a member of.
    pub generation: Generation,
    /// Entity the value belongs to.
    pub entity: EntityId,
    /// `None` when the entity lacks the column.
    pub value: Option<f64>,
}

/// Parallel `(generation, entity, value)` observations.
///
/// Entry `i` means "`values[i]` of `entities[i]` was observed in
/// `generations[i]`". An absent value is kept as `None`; the summarizer
/// rejects it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationSeries {
    /// Generation of each observation.
    pub generations: Vec<Generation>,
    /// Entity of each observation.
    pub entities: Vec<EntityId>,
    /// Value of each observation.
    pub values: Vec<Option<f64>>,
}

impl GenerationSeries {
    /// Builds a series from `(generation, entity, value)` triples.
    #[must_use]
    pub fn from_observations<I>(observations: I) -> Self
    where
        I: IntoIterator<Item = (Generation, EntityId, Option<f64>)>,
    {
        let mut series = Self::default();
        for (generation, entity, value) in observations {
            series.push(generation, entity, value);
        }
        series
    }

    /// Appends one observation.
    pub fn push(&mut self, generation: Generation, entity: EntityId, value: Option<f64>) {
        self.generations.push(generation);
        self.entities.push(entity);
        self.values.push(value);
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.generations.len()
    }

    /// Returns true if there are no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    /// Returns true if the three sequences have equal length.
    #[must_use]
    pub fn is_aligned(&self) -> bool {
        self.generations.len() == self.entities.len() && self.generations.len() == self.values.len()
    }

    /// Iterates observations in emission order.
    pub fn iter(&self) -> impl Iterator<Item = Observation> + '_ {
        self.generations
            .iter()
            .zip(&self.entities)
            .zip(&self.values)
            .map(|((&generation, &entity), &value)| Observation {
                generation,
                entity,
                value,
            })
    }

    /// Returns a copy without absent observations.
    ///
    /// Callers use this to satisfy the summarizer's requirement that every
    /// value be present.
    #[must_use]
    pub fn without_absent(&self) -> Self {
        Self::from_observations(
            self.iter()
                .filter(|o| o.value.is_some())
                .map(|o| (o.generation, o.entity, o.value)),
        )
    }
}

/// Expands `column` into one observation per generation membership.
///
/// Rows are visited in table order and rows without generation
/// information are skipped. Within a row, observations follow the
/// membership list order; the result is not sorted by generation.
///
/// # Errors
/// - `UnknownColumn` if the table has no `column`
/// - `NonNumericValue` if `column` holds generation lists
pub fn expand_by_generation(table: &EntityTable, column: &str) -> EvoResult<GenerationSeries> {
    let values = table.column(column)?;
    let Ok(memberships) = table.column(GENERATIONS_COLUMN) else {
        return Ok(GenerationSeries::default());
    };

    let mut series = GenerationSeries::default();
    for ((id, membership), value) in table.ids().iter().zip(memberships).zip(values) {
        let Value::Generations(gens) = membership else {
            continue;
        };
        for &generation in gens {
            let value = match value {
                Value::Number(v) => Some(*v),
                Value::Absent => None,
                Value::Generations(_) => {
                    return Err(StatsError::NonNumericValue {
                        column: column.to_string(),
                        generation,
                        entity: *id,
                    }
                    .into())
                }
            };
            series.push(generation, *id, value);
        }
    }
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::entity::{EntityId, EntityRecord, RecordSet};
    use crate::error::EvoError;

    fn id(raw: u64) -> EntityId {
        EntityId::new(raw).unwrap()
    }

    fn record(raw: u64, height: Option<f64>, gens: &[Generation]) -> EntityRecord {
        let mut r = EntityRecord::new(id(raw));
        if let Some(h) = height {
            r.merge_fields([("average_height".to_string(), h)]);
        }
        for &g in gens {
            r.push_generation(g);
        }
        r
    }

    #[test]
    fn duplicates_rows_per_membership() {
        let records: RecordSet = [
            record(1, Some(0.07), &[0, 1]),
            record(2, Some(0.0), &[0]),
            record(3, Some(9.0), &[]),
        ]
        .into_iter()
        .collect();
        let table = EntityTable::assemble(&records);

        let series = expand_by_generation(&table, "average_height").unwrap();
        assert_eq!(series.generations, vec![0, 1, 0]);
        assert_eq!(series.entities, vec![id(1), id(1), id(2)]);
        assert_eq!(series.values, vec![Some(0.07), Some(0.07), Some(0.0)]);
    }

    #[test]
    fn absent_value_is_propagated() {
        let mut other = record(2, None, &[4]);
        other.merge_fields([("speed".to_string(), 1.0)]);
        let records: RecordSet = [record(1, Some(0.5), &[4]), other].into_iter().collect();
        let table = EntityTable::assemble(&records);

        let series = expand_by_generation(&table, "average_height").unwrap();
        assert_eq!(series.values, vec![Some(0.5), None]);
        assert_eq!(series.entities, vec![id(1), id(2)]);
        let present = series.without_absent();
        assert_eq!(present.values, vec![Some(0.5)]);
        assert_eq!(present.generations, vec![4]);
        assert_eq!(present.entities, vec![id(1)]);
        assert!(present.is_aligned());
    }

    #[test]
    fn no_generation_column_yields_empty_series() {
        let records: RecordSet = std::iter::once(record(1, Some(1.0), &[])).collect();
        let table = EntityTable::assemble(&records);
        assert!(expand_by_generation(&table, "average_height").unwrap().is_empty());
    }

    #[test]
    fn unknown_and_non_numeric_columns_fail() {
        let records: RecordSet = std::iter::once(record(1, Some(1.0), &[0])).collect();
        let table = EntityTable::assemble(&records);

        let err = expand_by_generation(&table, "missing").unwrap_err();
        assert!(err.is_table());

        let err = expand_by_generation(&table, GENERATIONS_COLUMN).unwrap_err();
        assert!(matches!(
            err,
            EvoError::Stats(StatsError::NonNumericValue { generation: 0, .. })
        ));
    }
}
