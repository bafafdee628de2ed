//! Table Assembler: a rectangular, read-only view over a [`RecordSet`].
//!
//! Rows are entity identifiers in ascending order. Columns are the union
//! of every descriptor name seen in any record (ascending), then
//! [`GENERATIONS_COLUMN`] and [`FITNESS_COLUMN`] when any record carries
//! them, then derived columns in the order they were added. A record
//! lacking a field yields [`Value::Absent`] in that cell.

use std::collections::{BTreeSet, HashMap};
use std::io::{self, Write};

use serde::Serialize;

use crate::entity::{EntityId, EntityRecord, RecordSet};
use crate::error::TableError;
use crate::value::Value;

/// Column holding each entity's generation-membership list.
pub const GENERATIONS_COLUMN: &str = "generations";

/// Column holding each entity's fitness.
pub const FITNESS_COLUMN: &str = "fitness";

/// Entity-indexed table with union-of-fields columns.
///
/// # Examples
///
/// ```
/// use evostats::{EntityId, EntityRecord, EntityTable, RecordSet, Value};
///
/// let mut a = EntityRecord::new(EntityId::new(1).unwrap());
/// a.merge_fields([("speed".to_string(), 2.0)]);
/// let b = EntityRecord::new(EntityId::new(2).unwrap());
/// let records: RecordSet = [a, b].into_iter().collect();
///
/// let table = EntityTable::assemble(&records);
/// assert_eq!(table.columns(), ["speed"]);
/// assert_eq!(table.cell(EntityId::new(2).unwrap(), "speed").unwrap(), &Value::Absent);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityTable {
    ids: Vec<EntityId>,
    columns: Vec<String>,
    /// Column-major cells: `data[column][row]`.
    data: Vec<Vec<Value>>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

fn cell_for(record: &EntityRecord, column: &str) -> Value {
    match column {
        GENERATIONS_COLUMN => match &record.generations {
            Some(gens) => Value::Generations(gens.clone()),
            None => record.field(column).into(),
        },
        FITNESS_COLUMN => record.fitness.or_else(|| record.field(column)).into(),
        _ => record.field(column).into(),
    }
}

impl EntityTable {
    /// Assembles the table. Pure: assembling the same records twice
    /// yields equal tables.
    #[must_use]
    pub fn assemble(records: &RecordSet) -> Self {
        let mut descriptor_names = BTreeSet::new();
        let mut has_generations = false;
        let mut has_fitness = false;
        for record in records.iter() {
            for name in record.fields.keys() {
                match name.as_str() {
                    GENERATIONS_COLUMN => has_generations = true,
                    FITNESS_COLUMN => has_fitness = true,
                    _ => {
                        descriptor_names.insert(name.as_str());
                    }
                }
            }
            has_generations |= record.generations.is_some();
            has_fitness |= record.fitness.is_some();
        }

        let mut columns: Vec<String> = descriptor_names.into_iter().map(str::to_string).collect();
        if has_generations {
            columns.push(GENERATIONS_COLUMN.to_string());
        }
        if has_fitness {
            columns.push(FITNESS_COLUMN.to_string());
        }

        let ids: Vec<EntityId> = records.ids().collect();
        let data = columns
            .iter()
            .map(|column| records.iter().map(|r| cell_for(r, column)).collect())
            .collect();

        Self::from_parts(ids, columns, data)
    }

    fn from_parts(ids: Vec<EntityId>, columns: Vec<String>, data: Vec<Vec<Value>>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self {
            ids,
            columns,
            data,
            index,
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Row identifiers, ascending.
    #[must_use]
    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    /// Column names in table order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns true if the table has a column `name`.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All cells of one column, in row order.
    ///
    /// # Errors
    /// `UnknownColumn` if no record ever carried `name`.
    pub fn column(&self, name: &str) -> Result<&[Value], TableError> {
        self.index
            .get(name)
            .map(|&i| self.data[i].as_slice())
            .ok_or_else(|| TableError::UnknownColumn {
                column: name.to_string(),
            })
    }

    /// One cell; `Absent` when the entity lacks the field.
    ///
    /// # Errors
    /// `UnknownColumn` for an unknown column, `UnknownEntity` for an
    /// identifier with no row.
    pub fn cell(&self, id: EntityId, column: &str) -> Result<&Value, TableError> {
        let values = self.column(column)?;
        let row = self
            .ids
            .binary_search(&id)
            .map_err(|_| TableError::UnknownEntity { id })?;
        Ok(&values[row])
    }

    /// `(column, value)` pairs of one row, in column order.
    #[must_use]
    pub fn row(&self, id: EntityId) -> Option<Vec<(&str, &Value)>> {
        let row = self.ids.binary_search(&id).ok()?;
        Some(
            self.columns
                .iter()
                .zip(&self.data)
                .map(|(name, values)| (name.as_str(), &values[row]))
                .collect(),
        )
    }

    /// Returns a new table with `name` computed from `source` cell by cell.
    ///
    /// Rows where `source` is absent or non-numeric stay absent.
    ///
    /// # Errors
    /// `UnknownColumn` if `source` is missing, `DuplicateColumn` if `name`
    /// already exists.
    pub fn with_mapped_column<F>(&self, name: &str, source: &str, f: F) -> Result<Self, TableError>
    where
        F: Fn(f64) -> f64,
    {
        if self.has_column(name) {
            return Err(TableError::DuplicateColumn {
                column: name.to_string(),
            });
        }
        let derived: Vec<Value> = self
            .column(source)?
            .iter()
            .map(|v| v.as_number().map(&f).into())
            .collect();

        let mut columns = self.columns.clone();
        columns.push(name.to_string());
        let mut data = self.data.clone();
        data.push(derived);
        Ok(Self::from_parts(self.ids.clone(), columns, data))
    }

    /// Returns a new table with `name = source / divisor`.
    ///
    /// Used for height in blocks: `avg_z_in_blocks = average_height / 0.035`.
    ///
    /// # Errors
    /// `InvalidParameter` if `divisor` is zero or not finite, plus the
    /// errors of [`with_mapped_column`](Self::with_mapped_column).
    pub fn with_ratio_column(&self, name: &str, source: &str, divisor: f64) -> Result<Self, TableError> {
        if !divisor.is_finite() || divisor == 0.0 {
            return Err(TableError::InvalidParameter {
                reason: format!("divisor for '{name}' must be finite and non-zero, got {divisor}"),
            });
        }
        self.with_mapped_column(name, source, |v| v / divisor)
    }

    /// Writes the table as CSV: header `id,<columns>`, absent cells empty.
    ///
    /// # Errors
    /// Propagates write failures.
    pub fn write_csv<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "id")?;
        for column in &self.columns {
            write!(out, ",{column}")?;
        }
        writeln!(out)?;

        for (row, id) in self.ids.iter().enumerate() {
            write!(out, "{id}")?;
            for values in &self.data {
                let cell = &values[row];
                if matches!(cell, Value::Generations(_)) {
                    write!(out, ",\"{cell}\"")?;
                } else {
                    write!(out, ",{cell}")?;
                }
            }
            writeln!(out)?;
        }
        out.flush()
    }
}
