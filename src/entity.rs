//! Entity identity and per-entity records.
//!
//! An entity is one evolved individual. Its record is built up by
//! several ingest stages: descriptor fields first, then generation
//! membership, then fitness. A record is never replaced once created,
//! only merged into.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Index of one evolutionary iteration. Zero-based.
pub type Generation = u32;

/// Positive integer identifier of an entity.
///
/// # Examples
///
/// ```
/// use evostats::EntityId;
///
/// let id = EntityId::new(12).unwrap();
/// assert_eq!(id.get(), 12);
/// assert!(EntityId::new(0).is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates an entity ID, rejecting zero.
    #[must_use]
    pub const fn new(raw: u64) -> Option<Self> {
        if raw == 0 {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// Returns the raw integer.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a token is not a positive integer identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEntityIdError(String);

impl fmt::Display for ParseEntityIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a positive integer identifier", self.0)
    }
}

impl std::error::Error for ParseEntityIdError {}

impl FromStr for EntityId {
    type Err = ParseEntityIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| ParseEntityIdError(s.to_string()))
    }
}

/// Everything known about one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Identifier parsed from the entity's file names.
    pub id: EntityId,

    /// Descriptor name to value, accumulated across sources.
    #[serde(default)]
    pub fields: BTreeMap<String, f64>,

    /// Generations the entity appeared in, in encounter order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generations: Option<Vec<Generation>>,

    /// Attached fitness; `None` when the table had no value for the entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitness: Option<f64>,
}

impl EntityRecord {
    /// Creates an empty record.
    #[must_use]
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
            generations: None,
            fitness: None,
        }
    }

    /// Merges descriptor fields into the record.
    ///
    /// Fields already present are overwritten by `fields`; nothing is
    /// removed.
    pub fn merge_fields<I>(&mut self, fields: I)
    where
        I: IntoIterator<Item = (String, f64)>,
    {
        self.fields.extend(fields);
    }

    /// Appends one generation to the membership list, creating it on
    /// first use.
    pub fn push_generation(&mut self, generation: Generation) {
        self.generations.get_or_insert_with(Vec::new).push(generation);
    }

    /// Returns a descriptor field value.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }
}

/// Owned set of entity records keyed by identifier.
///
/// Each ingest stage consumes the set produced by the previous stage
/// and returns the updated set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordSet {
    records: BTreeMap<EntityId, EntityRecord>,
}

impl RecordSet {
    /// Creates an empty record set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the set holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns true if a record for `id` exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.records.contains_key(&id)
    }

    /// Returns the record for `id`.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntityRecord> {
        self.records.get(&id)
    }

    /// Returns the record for `id` if it already exists.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut EntityRecord> {
        self.records.get_mut(&id)
    }

    /// Returns the record for `id`, creating an empty one on first encounter.
    pub fn entry(&mut self, id: EntityId) -> &mut EntityRecord {
        self.records.entry(id).or_insert_with(|| EntityRecord::new(id))
    }

    /// Iterates records in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &EntityRecord> {
        self.records.values()
    }

    /// Identifiers in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.records.keys().copied()
    }
}

impl FromIterator<EntityRecord> for RecordSet {
    fn from_iter<T: IntoIterator<Item = EntityRecord>>(iter: T) -> Self {
        Self {
            records: iter.into_iter().map(|r| (r.id, r)).collect(),
        }
    }
}
