//! Cell values of the entity table.
//!
//! A column either holds numbers (descriptors, fitness, derived
//! columns) or generation-membership lists. Any cell may be absent,
//! since the column set is the union of fields seen across all records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::entity::Generation;

/// One table cell.
///
/// # Examples
///
/// ```
/// use evostats::Value;
///
/// let height = Value::Number(0.07);
/// assert_eq!(height.as_number(), Some(0.07));
/// assert!(Value::Absent.is_absent());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// A numeric descriptor or fitness value.
    Number(f64),
    /// A generation-membership list.
    Generations(Vec<Generation>),
    /// The entity has no value for this column.
    Absent,
}

impl Value {
    /// Returns true if this is a number.
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    /// Returns true if the cell is absent.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns the number, if this is one.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the membership list, if this is one.
    #[must_use]
    pub fn as_generations(&self) -> Option<&[Generation]> {
        match self {
            Self::Generations(v) => Some(v),
            _ => None,
        }
    }

    /// Returns a human-readable type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Generations(_) => "generations",
            Self::Absent => "absent",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::Absent
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<Option<f64>> for Value {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Self::Absent, Self::Number)
    }
}

impl From<Vec<Generation>> for Value {
    fn from(v: Vec<Generation>) -> Self {
        Self::Generations(v)
    }
}

/// Renders the cell as it appears in CSV exports: absent cells are
/// empty, generation lists are bracketed.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Generations(gens) => {
                write!(f, "[")?;
                for (i, g) in gens.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{g}")?;
                }
                write!(f, "]")
            }
            Self::Absent => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_type_checks() {
        assert!(Value::Number(1.5).is_number());
        assert!(!Value::Generations(vec![0]).is_number());
        assert!(Value::default().is_absent());
        assert_eq!(Value::Generations(vec![0, 2]).type_name(), "generations");
    }

    #[test]
    fn value_from_option() {
        assert_eq!(Value::from(Some(2.0)), Value::Number(2.0));
        assert_eq!(Value::from(None::<f64>), Value::Absent);
    }

    #[test]
    fn value_display_for_csv() {
        assert_eq!(Value::Number(0.07).to_string(), "0.07");
        assert_eq!(Value::Generations(vec![0, 1]).to_string(), "[0, 1]");
        assert_eq!(Value::Absent.to_string(), "");
    }

    #[test]
    fn value_serialization() {
        let json = serde_json::to_string(&Value::Number(3.0)).unwrap();
        assert!(json.contains("\"type\":\"number\""));
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Value::Number(3.0));
    }
}
