//! Identity extraction from file and folder names.
//!
//! Experiment outputs encode identifiers in names: descriptor files look
//! like `phenotype_desc_12.txt` and generation folders like
//! `generation_3`. A [`NamingConvention`] turns such a name into an
//! integer, or fails with [`IngestError::MalformedFileName`].

use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, Generation};
use crate::error::IngestError;

/// Rule for locating the integer token inside a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NamingConvention {
    /// Split the stem (name without its last extension) on `delimiter`
    /// and take the token at zero-based `position`.
    Token {
        /// Token separator.
        delimiter: char,
        /// Zero-based token index.
        position: usize,
    },
    /// Match the whole name against `pattern` and take capture group 1.
    Pattern {
        /// Regular expression with one capture group.
        pattern: String,
    },
}

impl NamingConvention {
    /// `phenotype_desc_<id>.txt`
    #[must_use]
    pub const fn entity_files() -> Self {
        Self::Token {
            delimiter: '_',
            position: 2,
        }
    }

    /// `generation_<index>`
    #[must_use]
    pub const fn generation_folders() -> Self {
        Self::Token {
            delimiter: '_',
            position: 1,
        }
    }

    /// Extracts the raw integer token from `name`.
    ///
    /// # Errors
    /// `MalformedFileName` if the token is missing or not an unsigned integer,
    /// or if the convention's pattern does not compile.
    pub fn extract(&self, name: &str) -> Result<u64, IngestError> {
        let malformed = |reason: String| IngestError::MalformedFileName {
            name: name.to_string(),
            reason,
        };

        let token = match self {
            Self::Token {
                delimiter,
                position,
            } => {
                let stem = Path::new(name)
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or(name);
                stem.split(*delimiter).nth(*position).ok_or_else(|| {
                    malformed(format!(
                        "no token at position {position} when split on '{delimiter}'"
                    ))
                })?
            }
            Self::Pattern { pattern } => {
                let re = Regex::new(pattern)
                    .map_err(|e| malformed(format!("invalid pattern '{pattern}': {e}")))?;
                re.captures(name)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str())
                    .ok_or_else(|| malformed(format!("does not match pattern '{pattern}'")))?
            }
        };

        token
            .parse::<u64>()
            .map_err(|_| malformed(format!("token '{token}' is not an unsigned integer")))
    }

    /// Extracts a positive entity identifier from `name`.
    ///
    /// # Errors
    /// `MalformedFileName` if extraction fails or the identifier is zero.
    pub fn entity_id(&self, name: &str) -> Result<EntityId, IngestError> {
        let raw = self.extract(name)?;
        EntityId::new(raw).ok_or_else(|| IngestError::MalformedFileName {
            name: name.to_string(),
            reason: "entity identifier must be positive".to_string(),
        })
    }

    /// Extracts a generation index from `name`.
    ///
    /// # Errors
    /// `MalformedFileName` if extraction fails or the index does not fit a `u32`.
    pub fn generation(&self, name: &str) -> Result<Generation, IngestError> {
        let raw = self.extract(name)?;
        Generation::try_from(raw).map_err(|_| IngestError::MalformedFileName {
            name: name.to_string(),
            reason: format!("generation index {raw} out of range"),
        })
    }
}
