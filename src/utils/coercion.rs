//! Coercion of free-text record fields into request values.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How string flags on a provisioning record become booleans on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BooleanCoercion {
    /// Accept common spellings; anything unrecognised becomes `false`
    #[default]
    Lenient,
    /// Only `true`/`false` (any case) or blank are accepted
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Field {field} holds {value:?}, which is not a boolean")]
pub struct CoercionError {
    pub field: &'static str,
    pub value: String,
}

/// Outcome of a lenient coercion that had to guess
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coerced {
    Exact(bool),
    Defaulted,
}

impl Coerced {
    pub fn value(&self) -> bool {
        match self {
            Self::Exact(value) => *value,
            Self::Defaulted => false,
        }
    }
}

impl BooleanCoercion {
    /// Coerce `raw` under this policy. Blank input is always `false`.
    pub fn coerce(&self, field: &'static str, raw: &str) -> Result<Coerced, CoercionError> {
        let normalized = raw.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Ok(Coerced::Exact(false));
        }

        let parsed = match (self, normalized.as_str()) {
            (_, "true") => Some(true),
            (_, "false") => Some(false),
            (Self::Lenient, "1" | "yes" | "y" | "on") => Some(true),
            (Self::Lenient, "0" | "no" | "n" | "off") => Some(false),
            _ => None,
        };

        match (self, parsed) {
            (_, Some(value)) => Ok(Coerced::Exact(value)),
            (Self::Lenient, None) => Ok(Coerced::Defaulted),
            (Self::Strict, None) => Err(CoercionError {
                field,
                value: raw.to_string(),
            }),
        }
    }
}
