// ── Core identity type ──
//
// Users, spots, and reservations are keyed by integers; payments by
// opaque strings. EntityId carries either behind one interface.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Canonical identifier for any backend record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Numeric(i64),
    Text(String),
}

impl EntityId {
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Numeric(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        Self::Numeric(n)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        match s.trim().parse::<i64>() {
            Ok(n) => Self::Numeric(n),
            Err(_) => Self::Text(s),
        }
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}
