//! Account role.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of account a profile represents.
///
/// Wire format: lowercase Spanish names (`"cliente"`, `"negocio"`), matching
/// the `profiles.role` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Customer account.
    Cliente,
    /// Business owner; registration also creates a `businesses` row.
    Negocio,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cliente => "cliente",
            Self::Negocio => "negocio",
        }
    }

    pub fn requires_business(self) -> bool {
        matches!(self, Self::Negocio)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role {0:?} (expected \"cliente\" or \"negocio\")")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cliente" => Ok(Self::Cliente),
            "negocio" => Ok(Self::Negocio),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}
