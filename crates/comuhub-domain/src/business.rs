use serde::{Deserialize, Serialize};

/// Table holding the business owned by a `negocio` profile.
pub const BUSINESSES_TABLE: &str = "businesses";

/// Row of the `businesses` table; at most one per profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Business {
    pub user_id: String,
    pub name: String,
    /// Colombian tax id (Número de Identificación Tributaria).
    pub nit: String,
    pub address: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    /// Business category; the column is nullable until the catalogue is wired in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_id: Option<i64>,
}
