use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Table holding one profile per identity.
pub const PROFILES_TABLE: &str = "profiles";

/// Row of the `profiles` table. `id` is the identity id (shared primary key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub role: Role,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
}
