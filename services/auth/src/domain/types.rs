use serde::Deserialize;

/// Identity record owned by the identity service. The password never leaves
/// the request that created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    /// Opaque id assigned by the identity service; also the profile's primary key.
    pub id: String,
    pub email: String,
    pub email_confirmed: bool,
}

/// Tokens issued by a successful password sign-in. Not persisted here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: SessionUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub email: String,
}

/// Equality filter on a single column (`column = value`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    pub column: String,
    pub value: String,
}

impl RowFilter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Whether a JSON row satisfies the filter. String columns only.
    pub fn matches(&self, row: &serde_json::Value) -> bool {
        row.get(&self.column).and_then(|v| v.as_str()) == Some(self.value.as_str())
    }
}

/// Emails are compared case-insensitively by the identity service; normalize
/// before lookups so the duplicate check agrees with it.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
