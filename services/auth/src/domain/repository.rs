#![allow(async_fn_in_trait)]

use serde_json::Value;

use crate::domain::types::{RowFilter, Session, UserIdentity};
use crate::error::AuthServiceError;

/// Port for the external identity service (credential storage and sessions).
pub trait IdentityService: Send + Sync {
    /// Create an identity. With `pre_confirmed` the email is marked verified and
    /// no confirmation mail is sent.
    async fn create_identity(
        &self,
        email: &str,
        password: &str,
        pre_confirmed: bool,
    ) -> Result<UserIdentity, AuthServiceError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserIdentity>, AuthServiceError>;

    /// Delete an identity. Deleting an id that no longer exists is not an error.
    async fn delete_identity(&self, id: &str) -> Result<(), AuthServiceError>;

    /// Password sign-in. Rejected credentials are `InvalidCredentials`.
    async fn authenticate(&self, email: &str, password: &str)
    -> Result<Session, AuthServiceError>;
}

/// Port for the external table store. Rows travel as JSON objects.
pub trait RecordStore: Send + Sync {
    /// Insert one row and return it as stored.
    async fn insert(&self, table: &str, row: &Value) -> Result<Value, AuthServiceError>;

    async fn select(&self, table: &str, filter: &RowFilter)
    -> Result<Vec<Value>, AuthServiceError>;

    /// Delete every row matching `filter`.
    async fn delete(&self, table: &str, filter: &RowFilter) -> Result<(), AuthServiceError>;
}
