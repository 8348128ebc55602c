use thiserror::Error;

use crate::db_types::User;

#[derive(Debug, Clone, Error)]
pub enum UserStoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for UserStoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

/// Read access to the user store, used to resolve the subject of an access token into a full user record.
#[allow(async_fn_in_trait)]
pub trait UserManagement {
    async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, UserStoreError>;
}
