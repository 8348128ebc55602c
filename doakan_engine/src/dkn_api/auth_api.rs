use std::fmt::Debug;

use log::*;

use crate::{dkn_api::errors::AuthApiError, db_types::User, traits::UserManagement};

/// Resolves token subjects into users.
pub struct AuthApi<B> {
    db: B,
}

impl<B> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi")
    }
}

impl<B> AuthApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AuthApi<B>
where B: UserManagement
{
    /// Fetches the user named by a token's `user_id` claim. A user that has since been removed is an error.
    pub async fn resolve_user(&self, user_id: i64) -> Result<User, AuthApiError> {
        let user = self.db.fetch_user(user_id).await?;
        match user {
            Some(user) => {
                trace!("🔐️ Resolved token subject #{user_id} to {} ({})", user.email, user.role);
                Ok(user)
            },
            None => {
                debug!("🔐️ Token subject #{user_id} does not exist");
                Err(AuthApiError::UserNotFound(user_id))
            },
        }
    }
}
