use log::debug;
use sqlx::SqliteConnection;

use crate::db_types::{NewUser, User};

pub async fn insert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<User, sqlx::Error> {
    let user: User = sqlx::query_as::<_, User>("INSERT INTO users (name, email, role) VALUES ($1, $2, $3) RETURNING *")
        .bind(user.name)
        .bind(user.email)
        .bind(user.role)
        .fetch_all(conn)
        .await?
        .pop()
        .ok_or(sqlx::Error::RowNotFound)?;
    debug!("🗃️ User #{} ({}) created", user.id, user.role);
    Ok(user)
}

pub async fn fetch_user_by_id(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(user_id).fetch_optional(conn).await
}
