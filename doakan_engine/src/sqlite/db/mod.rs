//! Low-level query functions. Each takes a `&mut SqliteConnection` so that callers can compose several of them inside
//! one transaction by passing `&mut *tx`.
use std::{env, str::FromStr, time::Duration};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

pub mod donations;
pub mod transactions;
pub mod users;

pub const SQLITE_DB_URL: &str = "sqlite://data/doakan.db";
// Writers queue on the database lock for at most this long before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

pub fn db_url() -> String {
    let result = env::var("DKN_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ DKN_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}
