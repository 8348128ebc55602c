//! `SqliteDatabase` is a concrete implementation of a Doakan engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate, SqlitePool};

use super::db::{db_url, donations, new_pool, transactions, users};
use crate::{
    db_types::{Donation, NewDonation, NewTransaction, NewUser, Transaction, TransactionId, TransactionStatus, User},
    traits::{
        DonationManagement,
        TransactionManagement,
        TransactionStoreError,
        TransitionResult,
        UserManagement,
        UserStoreError,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using the `DKN_DATABASE_URL` environment variable (or the default).
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&mut self) -> Result<(), sqlx::Error> {
        self.pool.close().await;
        Ok(())
    }

    /// Brings the schema up to date. Safe to call on every startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    // User and campaign management belongs to other services. These two writers exist for seeding and tests.
    pub async fn create_user(&self, user: NewUser) -> Result<User, UserStoreError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::insert_user(user, &mut conn).await?;
        Ok(user)
    }

    pub async fn create_donation(&self, donation: NewDonation) -> Result<Donation, TransactionStoreError> {
        let mut conn = self.pool.acquire().await?;
        let donation = donations::insert_donation(donation, &mut conn).await?;
        Ok(donation)
    }

    pub async fn set_donation_active(&self, donation_id: i64, is_active: bool) -> Result<Donation, TransactionStoreError> {
        let mut conn = self.pool.acquire().await?;
        donations::set_donation_active(donation_id, is_active, &mut conn)
            .await?
            .ok_or(TransactionStoreError::DonationNotFound(donation_id))
    }
}

impl UserManagement for SqliteDatabase {
    async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, UserStoreError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user_by_id(user_id, &mut conn).await?;
        Ok(user)
    }
}

impl DonationManagement for SqliteDatabase {
    async fn fetch_donation(&self, donation_id: i64) -> Result<Option<Donation>, TransactionStoreError> {
        let mut conn = self.pool.acquire().await?;
        let donation = donations::fetch_donation_by_id(donation_id, &mut conn).await?;
        Ok(donation)
    }
}

impl TransactionManagement for SqliteDatabase {
    async fn insert_transaction(&self, tx: NewTransaction) -> Result<Transaction, TransactionStoreError> {
        let mut conn = self.pool.acquire().await?;
        transactions::insert_transaction(tx, &mut conn).await
    }

    async fn fetch_transaction(&self, id: &TransactionId) -> Result<Option<Transaction>, TransactionStoreError> {
        let mut conn = self.pool.acquire().await?;
        let tx = transactions::fetch_transaction(id, &mut conn).await?;
        Ok(tx)
    }

    async fn fetch_transactions_for_user(&self, user_id: i64) -> Result<Vec<Transaction>, TransactionStoreError> {
        let mut conn = self.pool.acquire().await?;
        let txs = transactions::fetch_transactions_for_user(user_id, &mut conn).await?;
        Ok(txs)
    }

    async fn fetch_transactions_for_donation(
        &self,
        donation_id: i64,
    ) -> Result<Vec<Transaction>, TransactionStoreError> {
        let mut conn = self.pool.acquire().await?;
        let txs = transactions::fetch_transactions_for_donation(donation_id, &mut conn).await?;
        Ok(txs)
    }

    /// The conditional status write and the campaign increment share one SQLite transaction. If either fails, the
    /// transaction is dropped without committing and SQLite rolls both back.
    async fn transition_pending_transaction(
        &self,
        id: &TransactionId,
        status: TransactionStatus,
    ) -> Result<TransitionResult, TransactionStoreError> {
        if !status.is_terminal() {
            return Err(TransactionStoreError::InvalidTargetStatus(status));
        }
        let mut tx = self.pool.begin().await?;
        let updated = transactions::update_status_if_pending(id, status, &mut tx).await?;
        let result = match updated {
            Some(transaction) => {
                if status == TransactionStatus::Settled {
                    let found = donations::add_settled_amount(transaction.donation_id, transaction.amount, &mut tx).await?;
                    if !found {
                        error!(
                            "🗃️ Transaction [{id}] refers to donation #{} which does not exist. The settlement has \
                             been rolled back.",
                            transaction.donation_id
                        );
                        return Err(TransactionStoreError::DonationNotFound(transaction.donation_id));
                    }
                    debug!("🗃️ Donation #{} credited with {}", transaction.donation_id, transaction.amount);
                }
                TransitionResult::Applied(transaction)
            },
            None => {
                let current = transactions::fetch_transaction(id, &mut tx)
                    .await?
                    .ok_or_else(|| TransactionStoreError::TransactionNotFound(id.clone()))?;
                trace!("🗃️ Transaction [{id}] is already {}. Nothing to do.", current.status);
                TransitionResult::AlreadyFinal(current)
            },
        };
        tx.commit().await?;
        Ok(result)
    }
}
