use thiserror::Error;

use crate::{
    db_types::{NewTransaction, Transaction, TransactionId, TransactionStatus},
    traits::DonationManagement,
};

#[derive(Debug, Clone, Error)]
pub enum TransactionStoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Transaction {0} already exists")]
    TransactionAlreadyExists(TransactionId),
    #[error("Transaction {0} does not exist")]
    TransactionNotFound(TransactionId),
    #[error("Donation #{0} does not exist")]
    DonationNotFound(i64),
    #[error("Cannot move a transaction into the '{0}' state")]
    InvalidTargetStatus(TransactionStatus),
}

impl From<sqlx::Error> for TransactionStoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

/// The outcome of a conditional status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// The transaction was pending and now carries the new status. Any aggregate effects were applied with it.
    Applied(Transaction),
    /// The transaction had already left `pending`. Nothing was changed; the current record is returned.
    AlreadyFinal(Transaction),
}

impl TransitionResult {
    pub fn transaction(&self) -> &Transaction {
        match self {
            Self::Applied(tx) | Self::AlreadyFinal(tx) => tx,
        }
    }

    pub fn into_transaction(self) -> Transaction {
        match self {
            Self::Applied(tx) | Self::AlreadyFinal(tx) => tx,
        }
    }

    pub fn was_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Persistence for payment transactions.
///
/// Transactions are never deleted. Their only mutation is the single move out of `pending`, which goes through
/// [`TransactionManagement::transition_pending_transaction`].
#[allow(async_fn_in_trait)]
pub trait TransactionManagement: DonationManagement {
    /// Stores a new transaction with status `pending`.
    async fn insert_transaction(&self, tx: NewTransaction) -> Result<Transaction, TransactionStoreError>;

    async fn fetch_transaction(&self, id: &TransactionId) -> Result<Option<Transaction>, TransactionStoreError>;

    /// All transactions made by the user, newest first.
    async fn fetch_transactions_for_user(&self, user_id: i64) -> Result<Vec<Transaction>, TransactionStoreError>;

    /// All transactions made against the campaign, newest first.
    async fn fetch_transactions_for_donation(
        &self,
        donation_id: i64,
    ) -> Result<Vec<Transaction>, TransactionStoreError>;

    /// Atomically moves the transaction from `pending` to `status`.
    ///
    /// When `status` is `settled`, the owning campaign's collected amount grows by the transaction amount and its donor
    /// count by one, in the same atomic unit as the status write. If the transaction is no longer pending, nothing is
    /// written and [`TransitionResult::AlreadyFinal`] is returned, which makes redelivered notifications harmless.
    ///
    /// Fails with `TransactionNotFound` if there is no such transaction, and `InvalidTargetStatus` if `status` is not
    /// terminal.
    async fn transition_pending_transaction(
        &self,
        id: &TransactionId,
        status: TransactionStatus,
    ) -> Result<TransitionResult, TransactionStoreError>;
}
