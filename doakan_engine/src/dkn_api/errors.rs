use thiserror::Error;

use crate::{
    db_types::{Rupiah, TransactionId},
    traits::{GatewayError, TransactionStoreError, UserStoreError},
};

#[derive(Debug, Clone, Error)]
pub enum TransactionFlowError {
    #[error("Donation #{0} does not exist")]
    DonationNotFound(i64),
    #[error("Donation #{0} is closed and no longer accepts donations")]
    DonationClosed(i64),
    #[error("Donation amount must be positive, but was {0}")]
    InvalidAmount(Rupiah),
    #[error("The payment gateway is unavailable. Please try again later. {0}")]
    GatewayUnavailable(String),
    #[error("The payment gateway rejected the charge. {0}")]
    GatewayRejected(String),
    #[error("Transaction {0} does not exist")]
    TransactionNotFound(TransactionId),
    #[error("Transaction {id} is for {expected}, but the gateway reported {reported}")]
    AmountMismatch { id: TransactionId, expected: Rupiah, reported: Rupiah },
    #[error("Unknown payment gateway status '{0}'")]
    UnknownGatewayStatus(String),
    #[error("User #{user_id} may not view the transactions of donation #{donation_id}")]
    NotDonationOwner { donation_id: i64, user_id: i64 },
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl TransactionFlowError {
    /// Only a gateway outage is worth retrying: nothing durable happened, and the next attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::GatewayUnavailable(_))
    }
}

impl From<TransactionStoreError> for TransactionFlowError {
    fn from(e: TransactionStoreError) -> Self {
        match e {
            TransactionStoreError::TransactionNotFound(id) => Self::TransactionNotFound(id),
            TransactionStoreError::DonationNotFound(id) => Self::DonationNotFound(id),
            e => Self::DatabaseError(e.to_string()),
        }
    }
}

impl From<GatewayError> for TransactionFlowError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Unavailable(s) => Self::GatewayUnavailable(s),
            GatewayError::Rejected(s) => Self::GatewayRejected(s),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User #{0} does not exist")]
    UserNotFound(i64),
}

impl From<UserStoreError> for AuthApiError {
    fn from(e: UserStoreError) -> Self {
        match e {
            UserStoreError::DatabaseError(s) => Self::DatabaseError(s),
        }
    }
}
