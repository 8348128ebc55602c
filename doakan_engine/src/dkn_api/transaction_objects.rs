use serde::{Deserialize, Serialize};

use crate::db_types::{Rupiah, Transaction, TransactionId};

/// A gateway callback reduced to the three facts reconciliation needs. Provider-specific payloads are converted into
/// this after their authenticity has been checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayNotification {
    pub order_ref: TransactionId,
    pub external_status: String,
    pub reported_amount: Rupiah,
}

impl GatewayNotification {
    pub fn new<S: Into<String>>(order_ref: TransactionId, external_status: S, reported_amount: Rupiah) -> Self {
        Self { order_ref, external_status: external_status.into(), reported_amount }
    }
}

/// What reconciliation did with a notification. None of these are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The transaction left `pending` because of this notification.
    Transitioned(Transaction),
    /// The transaction had already reached a terminal state. Nothing changed.
    Replayed(Transaction),
    /// The gateway reported an intermediate state. Nothing changed.
    StillPending(Transaction),
}

impl ReconcileOutcome {
    pub fn transaction(&self) -> &Transaction {
        match self {
            Self::Transitioned(tx) | Self::Replayed(tx) | Self::StillPending(tx) => tx,
        }
    }
}
