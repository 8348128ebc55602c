use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::{Rupiah, TransactionId};

/// Where and how the donor should pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeInstructions {
    pub va_number: String,
    pub bank: String,
    pub payment_url: Option<String>,
}

/// Gateway failures come in exactly two flavours, and only one of them may be retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Transport or provider infrastructure failure, including timeouts. No charge was created.
    #[error("The payment gateway is unavailable. {0}")]
    Unavailable(String),
    /// The provider understood the request and refused it.
    #[error("The payment gateway rejected the charge. {0}")]
    Rejected(String),
}

impl GatewayError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// A stateless adapter over a provider's charge-creation API.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    /// Asks the provider to open a charge for `amount` under the reference `order_ref`.
    async fn create_charge(&self, order_ref: &TransactionId, amount: Rupiah) -> Result<ChargeInstructions, GatewayError>;
}
