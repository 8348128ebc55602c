use actix_web::http::StatusCode;
use chrono::{DateTime, Utc};
use doakan_engine::db_types::{Rupiah, Transaction, TransactionId, TransactionStatus};
use serde::{Deserialize, Serialize};

/// Every JSON response, successful or not, is wrapped in this envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub meta: Meta,
    pub data: Option<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub message: String,
    pub code: u16,
    pub status: String,
}

impl<T> ApiResponse<T> {
    pub fn success<S: Into<String>>(code: StatusCode, message: S, data: T) -> Self {
        Self { meta: Meta { message: message.into(), code: code.as_u16(), status: "success".into() }, data: Some(data) }
    }

    pub fn error<S: Into<String>>(code: StatusCode, message: S) -> Self {
        Self { meta: Meta { message: message.into(), code: code.as_u16(), status: "error".into() }, data: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransactionRequest {
    #[serde(alias = "donationID")]
    pub donation_id: i64,
    pub amount: Rupiah,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub id: TransactionId,
    pub donation_id: i64,
    pub user_id: i64,
    pub amount: Rupiah,
    /// The amount formatted for display, e.g. "Rp 50.000,00"
    pub amount_idr: String,
    pub status: TransactionStatus,
    pub va_number: String,
    pub bank: String,
    pub payment_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            amount_idr: tx.amount.to_string(),
            id: tx.id,
            donation_id: tx.donation_id,
            user_id: tx.user_id,
            amount: tx.amount,
            status: tx.status,
            va_number: tx.va_number,
            bank: tx.bank,
            payment_url: tx.payment_url,
            created_at: tx.created_at,
            updated_at: tx.updated_at,
        }
    }
}

/// What the gateway gets back after a notification was handled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationAck {
    pub order_id: TransactionId,
    pub status: Option<TransactionStatus>,
}
