//! Thin client for the parts of the Midtrans Core API used by the donation backend: bank-transfer charge creation and
//! HTTP notification payloads.
mod api;
mod config;
mod data_objects;
mod error;

pub mod helpers;

pub use api::MidtransApi;
pub use config::{MidtransConfig, DEFAULT_BANK, DEFAULT_GATEWAY_TIMEOUT, SANDBOX_API_URL};
pub use data_objects::{
    Action,
    BankTransfer,
    ChargeRequest,
    ChargeResponse,
    MidtransNotification,
    TransactionDetails,
    VaNumber,
};
pub use error::MidtransApiError;
