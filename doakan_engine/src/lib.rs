//! Doakan Engine
//!
//! The engine holds the core logic of the Doakan donation platform's payment pipeline. It is provider-agnostic: payment
//! gateways plug in through the [`traits::PaymentGateway`] trait and storage through the management traits.
//!
//! The library is divided into two main sections:
//! 1. Storage ([`traits`] and the SQLite backend, [`SqliteDatabase`]). The data types stored in the database are
//!    defined in [`db_types`] and are public.
//! 2. The public API ([`dkn_api`]). [`TransactionFlowApi`] creates transactions and reconciles gateway notifications;
//!    [`AuthApi`] resolves authenticated users.
pub mod db_types;
pub mod dkn_api;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use dkn_api::{
    auth_api::AuthApi,
    errors::{AuthApiError, TransactionFlowError},
    status_mapping::{GatewayStatusOutcome, StatusMapping, StatusMappingError},
    transaction_flow_api::TransactionFlowApi,
    transaction_objects::{GatewayNotification, ReconcileOutcome},
};
#[cfg(feature = "sqlite")]
pub use sqlite::{db as sqlite_db, SqliteDatabase};
