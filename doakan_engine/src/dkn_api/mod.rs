//! The public face of the engine.
//!
//! * [`transaction_flow_api::TransactionFlowApi`] owns the transaction state machine: charge creation, webhook
//!   reconciliation and read access to transaction history.
//! * [`auth_api::AuthApi`] resolves the subject of a validated access token into a user record.
pub mod auth_api;
pub mod errors;
pub mod status_mapping;
pub mod transaction_flow_api;
pub mod transaction_objects;
