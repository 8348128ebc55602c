//! Storage and gateway contracts for the engine.
//!
//! Backends (see [`crate::SqliteDatabase`]) implement the management traits; payment providers implement
//! [`PaymentGateway`]. The APIs in [`crate::dkn_api`] are generic over these traits so that either side can be swapped
//! out or mocked.
mod donation_management;
mod payment_gateway;
mod transaction_management;
mod user_management;

pub use donation_management::DonationManagement;
pub use payment_gateway::{ChargeInstructions, GatewayError, PaymentGateway};
pub use transaction_management::{TransactionManagement, TransactionStoreError, TransitionResult};
pub use user_management::{UserManagement, UserStoreError};
