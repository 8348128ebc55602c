//! Adapters between provider-specific APIs and the engine's traits.
pub mod midtrans;
