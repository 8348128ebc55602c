use std::{collections::HashMap, str::FromStr};

use log::*;
use thiserror::Error;

use crate::{db_types::TransactionStatus, dkn_api::errors::TransactionFlowError};

/// How a provider status string affects a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayStatusOutcome {
    /// The provider has not reached a verdict yet.
    StillPending,
    Final(TransactionStatus),
}

#[derive(Debug, Clone, Error)]
#[error("Invalid status mapping override: {0}")]
pub struct StatusMappingError(String);

/// Table from provider status codes to transaction outcomes. Lookups are case-insensitive. Codes that are not in the
/// table are rejected with `UnknownGatewayStatus`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMapping {
    table: HashMap<String, GatewayStatusOutcome>,
}

impl Default for StatusMapping {
    fn default() -> Self {
        Self::midtrans()
    }
}

impl StatusMapping {
    pub fn empty() -> Self {
        Self { table: HashMap::new() }
    }

    /// Every `transaction_status` Midtrans currently sends, plus the `challenge` pseudo-status for captures held by
    /// fraud screening.
    pub fn midtrans() -> Self {
        use GatewayStatusOutcome::*;
        use TransactionStatus::*;
        Self::empty()
            .with("settlement", Final(Settled))
            .with("capture", Final(Settled))
            .with("expire", Final(Expired))
            .with("cancel", Final(Cancelled))
            .with("deny", Final(Failed))
            .with("failure", Final(Failed))
            .with("pending", StillPending)
            .with("authorize", StillPending)
            .with("challenge", StillPending)
    }

    pub fn with(mut self, code: &str, outcome: GatewayStatusOutcome) -> Self {
        self.table.insert(code.trim().to_lowercase(), outcome);
        self
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn map(&self, code: &str) -> Result<GatewayStatusOutcome, TransactionFlowError> {
        self.table
            .get(code.trim().to_lowercase().as_str())
            .copied()
            .ok_or_else(|| TransactionFlowError::UnknownGatewayStatus(code.to_string()))
    }

    /// Applies overrides of the form `code=status,code=status`, where `status` is `pending` or a terminal status.
    pub fn with_overrides(mut self, overrides: &str) -> Result<Self, StatusMappingError> {
        for entry in overrides.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (code, target) = entry
                .split_once('=')
                .ok_or_else(|| StatusMappingError(format!("'{entry}' is not of the form code=status")))?;
            let code = code.trim();
            if code.is_empty() {
                return Err(StatusMappingError(format!("'{entry}' has an empty status code")));
            }
            let status = TransactionStatus::from_str(target.trim()).map_err(|e| StatusMappingError(e.to_string()))?;
            let outcome = if status.is_terminal() {
                GatewayStatusOutcome::Final(status)
            } else {
                GatewayStatusOutcome::StillPending
            };
            debug!("🔄️ Gateway status '{code}' now maps to {outcome:?}");
            self = self.with(code, outcome);
        }
        Ok(self)
    }
}
