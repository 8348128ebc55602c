use std::str::FromStr;

use doakan_common::{Rupiah, Secret};
use doakan_engine::{
    db_types::TransactionId,
    traits::{ChargeInstructions, GatewayError, PaymentGateway},
    GatewayNotification,
};
use log::*;
use midtrans_tools::{helpers::verify_notification_signature, MidtransApi, MidtransApiError, MidtransNotification};

use crate::errors::ServerError;

/// [`PaymentGateway`] backed by Midtrans bank-transfer (virtual account) charges.
#[derive(Clone)]
pub struct MidtransGateway {
    api: MidtransApi,
}

impl MidtransGateway {
    pub fn new(api: MidtransApi) -> Self {
        Self { api }
    }
}

impl PaymentGateway for MidtransGateway {
    async fn create_charge(&self, order_ref: &TransactionId, amount: Rupiah) -> Result<ChargeInstructions, GatewayError> {
        let response = self.api.bank_transfer_charge(order_ref.as_str(), amount).await.map_err(to_gateway_error)?;
        let va = response.virtual_account().ok_or_else(|| {
            GatewayError::Rejected(format!("Midtrans did not return a virtual account for {order_ref}"))
        })?;
        debug!("💳️ Midtrans issued {} VA {} for [{order_ref}]", va.bank, va.va_number);
        Ok(ChargeInstructions { va_number: va.va_number, bank: va.bank, payment_url: response.payment_url() })
    }
}

fn to_gateway_error(e: MidtransApiError) -> GatewayError {
    if e.is_transient() {
        GatewayError::Unavailable(e.to_string())
    } else {
        GatewayError::Rejected(e.to_string())
    }
}

/// Checks the `signature_key` of incoming notifications.
#[derive(Clone, Debug)]
pub struct MidtransNotificationVerifier {
    server_key: Secret<String>,
    enabled: bool,
}

impl MidtransNotificationVerifier {
    pub fn new(server_key: Secret<String>, enabled: bool) -> Self {
        Self { server_key, enabled }
    }

    pub fn verify(&self, notification: &MidtransNotification) -> Result<(), ServerError> {
        if !self.enabled {
            trace!("💳️ Signature checks are disabled. Accepting notification for {}", notification.order_id);
            return Ok(());
        }
        if verify_notification_signature(notification, self.server_key.reveal()) {
            trace!("💳️ Signature check for {} ✅️", notification.order_id);
            Ok(())
        } else {
            warn!("💳️ Invalid signature on notification for {}. Discarding it.", notification.order_id);
            Err(ServerError::InvalidSignature)
        }
    }
}

/// Reduces a (verified) Midtrans notification to what reconciliation needs. `gross_amount` must be a whole number of
/// Rupiah, e.g. "50000.00".
pub fn normalize_notification(notification: &MidtransNotification) -> Result<GatewayNotification, ServerError> {
    let amount = Rupiah::from_str(notification.gross_amount.trim()).map_err(|e| {
        ServerError::InvalidRequestBody(format!("Invalid gross_amount '{}'. {e}", notification.gross_amount))
    })?;
    let order_ref = TransactionId::from(notification.order_id.trim());
    Ok(GatewayNotification::new(order_ref, notification.effective_status(), amount))
}
