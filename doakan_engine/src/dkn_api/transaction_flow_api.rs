use std::fmt::Debug;

use chrono::Utc;
use log::*;

use crate::{
    db_types::{NewTransaction, Rupiah, Transaction, TransactionId, User},
    dkn_api::{
        errors::TransactionFlowError,
        status_mapping::{GatewayStatusOutcome, StatusMapping},
        transaction_objects::{GatewayNotification, ReconcileOutcome},
    },
    traits::{PaymentGateway, TransactionManagement, TransitionResult},
};

/// `TransactionFlowApi` is the owner of the transaction state machine.
///
/// ```text
///             ┌──> settled
///  pending ───┼──> expired
///             ├──> cancelled
///             └──> failed
/// ```
///
/// Transactions are created `pending` by [`Self::create_transaction`] and are moved exactly once, by
/// [`Self::reconcile`], in response to gateway notifications.
pub struct TransactionFlowApi<B, G> {
    db: B,
    gateway: G,
    status_mapping: StatusMapping,
}

impl<B, G> Debug for TransactionFlowApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TransactionFlowApi ({} gateway status codes)", self.status_mapping.len())
    }
}

impl<B, G> TransactionFlowApi<B, G> {
    pub fn new(db: B, gateway: G) -> Self {
        Self { db, gateway, status_mapping: StatusMapping::default() }
    }

    pub fn with_status_mapping(mut self, status_mapping: StatusMapping) -> Self {
        self.status_mapping = status_mapping;
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn status_mapping(&self) -> &StatusMapping {
        &self.status_mapping
    }
}

impl<B, G> TransactionFlowApi<B, G>
where
    B: TransactionManagement,
    G: PaymentGateway,
{
    /// Opens a charge at the payment gateway and records a new `pending` transaction for it.
    ///
    /// The gateway is called before anything is stored, so a failed charge leaves no trace and the whole call can be
    /// retried when the error [is retryable](TransactionFlowError::is_retryable). The reverse case, a charge that was
    /// created but could not be stored, cannot be undone from here and is logged for manual reconciliation.
    pub async fn create_transaction(
        &self,
        donation_id: i64,
        user_id: i64,
        amount: Rupiah,
    ) -> Result<Transaction, TransactionFlowError> {
        let donation =
            self.db.fetch_donation(donation_id).await?.ok_or(TransactionFlowError::DonationNotFound(donation_id))?;
        if !donation.is_active {
            debug!("🔄️ User #{user_id} tried to donate to closed donation #{donation_id}");
            return Err(TransactionFlowError::DonationClosed(donation_id));
        }
        if !amount.is_positive() {
            return Err(TransactionFlowError::InvalidAmount(amount));
        }
        let order_ref = TransactionId::generate(Utc::now());
        trace!("🔄️ Requesting a charge of {amount} for donation #{donation_id} as [{order_ref}]");
        let instructions = self.gateway.create_charge(&order_ref, amount).await.map_err(|e| {
            warn!("🔄️ Could not create a charge for [{order_ref}]. {e}");
            TransactionFlowError::from(e)
        })?;
        let new_tx = NewTransaction {
            id: order_ref.clone(),
            donation_id,
            user_id,
            amount,
            va_number: instructions.va_number,
            bank: instructions.bank,
            payment_url: instructions.payment_url,
        };
        let tx = self.db.insert_transaction(new_tx.clone()).await.map_err(|e| {
            error!(
                "🔄️ The gateway created a charge for [{order_ref}] ({amount} to {} VA {}) but the transaction could \
                 not be saved. This charge needs manual reconciliation. {e}",
                new_tx.bank, new_tx.va_number
            );
            TransactionFlowError::from(e)
        })?;
        info!("🔄️ Transaction [{}] created. {} from user #{user_id} to donation #{donation_id}", tx.id, tx.amount);
        Ok(tx)
    }

    /// Applies a gateway notification to its transaction.
    ///
    /// Checks run in order, and none of the failures touch storage:
    /// 1. the transaction must exist (`TransactionNotFound`),
    /// 2. the reported amount must equal the stored amount (`AmountMismatch`),
    /// 3. the status code must be known (`UnknownGatewayStatus`).
    ///
    /// The transition itself is a compare-and-set on `pending`, so duplicate and out-of-order deliveries resolve to
    /// [`ReconcileOutcome::Replayed`] without any further effect.
    pub async fn reconcile(&self, notification: GatewayNotification) -> Result<ReconcileOutcome, TransactionFlowError> {
        let GatewayNotification { order_ref, external_status, reported_amount } = notification;
        let tx = self.db.fetch_transaction(&order_ref).await?.ok_or_else(|| {
            warn!("🔄️ Received a '{external_status}' notification for unknown transaction [{order_ref}]");
            TransactionFlowError::TransactionNotFound(order_ref.clone())
        })?;
        if tx.amount != reported_amount {
            warn!(
                "🔄️ Notification for [{order_ref}] reports {reported_amount}, but the transaction is for {}. Ignoring \
                 it.",
                tx.amount
            );
            return Err(TransactionFlowError::AmountMismatch { id: order_ref, expected: tx.amount, reported: reported_amount });
        }
        let target = match self.status_mapping.map(&external_status) {
            Ok(GatewayStatusOutcome::Final(status)) => status,
            Ok(GatewayStatusOutcome::StillPending) => {
                debug!("🔄️ Gateway reports [{order_ref}] as '{external_status}'. Still waiting for a final status.");
                return Ok(ReconcileOutcome::StillPending(tx));
            },
            Err(e) => {
                warn!("🔄️ Notification for [{order_ref}] carries an unknown status '{external_status}'. Ignoring it.");
                return Err(e);
            },
        };
        if tx.status.is_terminal() {
            debug!("🔄️ [{order_ref}] is already {}. Ignoring repeated '{external_status}' notification.", tx.status);
            return Ok(ReconcileOutcome::Replayed(tx));
        }
        match self.db.transition_pending_transaction(&order_ref, target).await? {
            TransitionResult::Applied(tx) => {
                info!("🔄️ Transaction [{order_ref}] is now {}", tx.status);
                Ok(ReconcileOutcome::Transitioned(tx))
            },
            TransitionResult::AlreadyFinal(tx) => {
                debug!("🔄️ [{order_ref}] became {} concurrently. Nothing to do.", tx.status);
                Ok(ReconcileOutcome::Replayed(tx))
            },
        }
    }

    pub async fn transactions_for_user(&self, user_id: i64) -> Result<Vec<Transaction>, TransactionFlowError> {
        let txs = self.db.fetch_transactions_for_user(user_id).await?;
        trace!("🔄️ Fetched {} transactions for user #{user_id}", txs.len());
        Ok(txs)
    }

    /// Lists a campaign's transactions. Only the campaign owner and admins may see them.
    pub async fn transactions_for_donation(
        &self,
        donation_id: i64,
        requester: &User,
    ) -> Result<Vec<Transaction>, TransactionFlowError> {
        let donation =
            self.db.fetch_donation(donation_id).await?.ok_or(TransactionFlowError::DonationNotFound(donation_id))?;
        if !(donation.is_owned_by(requester.id) || requester.is_admin()) {
            return Err(TransactionFlowError::NotDonationOwner { donation_id, user_id: requester.id });
        }
        let txs = self.db.fetch_transactions_for_donation(donation_id).await?;
        Ok(txs)
    }
}
