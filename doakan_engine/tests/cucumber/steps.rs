use cucumber::{given, then, when};
use doakan_engine::{
    db_types::{NewDonation, Rupiah, TransactionStatus},
    traits::TransactionManagement,
    GatewayNotification,
    ReconcileOutcome,
    TransactionFlowError,
};

use crate::{cucumber::DonationWorld, support::TestSystem};

#[given(expr = "a donation campaign with a target of {int} IDR")]
async fn campaign(world: &mut DonationWorld, target: i64) {
    let system = TestSystem::new().await;
    let donation = system
        .db()
        .create_donation(NewDonation::new(system.owner.id, "Clean water for Sumba", Rupiah::from(target)))
        .await
        .expect("Error creating campaign");
    world.donation = Some(donation);
    world.system = Some(system);
}

#[when(expr = "a donor gives {int} IDR")]
async fn donate(world: &mut DonationWorld, amount: i64) {
    let sys = world.system();
    let tx = sys
        .api
        .create_transaction(world.donation_id(), sys.donor.id, Rupiah::from(amount))
        .await
        .expect("Error creating transaction");
    world.last_transaction = Some(tx);
}

#[when(expr = "the gateway reports {string} for {int} IDR")]
async fn gateway_reports(world: &mut DonationWorld, status: String, amount: i64) {
    let notification = GatewayNotification::new(world.transaction().id.clone(), status, Rupiah::from(amount));
    let outcome = world.system().api.reconcile(notification).await;
    world.last_outcome = Some(outcome);
}

#[then(expr = "the transaction is {word}")]
async fn transaction_status(world: &mut DonationWorld, status: String) {
    let expected: TransactionStatus = status.parse().expect("Not a transaction status");
    let id = world.transaction().id.clone();
    let stored = world.system().db().fetch_transaction(&id).await.expect("Error fetching transaction");
    assert_eq!(stored.expect("Transaction missing").status, expected);
}

#[then(expr = "the campaign has collected {int} IDR from {int} donor(s)")]
async fn campaign_totals(world: &mut DonationWorld, collected: i64, donors: i64) {
    let donation = world.system().donation(world.donation_id()).await;
    assert_eq!(donation.collected_amount, Rupiah::from(collected));
    assert_eq!(donation.donor_count, donors);
}

#[then("the notification is acknowledged as a replay")]
async fn replayed(world: &mut DonationWorld) {
    assert!(matches!(world.last_outcome, Some(Ok(ReconcileOutcome::Replayed(_)))), "was {:?}", world.last_outcome);
}

#[then("reconciliation fails because the amounts do not match")]
async fn amount_mismatch(world: &mut DonationWorld) {
    assert!(
        matches!(world.last_outcome, Some(Err(TransactionFlowError::AmountMismatch { .. }))),
        "was {:?}",
        world.last_outcome
    );
}

#[then("reconciliation fails because the status is unknown")]
async fn unknown_status(world: &mut DonationWorld) {
    assert!(
        matches!(world.last_outcome, Some(Err(TransactionFlowError::UnknownGatewayStatus(_)))),
        "was {:?}",
        world.last_outcome
    );
}
