#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use doakan_engine::{
    db_types::{Donation, NewDonation, NewUser, Role, Rupiah, TransactionId, User},
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    traits::{ChargeInstructions, GatewayError, PaymentGateway},
    SqliteDatabase,
    TransactionFlowApi,
};

/// A gateway that always answers the same way and counts how often it was asked.
#[derive(Clone, Default)]
pub struct FakeGateway {
    pub failure: Option<GatewayError>,
    pub calls: Arc<AtomicUsize>,
}

impl FakeGateway {
    pub fn failing(e: GatewayError) -> Self {
        Self { failure: Some(e), calls: Arc::default() }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PaymentGateway for FakeGateway {
    async fn create_charge(&self, order_ref: &TransactionId, _amount: Rupiah) -> Result<ChargeInstructions, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(e) => Err(e.clone()),
            None => Ok(ChargeInstructions {
                va_number: format!("8808{}", &order_ref.as_str()[order_ref.as_str().len() - 8..]),
                bank: "bca".to_string(),
                payment_url: None,
            }),
        }
    }
}

pub struct TestSystem {
    pub api: TransactionFlowApi<SqliteDatabase, FakeGateway>,
    pub owner: User,
    pub donor: User,
    pub admin: User,
    pub donation: Donation,
}

impl TestSystem {
    pub async fn new() -> Self {
        Self::with_gateway(FakeGateway::default()).await
    }

    pub async fn with_gateway(gateway: FakeGateway) -> Self {
        let db = prepare_test_env(&random_db_path()).await;
        let owner = db.create_user(NewUser::new("Siti", "siti@doakan.id")).await.expect("Error creating owner");
        let donor = db.create_user(NewUser::new("Budi", "budi@doakan.id")).await.expect("Error creating donor");
        let admin = db
            .create_user(NewUser::new("Admin", "admin@doakan.id").with_role(Role::Admin))
            .await
            .expect("Error creating admin");
        let donation = db
            .create_donation(NewDonation::new(owner.id, "Masjid renovation", Rupiah::from(10_000_000)))
            .await
            .expect("Error creating donation");
        let api = TransactionFlowApi::new(db, gateway);
        Self { api, owner, donor, admin, donation }
    }

    pub fn db(&self) -> &SqliteDatabase {
        self.api.db()
    }

    pub async fn donation(&self, id: i64) -> Donation {
        use doakan_engine::traits::DonationManagement;
        self.db().fetch_donation(id).await.expect("Error fetching donation").expect("Donation does not exist")
    }
}
