use actix_web::{
    http::{header::HeaderMap, StatusCode},
    test,
    test::TestRequest,
    web,
    App,
};
use chrono::{Duration, Utc};
use doakan_common::Secret;
use doakan_engine::{
    db_types::{Donation, NewTransaction, Role, Rupiah, Transaction, TransactionId, TransactionStatus, User},
    AuthApi,
    TransactionFlowApi,
};
use midtrans_tools::{helpers::notification_signature, MidtransNotification};
use serde_json::Value;

use super::mocks::{MockGateway, MockTransactionManager, MockUserManager};
use crate::{
    auth::{TokenIssuer, TokenValidator},
    config::AuthConfig,
    integrations::midtrans::MidtransNotificationVerifier,
    routes::configure_routes,
};

// DO NOT re-use these secrets anywhere.
pub const JWT_SECRET: &str = "endpoint-tests-jwt-secret-0123456789abcdef";
pub const SERVER_KEY: &str = "SB-Mid-server-endpoint-tests";

pub const OWNER_ID: i64 = 1;
pub const DONOR_ID: i64 = 2;
pub const ADMIN_ID: i64 = 3;
pub const STRANGER_ID: i64 = 4;
pub const DONATION_ID: i64 = 10;

pub fn auth_config() -> AuthConfig {
    AuthConfig::new(JWT_SECRET, Duration::hours(1))
}

pub fn issue_token(user_id: i64) -> String {
    TokenIssuer::new(&auth_config()).issue_token(user_id, Utc::now()).unwrap()
}

pub fn bearer(user_id: i64) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", issue_token(user_id)))
}

pub fn user(id: i64) -> User {
    let role = if id == ADMIN_ID { Role::Admin } else { Role::Donor };
    let now = Utc::now();
    User { id, name: format!("User {id}"), email: format!("user{id}@example.com"), role, created_at: now, updated_at: now }
}

/// A user store that knows every user id except 404.
pub fn users() -> MockUserManager {
    let mut users = MockUserManager::new();
    users.expect_fetch_user().returning(|id| Ok((id != 404).then(|| user(id))));
    users
}

pub fn donation(is_active: bool) -> Donation {
    let now = Utc::now();
    Donation {
        id: DONATION_ID,
        user_id: OWNER_ID,
        title: "Bantu Masjid Al-Ikhlas".into(),
        target_amount: Rupiah::from(10_000_000),
        collected_amount: Rupiah::from(0),
        donor_count: 0,
        is_active,
        created_at: now,
        updated_at: now,
    }
}

pub fn transaction(id: &str, user_id: i64, amount: i64, status: TransactionStatus) -> Transaction {
    let now = Utc::now();
    Transaction {
        id: TransactionId::from(id),
        donation_id: DONATION_ID,
        user_id,
        amount: Rupiah::from(amount),
        status,
        va_number: "880812345678".into(),
        bank: "bca".into(),
        payment_url: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn stored(tx: NewTransaction) -> Transaction {
    let now = Utc::now();
    Transaction {
        id: tx.id,
        donation_id: tx.donation_id,
        user_id: tx.user_id,
        amount: tx.amount,
        status: TransactionStatus::Pending,
        va_number: tx.va_number,
        bank: tx.bank,
        payment_url: tx.payment_url,
        created_at: now,
        updated_at: now,
    }
}

/// A correctly signed Midtrans notification.
pub fn notification(order_id: &str, status: &str, gross_amount: &str) -> MidtransNotification {
    MidtransNotification {
        order_id: order_id.into(),
        status_code: "200".into(),
        gross_amount: gross_amount.into(),
        transaction_status: status.into(),
        signature_key: notification_signature(order_id, "200", gross_amount, SERVER_KEY),
        fraud_status: None,
        payment_type: Some("bank_transfer".into()),
        transaction_id: Some("be03df7d-2f97-4c8c-a53c-8959f1b67295".into()),
        transaction_time: Some("2024-05-01 09:30:00".into()),
    }
}

/// Runs a single request against an app built from the given mocks, and returns the status with the parsed body.
pub async fn send(
    req: TestRequest,
    db: MockTransactionManager,
    gateway: MockGateway,
    users: MockUserManager,
) -> (StatusCode, Value) {
    let (status, _, json) = send_with_headers(req, db, gateway, users).await;
    (status, json)
}

pub async fn send_with_headers(
    req: TestRequest,
    db: MockTransactionManager,
    gateway: MockGateway,
    users: MockUserManager,
) -> (StatusCode, HeaderMap, Value) {
    let app = App::new()
        .app_data(web::Data::new(TransactionFlowApi::new(db, gateway)))
        .app_data(web::Data::new(AuthApi::new(users)))
        .app_data(web::Data::new(TokenValidator::new(&auth_config())))
        .app_data(web::Data::new(MidtransNotificationVerifier::new(Secret::new(SERVER_KEY.to_string()), true)))
        .configure(configure_routes::<MockTransactionManager, MockGateway, MockUserManager>);
    let service = test::init_service(app).await;
    let res = test::call_service(&service, req.to_request()).await;
    let status = res.status();
    let headers = res.headers().clone();
    let body = test::read_body(res).await;
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, headers, json)
}

pub fn assert_error(body: &Value, code: u16, message: &str) {
    assert_eq!(body["meta"]["status"], "error", "{body}");
    assert_eq!(body["meta"]["code"], code, "{body}");
    assert_eq!(body["meta"]["message"], message, "{body}");
    assert!(body["data"].is_null(), "{body}");
}
