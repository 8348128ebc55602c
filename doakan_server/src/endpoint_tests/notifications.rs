use actix_web::{http::StatusCode, test::TestRequest};
use doakan_engine::{
    db_types::TransactionStatus,
    traits::{TransactionStoreError, TransitionResult},
};
use midtrans_tools::MidtransNotification;

use super::{
    helpers::*,
    mocks::{MockGateway, MockTransactionManager, MockUserManager},
};

const ORDER_ID: &str = "DKN-20240501093000-0a1b2c3d";

fn notify(notification: &MidtransNotification) -> TestRequest {
    TestRequest::post().uri("/api/v1/transactions/notification").set_json(notification)
}

async fn deliver(req: TestRequest, db: MockTransactionManager) -> (StatusCode, serde_json::Value) {
    let mut users = MockUserManager::new();
    users.expect_fetch_user().never();
    send(req, db, MockGateway::new(), users).await
}

fn db_with(status: TransactionStatus) -> MockTransactionManager {
    let mut db = MockTransactionManager::new();
    db.expect_fetch_transaction()
        .withf(|id| id.as_str() == ORDER_ID)
        .returning(move |_| Ok(Some(transaction(ORDER_ID, DONOR_ID, 50_000, status))));
    db.expect_fetch_transaction().returning(|_| Ok(None));
    db
}

#[actix_web::test]
async fn settlement_is_applied() {
    let _ = env_logger::try_init();
    let mut db = db_with(TransactionStatus::Pending);
    db.expect_transition_pending_transaction()
        .withf(|id, status| id.as_str() == ORDER_ID && *status == TransactionStatus::Settled)
        .times(1)
        .returning(|_, status| Ok(TransitionResult::Applied(transaction(ORDER_ID, DONOR_ID, 50_000, status))));
    let (status, body) = deliver(notify(&notification(ORDER_ID, "settlement", "50000.00")), db).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["status"], "success");
    assert_eq!(body["meta"]["message"], "Notification processed");
    assert_eq!(body["data"]["order_id"], ORDER_ID);
    assert_eq!(body["data"]["status"], "settled");
}

#[actix_web::test]
async fn expiry_is_applied() {
    let _ = env_logger::try_init();
    let mut db = db_with(TransactionStatus::Pending);
    db.expect_transition_pending_transaction()
        .withf(|_, status| *status == TransactionStatus::Expired)
        .times(1)
        .returning(|_, status| Ok(TransitionResult::Applied(transaction(ORDER_ID, DONOR_ID, 50_000, status))));
    let (status, body) = deliver(notify(&notification(ORDER_ID, "expire", "50000.00")), db).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "expired");
}

#[actix_web::test]
async fn replays_are_acknowledged() {
    let _ = env_logger::try_init();
    let mut db = db_with(TransactionStatus::Settled);
    db.expect_transition_pending_transaction().never();
    let (status, body) = deliver(notify(&notification(ORDER_ID, "settlement", "50000.00")), db).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["message"], "Notification already processed");
    assert_eq!(body["data"]["status"], "settled");
}

#[actix_web::test]
async fn concurrent_replay_is_acknowledged() {
    let _ = env_logger::try_init();
    let mut db = db_with(TransactionStatus::Pending);
    db.expect_transition_pending_transaction().returning(|_, _| {
        Ok(TransitionResult::AlreadyFinal(transaction(ORDER_ID, DONOR_ID, 50_000, TransactionStatus::Settled)))
    });
    let (status, body) = deliver(notify(&notification(ORDER_ID, "settlement", "50000.00")), db).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["message"], "Notification already processed");
}

#[actix_web::test]
async fn intermediate_statuses_change_nothing() {
    let _ = env_logger::try_init();
    let mut db = db_with(TransactionStatus::Pending);
    db.expect_transition_pending_transaction().never();
    let (status, body) = deliver(notify(&notification(ORDER_ID, "pending", "50000.00")), db).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "pending");

    let mut db = db_with(TransactionStatus::Pending);
    db.expect_transition_pending_transaction().never();
    let mut challenged = notification(ORDER_ID, "capture", "50000.00");
    challenged.fraud_status = Some("challenge".into());
    let (status, _) = deliver(notify(&challenged), db).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn unknown_statuses_are_acknowledged() {
    let _ = env_logger::try_init();
    let mut db = db_with(TransactionStatus::Pending);
    db.expect_transition_pending_transaction().never();
    let (status, body) = deliver(notify(&notification(ORDER_ID, "refund", "50000.00")), db).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["status"], "success");
    assert!(body["data"]["status"].is_null());
}

#[actix_web::test]
async fn invalid_signature() {
    let _ = env_logger::try_init();
    let mut db = MockTransactionManager::new();
    db.expect_fetch_transaction().never();
    db.expect_transition_pending_transaction().never();
    let mut forged = notification(ORDER_ID, "settlement", "50000.00");
    forged.signature_key = notification(ORDER_ID, "settlement", "1.00").signature_key;
    let (status, body) = deliver(notify(&forged), db).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error(&body, 400, "The notification signature is invalid");
}

#[actix_web::test]
async fn unknown_transaction() {
    let _ = env_logger::try_init();
    let mut db = db_with(TransactionStatus::Pending);
    db.expect_transition_pending_transaction().never();
    let other = "DKN-20240501093000-ffffffff";
    let (status, body) = deliver(notify(&notification(other, "settlement", "50000.00")), db).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error(&body, 404, "Transaction DKN-20240501093000-ffffffff does not exist");
}

#[actix_web::test]
async fn amount_mismatch() {
    let _ = env_logger::try_init();
    let mut db = db_with(TransactionStatus::Pending);
    db.expect_transition_pending_transaction().never();
    let (status, body) = deliver(notify(&notification(ORDER_ID, "settlement", "5000.00")), db).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["meta"]["status"], "error");
    assert_eq!(body["meta"]["code"], 400);
}

#[actix_web::test]
async fn fractional_amounts_are_rejected() {
    let _ = env_logger::try_init();
    let mut db = MockTransactionManager::new();
    db.expect_fetch_transaction().never();
    let (status, body) = deliver(notify(&notification(ORDER_ID, "settlement", "50000.50")), db).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["meta"]["code"], 400);
}

#[actix_web::test]
async fn malformed_payload() {
    let _ = env_logger::try_init();
    let req = TestRequest::post()
        .uri("/api/v1/transactions/notification")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(r#"{"order_id": "DKN-1", "transaction_status": "settlement"}"#);
    let (status, body) = deliver(req, MockTransactionManager::new()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["meta"]["status"], "error");
}

#[actix_web::test]
async fn storage_failures_are_not_acknowledged() {
    let _ = env_logger::try_init();
    let mut db = MockTransactionManager::new();
    db.expect_fetch_transaction().returning(|_| Err(TransactionStoreError::DatabaseError("disk I/O error".into())));
    let (status, body) = deliver(notify(&notification(ORDER_ID, "settlement", "50000.00")), db).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_error(&body, 500, "Internal server error");
}
