use actix_web::{http::StatusCode, test::TestRequest};
use chrono::{Duration, Utc};
use doakan_engine::traits::UserStoreError;

use super::{
    helpers::*,
    mocks::{MockGateway, MockTransactionManager, MockUserManager},
};
use crate::{auth::TokenIssuer, config::AuthConfig};

fn untouched_users() -> MockUserManager {
    let mut users = MockUserManager::new();
    users.expect_fetch_user().never();
    users
}

async fn list_with_header(header: Option<(&'static str, String)>, users: MockUserManager) -> (StatusCode, serde_json::Value) {
    let mut req = TestRequest::get().uri("/api/v1/transactions");
    if let Some(h) = header {
        req = req.insert_header(h);
    }
    send(req, MockTransactionManager::new(), MockGateway::new(), users).await
}

#[actix_web::test]
async fn health_needs_no_token() {
    let _ = env_logger::try_init();
    let req = TestRequest::get().uri("/health");
    let (status, _) = send(req, MockTransactionManager::new(), MockGateway::new(), untouched_users()).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn missing_header() {
    let _ = env_logger::try_init();
    let (status, body) = list_with_header(None, untouched_users()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, 401, "Unauthorized");
}

#[actix_web::test]
async fn wrong_scheme() {
    let _ = env_logger::try_init();
    let token = issue_token(DONOR_ID);
    let (status, body) = list_with_header(Some(("Authorization", format!("Token {token}"))), untouched_users()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, 401, "Unauthorized");
}

#[actix_web::test]
async fn garbage_token() {
    let _ = env_logger::try_init();
    let header = ("Authorization", "Bearer this.is.nonsense".to_string());
    let (status, body) = list_with_header(Some(header), untouched_users()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, 401, "Unauthorized");
}

#[actix_web::test]
async fn token_with_tampered_signature() {
    let _ = env_logger::try_init();
    let mut token = issue_token(DONOR_ID);
    let n = token.len();
    let replacement = if &token[n - 6..n - 1] == "AAAAA" { "BBBBB" } else { "AAAAA" };
    token.replace_range(n - 6..n - 1, replacement);
    let (status, body) = list_with_header(Some(("Authorization", format!("Bearer {token}"))), untouched_users()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, 401, "Unauthorized");
}

#[actix_web::test]
async fn token_from_another_issuer() {
    let _ = env_logger::try_init();
    let other = AuthConfig::new("some-other-secret-that-is-long-enough", Duration::hours(1));
    let token = TokenIssuer::new(&other).issue_token(DONOR_ID, Utc::now()).unwrap();
    let (status, body) = list_with_header(Some(("Authorization", format!("Bearer {token}"))), untouched_users()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, 401, "Unauthorized");
}

#[actix_web::test]
async fn expired_token() {
    let _ = env_logger::try_init();
    // Issued 3700s ago with a lifetime of 3600s
    let token = TokenIssuer::new(&auth_config()).issue_token(DONOR_ID, Utc::now() - Duration::seconds(3700)).unwrap();
    let (status, body) = list_with_header(Some(("Authorization", format!("Bearer {token}"))), untouched_users()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, 401, "Unauthorized");
}

#[actix_web::test]
async fn token_for_deleted_user() {
    let _ = env_logger::try_init();
    let (status, body) = list_with_header(Some(bearer(404)), users()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_error(&body, 401, "Unauthorized");
}

#[actix_web::test]
async fn user_store_failure_is_not_an_auth_failure() {
    let _ = env_logger::try_init();
    let mut users = MockUserManager::new();
    users.expect_fetch_user().returning(|_| Err(UserStoreError::DatabaseError("database is locked".into())));
    let (status, body) = list_with_header(Some(bearer(DONOR_ID)), users).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_error(&body, 500, "Internal server error");
}

#[actix_web::test]
async fn valid_token() {
    let _ = env_logger::try_init();
    let mut db = MockTransactionManager::new();
    db.expect_fetch_transactions_for_user().withf(|id| *id == DONOR_ID).returning(|_| Ok(vec![]));
    let req = TestRequest::get().uri("/api/v1/transactions").insert_header(bearer(DONOR_ID));
    let (status, body) = send(req, db, MockGateway::new(), users()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["status"], "success");
    assert_eq!(body["data"], serde_json::json!([]));
}
