use actix_web::{
    http::{header::HeaderMap, StatusCode},
    test::TestRequest,
};

use super::{
    helpers::*,
    mocks::{MockGateway, MockTransactionManager, MockUserManager},
};

const ORIGIN: &str = "https://doakan.id";

fn untouched_users() -> MockUserManager {
    let mut users = MockUserManager::new();
    users.expect_fetch_user().never();
    users
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or_default()
}

#[actix_web::test]
async fn preflight_is_answered_without_a_token() {
    let _ = env_logger::try_init();
    let req = TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/v1/transactions")
        .insert_header(("Origin", ORIGIN))
        .insert_header(("Access-Control-Request-Method", "POST"))
        .insert_header(("Access-Control-Request-Headers", "authorization, content-type"));
    let (status, headers, _) =
        send_with_headers(req, MockTransactionManager::new(), MockGateway::new(), untouched_users()).await;
    assert!(status.is_success(), "preflight was answered with {status}");
    assert_eq!(header(&headers, "access-control-allow-origin"), "*");
    assert!(header(&headers, "access-control-allow-methods").contains("POST"), "{headers:?}");
    let allowed = header(&headers, "access-control-allow-headers").to_ascii_lowercase();
    assert!(allowed.contains("authorization"), "{headers:?}");
    assert!(allowed.contains("content-type"), "{headers:?}");
}

#[actix_web::test]
async fn cross_origin_errors_carry_cors_headers() {
    let _ = env_logger::try_init();
    let req = TestRequest::get().uri("/api/v1/transactions").insert_header(("Origin", ORIGIN));
    let (status, headers, body) =
        send_with_headers(req, MockTransactionManager::new(), MockGateway::new(), untouched_users()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(header(&headers, "access-control-allow-origin"), "*");
    assert_error(&body, 401, "Unauthorized");
}

#[actix_web::test]
async fn health_is_outside_the_api_scope() {
    let _ = env_logger::try_init();
    let req = TestRequest::get().uri("/health").insert_header(("Origin", ORIGIN));
    let (status, headers, _) =
        send_with_headers(req, MockTransactionManager::new(), MockGateway::new(), untouched_users()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers.get("access-control-allow-origin").is_none());
}
