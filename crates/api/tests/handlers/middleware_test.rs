use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use pretty_assertions::assert_eq;
use rosterdesk_api::middleware::{
    auth::{self, Role, SessionKeys},
    error_handling::{AppError, map_error},
};
use rosterdesk_core::errors::RosterError;
use rstest::rstest;

#[rstest]
#[case(RosterError::not_found("Employee A1"), StatusCode::NOT_FOUND)]
#[case(RosterError::validation("Team name is required"), StatusCode::BAD_REQUEST)]
#[case(RosterError::Authentication("Not signed in".into()), StatusCode::UNAUTHORIZED)]
#[case(RosterError::Authorization("Tenant is inactive".into()), StatusCode::FORBIDDEN)]
#[case(RosterError::Conflict("Slug taken".into()), StatusCode::CONFLICT)]
#[case(RosterError::Storage(eyre::eyre!("disk full")), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(
    RosterError::Internal(Box::new(std::io::Error::other("boom"))),
    StatusCode::INTERNAL_SERVER_ERROR
)]
fn test_error_status_mapping(#[case] error: RosterError, #[case] expected: StatusCode) {
    let response = map_error(error);
    assert_eq!(response.status(), expected);
}

#[test]
fn test_app_error_helpers() {
    assert_eq!(AppError::unauthorized("x").status(), StatusCode::UNAUTHORIZED);
    assert_eq!(AppError::forbidden("x").status(), StatusCode::FORBIDDEN);
    assert_eq!(AppError::from(eyre::eyre!("io")).status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_password_hash_roundtrip() {
    let hash = auth::hash_password("correct horse").unwrap();

    assert!(hash.starts_with("$argon2"));
    assert!(auth::verify_password("correct horse", &hash));
    assert!(!auth::verify_password("wrong horse", &hash));
    assert!(!auth::verify_password("correct horse", "not-a-phc-string"));
}

#[test]
fn test_hashes_are_salted() {
    let first = auth::hash_password("same").unwrap();
    let second = auth::hash_password("same").unwrap();
    assert_ne!(first, second);
}

#[test]
fn test_session_token_carries_claims() {
    let keys = SessionKeys::new("test-secret", 8, false);
    let token = keys.issue("admin", Role::Admin, Some("tenant-1")).unwrap();

    let claims = keys.verify(&token).unwrap();

    assert_eq!(claims.sub, "admin");
    assert_eq!(claims.role, Role::Admin);
    assert_eq!(claims.tid.as_deref(), Some("tenant-1"));
    assert_eq!(claims.exp - claims.iat, 8 * 3600);
}

#[test]
fn test_session_token_rejects_other_secret_and_garbage() {
    let token = SessionKeys::new("one", 8, false)
        .issue("devon", Role::Developer, None)
        .unwrap();
    let other = SessionKeys::new("two", 8, false);

    assert!(other.verify(&token).is_none());
    assert!(other.verify("garbage").is_none());
}

#[test]
fn test_cookie_attributes() {
    let keys = SessionKeys::new("secret", 2, true);
    let cookie = keys.cookie("abc").unwrap();
    let cookie = cookie.to_str().unwrap();

    assert!(cookie.starts_with("roster_session=abc;"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Max-Age=7200"));
    assert!(cookie.ends_with("; Secure"));
    assert!(keys.clear_cookie().to_str().unwrap().contains("Max-Age=0"));
}

#[test]
fn test_extract_token_prefers_bearer_then_cookie() {
    let mut headers = HeaderMap::new();
    assert_eq!(auth::extract_token(&headers), None);

    headers.insert(header::COOKIE, HeaderValue::from_static("a=1; roster_session=from-cookie"));
    assert_eq!(auth::extract_token(&headers), Some("from-cookie"));

    headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
    assert_eq!(auth::extract_token(&headers), Some("from-header"));
}

#[test]
fn test_empty_session_cookie_is_ignored() {
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_static("roster_session="));
    assert_eq!(auth::extract_token(&headers), None);
}
