//! Integration tests for registration, OTP login and bearer tokens.

#![allow(clippy::unwrap_used)]

use chrono::Duration;
use greenhouse_integration_tests::{ADMIN_EMAIL, TestContext};
use reqwest::StatusCode;
use serde_json::json;

fn ann() -> serde_json::Value {
    json!({
        "name": "Ann",
        "email": "ann@x.com",
        "phone": "+1",
        "password": "pw",
    })
}

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn test_register_verify_then_code_is_spent() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.post("/auth/register", &ann()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["email"], "ann@x.com");
    assert!(body.get("demoOTP").is_none());

    let code = ctx.last_code("ann@x.com");
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    let (status, body) = ctx
        .post("/auth/verify-otp", &json!({ "email": "ann@x.com", "otp": code }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["isActive"], true);
    assert_eq!(body["user"]["isAdmin"], false);
    assert!(body["user"].get("password").is_none());
    assert!(body["token"].as_str().unwrap().starts_with("auth_"));

    let (status, body) = ctx
        .post("/auth/verify-otp", &json!({ "email": "ann@x.com", "otp": code }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("No OTP found"));

    assert_eq!(ctx.notifier.count_kind("welcome"), 1);
}

#[tokio::test]
async fn test_register_existing_email_is_rejected() {
    let ctx = TestContext::new().await;
    ctx.register("Ann", "ann@x.com", "pw").await;

    let (status, body) = ctx.post("/auth/register", &ann()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User with this email already exists");
}

#[tokio::test]
async fn test_register_validation_errors() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .post(
            "/auth/register",
            &json!({ "name": "Ann", "email": "not-an-email", "password": "pw" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email address");

    let (status, _) = ctx
        .post(
            "/auth/register",
            &json!({ "name": " ", "email": "ann@x.com", "password": "pw" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_json_uses_error_shape() {
    let ctx = TestContext::new().await;
    let resp = ctx
        .client
        .post(ctx.url("/auth/verify-otp"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
}

// ============================================================================
// OTP issuance
// ============================================================================

#[tokio::test]
async fn test_second_request_within_window_is_rate_limited() {
    let ctx = TestContext::new().await;
    ctx.post("/auth/register", &ann()).await;
    let first = ctx.last_code("ann@x.com");

    let (status, body) = ctx
        .post("/auth/resend-otp", &json!({ "email": "ann@x.com" }))
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(body["message"].as_str().unwrap().contains("5 minute(s)"));

    // The original code still works.
    let (status, _) = ctx
        .post("/auth/verify-otp", &json!({ "email": "ann@x.com", "otp": first }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_expired_code_can_be_reissued() {
    let ctx = TestContext::new().await;
    ctx.post("/auth/register", &ann()).await;
    let stale = ctx.last_code("ann@x.com");

    ctx.clock.advance(Duration::minutes(6));

    let (status, body) = ctx
        .post("/auth/verify-otp", &json!({ "email": "ann@x.com", "otp": stale }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "OTP has expired. Please request a new one");

    let (status, _) = ctx
        .post("/auth/resend-otp", &json!({ "email": "ann@x.com" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let fresh = ctx.last_code("ann@x.com");
    let (status, _) = ctx
        .post("/auth/verify-otp", &json!({ "email": "ann@x.com", "otp": fresh }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_three_wrong_codes_exhaust_the_otp() {
    let ctx = TestContext::new().await;
    ctx.post("/auth/register", &ann()).await;
    let code = ctx.last_code("ann@x.com");
    // Issued codes start at 100000.
    let wrong = "000000";

    for remaining in [2, 1, 0] {
        let (status, body) = ctx
            .post("/auth/verify-otp", &json!({ "email": "ann@x.com", "otp": wrong }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["message"],
            format!("Invalid OTP. {remaining} attempt(s) remaining")
        );
    }

    let (status, body) = ctx
        .post("/auth/verify-otp", &json!({ "email": "ann@x.com", "otp": code }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Too many failed attempts. Please request a new OTP"
    );
}

#[tokio::test]
async fn test_demo_otp_exposed_when_delivery_fails() {
    let ctx = TestContext::with_failing_notifier().await;

    let (status, body) = ctx.post("/auth/register", &ann()).await;
    assert_eq!(status, StatusCode::OK);

    let demo = body["demoOTP"].as_str().unwrap().to_owned();
    assert_eq!(demo, ctx.last_code("ann@x.com"));

    // A failing welcome email does not fail the verification.
    let (status, _) = ctx
        .post("/auth/verify-otp", &json!({ "email": "ann@x.com", "otp": demo }))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_resend_for_unknown_email() {
    let ctx = TestContext::new().await;
    let (status, _) = ctx
        .post("/auth/resend-otp", &json!({ "email": "ghost@x.com" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Login and tokens
// ============================================================================

#[tokio::test]
async fn test_otp_login_for_existing_user() {
    let ctx = TestContext::new().await;
    let (_, user) = ctx.register("Ann", "ann@x.com", "pw").await;

    ctx.clock.advance(Duration::minutes(6));
    let (status, _) = ctx
        .post("/auth/resend-otp", &json!({ "email": "ann@x.com" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let code = ctx.last_code("ann@x.com");
    let (status, body) = ctx
        .post("/auth/verify-otp", &json!({ "email": "ann@x.com", "otp": code }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["id"], user["id"]);
}

#[tokio::test]
async fn test_password_login_and_me() {
    let ctx = TestContext::new().await;
    ctx.register("Ann", "ann@x.com", "pw").await;

    let (status, body) = ctx
        .post(
            "/auth/login",
            &json!({ "email": "ann@x.com", "password": "wrong" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email or password");

    let (status, body) = ctx
        .post("/auth/login", &json!({ "email": "ann@x.com", "password": "pw" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_owned();

    let (status, body) = ctx.get("/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "ann@x.com");
    assert_eq!(body["user"]["name"], "Ann");
}

#[tokio::test]
async fn test_me_rejects_missing_malformed_and_expired_tokens() {
    let ctx = TestContext::new().await;
    let (token, _) = ctx.register("Ann", "ann@x.com", "pw").await;

    let (status, _) = ctx.get("/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx.get("/auth/me", Some("auth_abc")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    ctx.clock.advance(Duration::days(31));
    let (status, body) = ctx.get("/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_logout_acknowledges() {
    let ctx = TestContext::new().await;
    let (status, body) = ctx.post("/auth/logout", &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

// ============================================================================
// Admin user management
// ============================================================================

#[tokio::test]
async fn test_bootstrap_email_becomes_admin() {
    let ctx = TestContext::new().await;
    let (_, admin) = ctx.register("Admin", ADMIN_EMAIL, "admin-pw").await;
    assert_eq!(admin["isAdmin"], true);
}

#[tokio::test]
async fn test_user_list_requires_admin() {
    let ctx = TestContext::new().await;
    let (customer, _) = ctx.register("Ann", "ann@x.com", "pw").await;

    let (status, _) = ctx.get("/auth/users", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = ctx.get("/auth/users", Some(&customer)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin access required");

    ctx.clock.advance(Duration::minutes(1));
    let admin = ctx.admin_token().await;
    let (status, body) = ctx.get("/auth/users", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);

    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["email"], ADMIN_EMAIL);
}

#[tokio::test]
async fn test_deactivated_user_loses_access() {
    let ctx = TestContext::new().await;
    let (customer, user) = ctx.register("Ann", "ann@x.com", "pw").await;
    let admin = ctx.admin_token().await;

    let resp = ctx
        .client
        .patch(ctx.url(&format!("/auth/users/{}", user["id"])))
        .bearer_auth(&admin)
        .json(&json!({ "isActive": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["user"]["isActive"], false);

    let (status, _) = ctx.get("/auth/me", Some(&customer)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .post("/auth/login", &json!({ "email": "ann@x.com", "password": "pw" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_set_active_unknown_user() {
    let ctx = TestContext::new().await;
    let admin = ctx.admin_token().await;

    let resp = ctx
        .client
        .patch(ctx.url("/auth/users/999"))
        .bearer_auth(&admin)
        .json(&json!({ "isActive": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
