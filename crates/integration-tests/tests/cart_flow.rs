//! Integration tests for session carts.

#![allow(clippy::unwrap_used)]

use greenhouse_integration_tests::TestContext;
use reqwest::StatusCode;
use serde_json::{Value, json};

const MONSTERA: &str = "monstera-deliciosa-swiss";

async fn send(
    ctx: &TestContext,
    method: reqwest::Method,
    path: &str,
    session: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = ctx
        .client
        .request(method, ctx.url(path))
        .header("x-session-id", session);
    if let Some(body) = body {
        request = request.json(&body);
    }
    let resp = request.send().await.unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn test_add_then_zero_quantity_empties_cart() {
    let ctx = TestContext::new().await;

    let (status, cart) = send(
        &ctx,
        reqwest::Method::POST,
        "/cart",
        "s1",
        Some(json!({ "plantId": MONSTERA, "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["total"].as_f64(), Some(2598.0));
    assert_eq!(cart["itemCount"], 2);
    assert_eq!(cart["items"][0]["id"], MONSTERA);
    assert_eq!(cart["items"][0]["quantity"], 2);

    let (status, cart) = send(
        &ctx,
        reqwest::Method::PUT,
        "/cart",
        "s1",
        Some(json!({ "plantId": MONSTERA, "quantity": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["total"].as_f64(), Some(0.0));
    assert!(cart["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let ctx = TestContext::new().await;
    send(
        &ctx,
        reqwest::Method::POST,
        "/cart",
        "s1",
        Some(json!({ "id": MONSTERA })),
    )
    .await;

    let (_, other) = send(&ctx, reqwest::Method::GET, "/cart", "s2", None).await;
    assert_eq!(other["itemCount"], 0);

    let (_, count) = send(&ctx, reqwest::Method::GET, "/cart/count", "s1", None).await;
    assert_eq!(count["itemCount"], 1);
}

#[tokio::test]
async fn test_missing_session_header_uses_shared_cart() {
    let ctx = TestContext::new().await;
    send(
        &ctx,
        reqwest::Method::POST,
        "/cart",
        "default",
        Some(json!({ "plantId": MONSTERA, "quantity": 3 })),
    )
    .await;

    let (status, cart) = ctx.get("/cart", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["itemCount"], 3);
}

#[tokio::test]
async fn test_stock_is_checked_per_increment() {
    let ctx = TestContext::new().await;

    let (status, body) = send(
        &ctx,
        reqwest::Method::POST,
        "/cart",
        "s1",
        Some(json!({ "plantId": MONSTERA, "quantity": 19 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (_, cart) = send(&ctx, reqwest::Method::GET, "/cart", "s1", None).await;
    assert_eq!(cart["itemCount"], 0);

    // Each add passes on its own even though the line ends above stock.
    for _ in 0..2 {
        let (status, _) = send(
            &ctx,
            reqwest::Method::POST,
            "/cart",
            "s1",
            Some(json!({ "plantId": MONSTERA, "quantity": 10 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    let (_, cart) = send(&ctx, reqwest::Method::GET, "/cart", "s1", None).await;
    assert_eq!(cart["itemCount"], 20);
}

#[tokio::test]
async fn test_unknown_plant_and_bad_quantities() {
    let ctx = TestContext::new().await;

    let (status, _) = send(
        &ctx,
        reqwest::Method::POST,
        "/cart",
        "s1",
        Some(json!({ "plantId": "plastic-fern" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &ctx,
        reqwest::Method::POST,
        "/cart",
        "s1",
        Some(json!({ "plantId": MONSTERA, "quantity": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &ctx,
        reqwest::Method::PUT,
        "/cart",
        "s1",
        Some(json!({ "plantId": MONSTERA, "quantity": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &ctx,
        reqwest::Method::PUT,
        "/cart",
        "s1",
        Some(json!({ "plantId": MONSTERA, "quantity": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_huge_quantities_are_rejected() {
    let ctx = TestContext::new().await;
    for plant in [MONSTERA, "peace-lily"] {
        send(
            &ctx,
            reqwest::Method::POST,
            "/cart",
            "s1",
            Some(json!({ "plantId": plant })),
        )
        .await;
        let (status, body) = send(
            &ctx,
            reqwest::Method::PUT,
            "/cart",
            "s1",
            Some(json!({ "plantId": plant, "quantity": u32::MAX })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    let (status, cart) = send(&ctx, reqwest::Method::GET, "/cart", "s1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["itemCount"], 2);
    assert_eq!(cart["total"].as_f64(), Some(1798.0));
}

#[tokio::test]
async fn test_remove_and_clear() {
    let ctx = TestContext::new().await;
    send(
        &ctx,
        reqwest::Method::POST,
        "/cart",
        "s1",
        Some(json!({ "plantId": MONSTERA, "quantity": 1 })),
    )
    .await;

    let (status, cart) = send(
        &ctx,
        reqwest::Method::DELETE,
        &format!("/cart/{MONSTERA}"),
        "s1",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["itemCount"], 0);

    // Removing again is a no-op.
    let (status, _) = send(
        &ctx,
        reqwest::Method::DELETE,
        &format!("/cart/{MONSTERA}"),
        "s1",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    send(
        &ctx,
        reqwest::Method::POST,
        "/cart",
        "s1",
        Some(json!({ "plantId": MONSTERA, "quantity": 2 })),
    )
    .await;
    let (status, cart) = send(&ctx, reqwest::Method::DELETE, "/cart", "s1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["message"], "Cart cleared");
    assert_eq!(cart["total"].as_f64(), Some(0.0));
}
