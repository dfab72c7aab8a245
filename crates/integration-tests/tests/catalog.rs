//! Integration tests for the catalog, contact form and health check.

#![allow(clippy::unwrap_used)]

use greenhouse_integration_tests::TestContext;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new().await;
    let resp = ctx.client.get(ctx.url("/health")).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_listing_filters_and_pagination() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .get("/plants?category=indoor&inStock=true&maxPrice=1500", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plants"][0]["id"], "monstera-deliciosa-swiss");
    assert_eq!(body["total"], 1);

    let (status, body) = ctx.get("/plants?limit=5&page=2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 2);
    assert_eq!(body["limit"], 5);
    assert_eq!(body["plants"].as_array().unwrap().len(), 5);
    assert_eq!(body["totalPages"], 3);
}

#[tokio::test]
async fn test_listing_rejects_unknown_sort() {
    let ctx = TestContext::new().await;
    let (status, body) = ctx.get("/plants?sort=cheapest", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_plant_detail_and_categories() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get("/plants/monstera-deliciosa-swiss", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["plant"]["stockQuantity"], 18);

    let (status, _) = ctx.get("/plants/plastic-fern", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = ctx.get("/plants/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    let total: u64 = body["categories"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["count"].as_u64().unwrap())
        .sum();
    assert_eq!(total, 12);
}

#[tokio::test]
async fn test_contact_form_sends_acknowledgement() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx
        .post(
            "/contact",
            &json!({
                "name": "Ann",
                "email": "ann@x.com",
                "message": "Do you ship to Goa?",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(ctx.notifier.count_kind("contact_acknowledgement"), 1);
    // No shop inbox is configured by default.
    assert_eq!(ctx.notifier.count_kind("contact_message"), 0);
}

#[tokio::test]
async fn test_contact_form_validation() {
    let ctx = TestContext::with_failing_notifier().await;

    let (status, _) = ctx
        .post(
            "/contact",
            &json!({ "name": "Ann", "email": "nope", "message": "Hi" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = ctx
        .post(
            "/contact",
            &json!({ "name": "", "email": "ann@x.com", "message": "Hi" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Name and message are required.");

    // Delivery failures do not surface.
    let (status, _) = ctx
        .post(
            "/contact",
            &json!({ "name": "Ann", "email": "ann@x.com", "message": "Hi" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}
