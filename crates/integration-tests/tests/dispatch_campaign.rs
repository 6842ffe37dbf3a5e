//! `POST /api/admin/dispatch-campaign` request handling.

use reqwest::StatusCode;
use serde_json::json;
use slipbook_integration_tests::TestContext;
use slipbook_web::services::campaign::CampaignRequest;

fn payload() -> serde_json::Value {
    json!({
        "subject": "New templates",
        "messageBody": "Hello\nWe added two receipt layouts.",
        "recipients": [
            { "business_name": "Ada Bakes", "auth_email": "ada@example.ng" }
        ],
        "flyerUrl": "https://cdn.example.ng/flyer.png"
    })
}

#[test]
fn test_payload_matches_request_shape() {
    let request: CampaignRequest = serde_json::from_value(payload()).unwrap();
    assert!(request.validate().is_ok());
    assert_eq!(request.flyer(), Some("https://cdn.example.ng/flyer.png"));
    assert_eq!(request.recipients[0].business_name, "Ada Bakes");
}

#[test]
fn test_payload_without_recipients_is_invalid() {
    let mut value = payload();
    value["recipients"] = json!([]);
    let request: CampaignRequest = serde_json::from_value(value).unwrap();
    assert!(request.validate().is_err());
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_dispatch_requires_session() {
    let ctx = TestContext::new();
    let resp = ctx
        .client
        .post(ctx.url("/api/admin/dispatch-campaign"))
        .json(&payload())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_dispatch_rejects_get() {
    let ctx = TestContext::new();
    let resp = ctx
        .client
        .get(ctx.url("/api/admin/dispatch-campaign"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}
