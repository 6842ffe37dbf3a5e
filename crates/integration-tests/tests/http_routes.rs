//! HTTP checks against a running server.
//!
//! All tests here need `slipbook-web` listening on `SLIPBOOK_TEST_URL`.

use reqwest::StatusCode;
use slipbook_integration_tests::TestContext;

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_health() {
    let ctx = TestContext::new();
    let resp = ctx.client.get(ctx.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_login_page_renders() {
    let ctx = TestContext::new();
    let resp = ctx.client.get(ctx.url("/login")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("<form"));
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_owner_pages_redirect_to_login() {
    let ctx = TestContext::new();
    for path in ["/dashboard", "/generate", "/history", "/settings"] {
        let resp = ctx.client.get(ctx.url(path)).send().await.unwrap();
        assert!(resp.status().is_redirection(), "{path} should redirect");
        let location = resp.headers()["location"].to_str().unwrap();
        assert!(location.starts_with("/login"), "{path} went to {location}");
    }
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_unknown_storefront_is_404() {
    let ctx = TestContext::new();
    let resp = ctx
        .client
        .get(ctx.url("/m/no-such-shop-a8f3c2"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp.text().await.unwrap().contains("Storefront Not Found"));
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_admin_pages_require_login() {
    let ctx = TestContext::new();
    let resp = ctx.client.get(ctx.url("/admin")).send().await.unwrap();
    assert!(resp.status().is_redirection());
}

#[tokio::test]
#[ignore = "requires a running server"]
async fn test_security_headers_present() {
    let ctx = TestContext::new();
    let resp = ctx.client.get(ctx.url("/")).send().await.unwrap();
    let headers = resp.headers();
    assert!(headers.contains_key("content-security-policy"));
    assert!(headers.contains_key("x-request-id"));
}
