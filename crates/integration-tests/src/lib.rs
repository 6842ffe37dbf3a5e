//! Integration tests for Slipbook.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the server against a migrated database
//! slipbook migrate && cargo run -p slipbook-web
//!
//! # Run the HTTP tests (ignored by default)
//! SLIPBOOK_TEST_URL=http://127.0.0.1:3000 cargo test -p slipbook-integration-tests -- --ignored
//! ```
//!
//! Tests that only exercise pure logic run without a server.

use reqwest::Client;
use reqwest::redirect::Policy;

/// Server address used when `SLIPBOOK_TEST_URL` is unset.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3000";

/// HTTP client and target server for one test.
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl TestContext {
    /// Build a context pointed at `SLIPBOOK_TEST_URL`.
    ///
    /// Redirects are not followed so tests can assert on `Location`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let base_url = std::env::var("SLIPBOOK_TEST_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("test client builds");

        Self { client, base_url }
    }

    /// Absolute URL for a path on the server under test.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
