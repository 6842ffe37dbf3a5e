//! Campaign email rendering and dispatch.
//!
//! One message is rendered per recipient and the messages are handed to the
//! Resend batch endpoint in chunks. There is no retry and no partial-failure
//! handling: the first provider error fails the whole dispatch.

use askama::Template;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use slipbook_core::{Email, ProfileId};

use super::resend::{BATCH_LIMIT, OutgoingEmail, ResendClient, ResendError};

/// Product name shown in the email header.
pub const BRAND_NAME: &str = "Slipbook";

/// HTML body of a campaign email.
#[derive(Template)]
#[template(path = "email/campaign.html")]
struct CampaignEmailHtml<'a> {
    subject: &'a str,
    brand: &'a str,
    brand_letter: char,
    business_name: &'a str,
    body_lines: Vec<&'a str>,
    flyer_url: Option<&'a str>,
    dashboard_url: String,
    recipient_email: &'a str,
    unsubscribe_url: String,
}

/// Plain text body of a campaign email.
#[derive(Template)]
#[template(path = "email/campaign.txt")]
struct CampaignEmailText<'a> {
    brand: &'a str,
    business_name: &'a str,
    body: &'a str,
    flyer_url: Option<&'a str>,
    dashboard_url: String,
    recipient_email: &'a str,
}

/// Errors that can occur while preparing or sending a campaign.
#[derive(Debug, Error)]
pub enum CampaignError {
    /// The request is missing required fields.
    #[error("{0}")]
    Invalid(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// The email provider rejected a batch.
    #[error("Email provider error: {0}")]
    Provider(#[from] ResendError),
}

/// One addressee as submitted by the back-office.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(default)]
    pub id: Option<ProfileId>,
    pub business_name: String,
    pub auth_email: String,
}

/// A campaign to send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRequest {
    pub subject: String,
    #[serde(rename = "messageBody")]
    pub message_body: String,
    pub recipients: Vec<Recipient>,
    #[serde(rename = "flyerUrl", default, skip_serializing_if = "Option::is_none")]
    pub flyer_url: Option<String>,
}

impl CampaignRequest {
    /// Check required fields and recipient addresses.
    ///
    /// # Errors
    ///
    /// Returns `CampaignError::Invalid` naming the first problem found.
    pub fn validate(&self) -> Result<(), CampaignError> {
        if self.subject.trim().is_empty() {
            return Err(CampaignError::Invalid("Subject is required".to_owned()));
        }
        if self.message_body.trim().is_empty() {
            return Err(CampaignError::Invalid("Message body is required".to_owned()));
        }
        if self.recipients.is_empty() {
            return Err(CampaignError::Invalid(
                "Select at least one recipient".to_owned(),
            ));
        }
        for recipient in &self.recipients {
            Email::parse(&recipient.auth_email).map_err(|e| {
                CampaignError::Invalid(format!(
                    "Invalid recipient email {}: {e}",
                    recipient.auth_email
                ))
            })?;
        }
        Ok(())
    }

    /// Flyer image URL, kept only when it is an absolute http(s) URL.
    #[must_use]
    pub fn flyer(&self) -> Option<&str> {
        self.flyer_url
            .as_deref()
            .map(str::trim)
            .filter(|url| url.starts_with("https://") || url.starts_with("http://"))
    }
}

/// Rendered HTML and text for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub html: String,
    pub text: String,
}

/// Render the campaign email for one recipient.
///
/// The body is escaped and each line break becomes `<br/>` in the HTML part.
///
/// # Errors
///
/// Returns `CampaignError::Template` if rendering fails.
pub fn render_campaign_email(
    recipient: &Recipient,
    subject: &str,
    body: &str,
    flyer_url: Option<&str>,
    base_url: &str,
) -> Result<RenderedEmail, CampaignError> {
    let dashboard_url = format!("{base_url}/dashboard");
    // Every line break becomes `<br/>`, a trailing one included
    let body_lines: Vec<&str> = body
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    let html = CampaignEmailHtml {
        subject,
        brand: BRAND_NAME,
        brand_letter: BRAND_NAME.chars().next().unwrap_or('S'),
        business_name: &recipient.business_name,
        body_lines,
        flyer_url,
        dashboard_url: dashboard_url.clone(),
        recipient_email: &recipient.auth_email,
        unsubscribe_url: format!("{base_url}/settings"),
    }
    .render()?;

    let text = CampaignEmailText {
        brand: BRAND_NAME,
        business_name: &recipient.business_name,
        body,
        flyer_url,
        dashboard_url,
        recipient_email: &recipient.auth_email,
    }
    .render()?;

    Ok(RenderedEmail { html, text })
}

/// Build one outgoing message per recipient.
///
/// # Errors
///
/// Returns `CampaignError::Template` if any message fails to render.
pub fn build_messages(
    client: &ResendClient,
    request: &CampaignRequest,
    base_url: &str,
) -> Result<Vec<OutgoingEmail>, CampaignError> {
    let flyer_url = request.flyer();

    request
        .recipients
        .iter()
        .map(|recipient| {
            let rendered = render_campaign_email(
                recipient,
                &request.subject,
                &request.message_body,
                flyer_url,
                base_url,
            )?;
            Ok(OutgoingEmail {
                from: client.from_address().to_owned(),
                to: vec![recipient.auth_email.trim().to_owned()],
                subject: request.subject.trim().to_owned(),
                html: rendered.html,
                text: Some(rendered.text),
                reply_to: client.reply_to().map(str::to_owned),
            })
        })
        .collect()
}

/// Validate, render and send a campaign. Returns the number of messages sent.
///
/// # Errors
///
/// Returns `CampaignError::Invalid` for a malformed request, otherwise the
/// first rendering or provider error.
#[tracing::instrument(skip_all, fields(recipients = request.recipients.len()))]
pub async fn dispatch(
    client: &ResendClient,
    request: &CampaignRequest,
    base_url: &str,
) -> Result<usize, CampaignError> {
    request.validate()?;
    let messages = build_messages(client, request, base_url)?;

    for (index, chunk) in messages.chunks(BATCH_LIMIT).enumerate() {
        let sent = client.send_batch(chunk).await?;
        tracing::info!(batch = index, accepted = sent.len(), "Campaign batch sent");
    }

    Ok(messages.len())
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::{DEFAULT_RESEND_API_BASE, EmailConfig};

    fn recipient(name: &str, email: &str) -> Recipient {
        Recipient {
            id: None,
            business_name: name.to_owned(),
            auth_email: email.to_owned(),
        }
    }

    fn request(recipients: Vec<Recipient>) -> CampaignRequest {
        CampaignRequest {
            subject: "New feature".to_owned(),
            message_body: "Line one\nLine two".to_owned(),
            recipients,
            flyer_url: None,
        }
    }

    fn client_for(api_base: &str) -> ResendClient {
        ResendClient::new(&EmailConfig {
            api_key: SecretString::from("re_Zk8q2LmX9vB4nP7wR3tY6uJ1"),
            from: "Slipbook <hello@slipbook.test>".to_owned(),
            reply_to: Some("support@slipbook.test".to_owned()),
            api_base: api_base.to_owned(),
        })
        .expect("client builds")
    }

    fn client() -> ResendClient {
        client_for(DEFAULT_RESEND_API_BASE)
    }

    fn owners(count: usize) -> Vec<Recipient> {
        (0..count)
            .map(|i| recipient(&format!("Shop {i}"), &format!("owner{i}@example.ng")))
            .collect()
    }

    /// Local stand-in for the batch endpoint.
    mod provider {
        use std::sync::{Arc, Mutex};

        use axum::{
            Json, Router,
            extract::State,
            http::StatusCode,
            response::{IntoResponse, Response},
            routing::post,
        };
        use serde_json::{Value, json};

        /// First recipient of each batch, in arrival order.
        #[derive(Clone, Default)]
        pub struct Calls {
            pub first_recipients: Arc<Mutex<Vec<String>>>,
            pub fail_on_call: Option<usize>,
        }

        impl Calls {
            pub fn seen(&self) -> Vec<String> {
                self.first_recipients.lock().expect("lock").clone()
            }
        }

        async fn batch(State(calls): State<Calls>, Json(emails): Json<Vec<Value>>) -> Response {
            let call = {
                let mut seen = calls.first_recipients.lock().expect("lock");
                seen.push(emails[0]["to"][0].as_str().unwrap_or_default().to_owned());
                seen.len()
            };
            if calls.fail_on_call == Some(call) {
                return (StatusCode::INTERNAL_SERVER_ERROR, "provider unavailable").into_response();
            }
            let data: Vec<Value> = (0..emails.len())
                .map(|i| json!({ "id": format!("msg-{call}-{i}") }))
                .collect();
            Json(json!({ "data": data })).into_response()
        }

        /// Serve the stub on an ephemeral port and return its base URL.
        pub async fn start(calls: Calls) -> String {
            let router = Router::new()
                .route("/emails/batch", post(batch))
                .with_state(calls);
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("bind");
            let addr = listener.local_addr().expect("local addr");
            tokio::spawn(async move {
                axum::serve(listener, router).await.expect("stub server");
            });
            format!("http://{addr}")
        }
    }

    #[tokio::test]
    async fn test_dispatch_sends_batches_in_order() {
        let calls = provider::Calls::default();
        let api_base = provider::start(calls.clone()).await;

        let sent = dispatch(&client_for(&api_base), &request(owners(250)), "https://slipbook.test")
            .await
            .expect("dispatched");

        assert_eq!(sent, 250);
        assert_eq!(
            calls.seen(),
            vec![
                "owner0@example.ng".to_owned(),
                "owner100@example.ng".to_owned(),
                "owner200@example.ng".to_owned(),
            ]
        );
    }

    #[tokio::test]
    async fn test_dispatch_stops_at_first_provider_error() {
        let calls = provider::Calls {
            fail_on_call: Some(2),
            ..provider::Calls::default()
        };
        let api_base = provider::start(calls.clone()).await;

        let err = dispatch(&client_for(&api_base), &request(owners(250)), "https://slipbook.test")
            .await
            .expect_err("second batch fails");

        assert!(matches!(
            err,
            CampaignError::Provider(ResendError::Api { status: 500, .. })
        ));
        assert_eq!(calls.seen().len(), 2);
    }

    #[tokio::test]
    async fn test_dispatch_rejects_invalid_request_before_sending() {
        let calls = provider::Calls::default();
        let api_base = provider::start(calls.clone()).await;

        let err = dispatch(&client_for(&api_base), &request(vec![]), "https://slipbook.test")
            .await
            .expect_err("no recipients");

        assert!(matches!(err, CampaignError::Invalid(_)));
        assert!(calls.seen().is_empty());
    }

    #[test]
    fn test_render_greets_business_and_breaks_lines() {
        let rendered = render_campaign_email(
            &recipient("Ada Bakes", "ada@example.ng"),
            "Hi",
            "Line one\nLine two",
            None,
            "https://slipbook.test",
        )
        .expect("renders");

        assert!(rendered.html.contains("Hello Ada Bakes,"));
        assert!(rendered.html.contains("Line one<br/>Line two"));
        assert!(rendered.html.contains("https://slipbook.test/dashboard"));
        assert!(rendered.html.contains("Sent to ada@example.ng"));
        assert!(rendered.text.contains("Line one\nLine two"));
    }

    #[test]
    fn test_render_keeps_trailing_line_break() {
        let rendered = render_campaign_email(
            &recipient("Ada", "ada@example.ng"),
            "Hi",
            "Thanks\r\nSee you\n",
            None,
            "https://slipbook.test",
        )
        .expect("renders");
        assert!(rendered.html.contains("Thanks<br/>See you<br/></div>"));
    }

    #[test]
    fn test_render_escapes_body_and_name() {
        let rendered = render_campaign_email(
            &recipient("<b>Shop</b>", "ada@example.ng"),
            "Hi",
            "<script>alert(1)</script>",
            None,
            "https://slipbook.test",
        )
        .expect("renders");

        assert!(!rendered.html.contains("<script>"));
        assert!(!rendered.html.contains("<b>Shop</b>"));
        assert!(rendered.html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_render_includes_flyer_when_given() {
        let rendered = render_campaign_email(
            &recipient("Ada", "ada@example.ng"),
            "Hi",
            "Body",
            Some("https://cdn.example.ng/flyer.png"),
            "https://slipbook.test",
        )
        .expect("renders");
        assert!(rendered.html.contains("https://cdn.example.ng/flyer.png"));
    }

    #[test]
    fn test_validate_requires_fields() {
        let mut req = request(vec![recipient("Ada", "ada@example.ng")]);
        assert!(req.validate().is_ok());

        req.subject = "  ".to_owned();
        assert!(matches!(req.validate(), Err(CampaignError::Invalid(_))));

        let req = request(vec![]);
        assert!(matches!(req.validate(), Err(CampaignError::Invalid(_))));

        let req = request(vec![recipient("Ada", "not-an-email")]);
        assert!(matches!(req.validate(), Err(CampaignError::Invalid(_))));
    }

    #[test]
    fn test_flyer_requires_http_url() {
        let mut req = request(vec![]);
        req.flyer_url = Some("javascript:alert(1)".to_owned());
        assert_eq!(req.flyer(), None);
        req.flyer_url = Some(" https://cdn.example.ng/f.png ".to_owned());
        assert_eq!(req.flyer(), Some("https://cdn.example.ng/f.png"));
    }

    #[test]
    fn test_build_messages_one_per_recipient() {
        let messages = build_messages(&client(), &request(owners(250)), "https://slipbook.test")
            .expect("builds");

        assert_eq!(messages.len(), 250);
        assert_eq!(messages[7].to, vec!["owner7@example.ng".to_owned()]);
        assert_eq!(messages[7].reply_to.as_deref(), Some("support@slipbook.test"));

        let chunk_sizes: Vec<usize> = messages.chunks(BATCH_LIMIT).map(<[_]>::len).collect();
        assert_eq!(chunk_sizes, vec![100, 100, 50]);
    }

    #[test]
    fn test_request_json_field_names() {
        let req: CampaignRequest = serde_json::from_str(
            r#"{"subject":"S","messageBody":"B","recipients":[{"business_name":"Ada","auth_email":"a@b.ng"}],"flyerUrl":"https://x.ng/f.png"}"#,
        )
        .expect("parses");
        assert_eq!(req.message_body, "B");
        assert_eq!(req.flyer_url.as_deref(), Some("https://x.ng/f.png"));
        assert!(req.recipients[0].id.is_none());
    }
}
