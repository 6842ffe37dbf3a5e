//! Campaign composer: pick a segment, select recipients, preview and send.

use std::collections::HashSet;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::instrument;

use slipbook_core::ProfileId;

use crate::db::AdminRepository;
use crate::db::admin::CampaignRecipient;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::CurrentUser;
use crate::routes::NavView;
use crate::services::campaign::{
    self, CampaignError, CampaignRequest, Recipient, render_campaign_email,
};
use crate::state::AppState;

/// Receipts are counted over this many days when segmenting.
const RECENT_WINDOW_DAYS: i64 = 30;

/// Which recipients the composer lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Segment {
    #[default]
    All,
    /// Five or more receipts in the last 30 days.
    Frequent,
    /// No recorded page views.
    Inactive,
}

impl Segment {
    pub const ALL: [Self; 3] = [Self::All, Self::Frequent, Self::Inactive];

    #[must_use]
    pub fn from_query(value: &str) -> Self {
        match value.trim() {
            "frequent" => Self::Frequent,
            "inactive" => Self::Inactive,
            _ => Self::All,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Frequent => "frequent",
            Self::Inactive => "inactive",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All users",
            Self::Frequent => "Frequent issuers",
            Self::Inactive => "Inactive",
        }
    }

    #[must_use]
    pub const fn includes(self, recipient: &CampaignRecipient) -> bool {
        match self {
            Self::All => true,
            Self::Frequent => recipient.is_frequent(),
            Self::Inactive => recipient.is_inactive(),
        }
    }
}

/// Composer query string.
#[derive(Debug, Default, Deserialize)]
pub struct CampaignQuery {
    pub segment: Option<String>,
    pub sent: Option<usize>,
}

/// Submitted composer form.
///
/// Selected recipients arrive as repeated `recipient` fields holding
/// profile ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignForm {
    pub segment: Segment,
    pub subject: String,
    pub message_body: String,
    pub flyer_url: String,
    pub selected: Vec<ProfileId>,
}

impl CampaignForm {
    #[must_use]
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut form = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "segment" => form.segment = Segment::from_query(&value),
                "subject" => form.subject = value,
                "message_body" => form.message_body = value,
                "flyer_url" => form.flyer_url = value,
                "recipient" => {
                    if let Ok(id) = value.parse() {
                        form.selected.push(id);
                    }
                }
                _ => {}
            }
        }
        form
    }

    /// Turn the form into a dispatch request for the selected recipients.
    fn into_request(self, candidates: &[CampaignRecipient]) -> CampaignRequest {
        let selected: HashSet<ProfileId> = self.selected.into_iter().collect();
        let recipients = candidates
            .iter()
            .filter(|candidate| selected.contains(&candidate.id))
            .map(|candidate| Recipient {
                id: Some(candidate.id),
                business_name: candidate.business_name.clone(),
                auth_email: candidate.auth_email.clone(),
            })
            .collect();
        let flyer_url = self.flyer_url.trim();

        CampaignRequest {
            subject: self.subject,
            message_body: self.message_body,
            recipients,
            flyer_url: (!flyer_url.is_empty()).then(|| flyer_url.to_owned()),
        }
    }
}

/// Campaign composer template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/campaigns.html")]
pub struct CampaignsTemplate {
    pub nav: NavView,
    pub segment: Segment,
    pub segments: [Segment; 3],
    pub recipients: Vec<CampaignRecipient>,
    pub selected: HashSet<ProfileId>,
    pub subject: String,
    pub message_body: String,
    pub flyer_url: String,
    pub email_enabled: bool,
    pub notice: Option<String>,
    pub error: Option<String>,
}

impl CampaignsTemplate {
    /// Whether the recipient's checkbox starts checked.
    ///
    /// With nothing selected yet, the whole segment is preselected.
    #[must_use]
    pub fn is_selected(&self, id: ProfileId) -> bool {
        self.selected.is_empty() || self.selected.contains(&id)
    }
}

/// Display the composer for a segment.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Query(query): Query<CampaignQuery>,
) -> Result<CampaignsTemplate> {
    let form = CampaignForm {
        segment: query
            .segment
            .as_deref()
            .map(Segment::from_query)
            .unwrap_or_default(),
        ..CampaignForm::default()
    };
    let notice = query
        .sent
        .map(|count| format!("Campaign sent to {count} recipient(s)."));

    composer(&state, &user, form, notice, None).await
}

/// Render the email for the first selected recipient.
#[instrument(skip_all)]
pub async fn preview(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Html<String>> {
    let form = CampaignForm::from_pairs(pairs);
    let candidates = recipients(&state).await?;
    let request = form.into_request(&candidates);

    let recipient = request
        .recipients
        .first()
        .ok_or_else(|| AppError::BadRequest("Select at least one recipient".to_string()))?;
    let rendered = render_campaign_email(
        recipient,
        &request.subject,
        &request.message_body,
        request.flyer(),
        &state.config().base_url,
    )?;
    Ok(Html(rendered.html))
}

/// Send the campaign to the selected recipients.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn send(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response> {
    let form = CampaignForm::from_pairs(pairs);

    let Some(client) = state.email() else {
        let error = "Email delivery is not configured.".to_owned();
        let page = composer(&state, &user, form, None, Some(error)).await?;
        return Ok((StatusCode::SERVICE_UNAVAILABLE, page).into_response());
    };

    let candidates = recipients(&state).await?;
    let request = form.clone().into_request(&candidates);

    match campaign::dispatch(client, &request, &state.config().base_url).await {
        Ok(sent) => {
            tracing::info!(sent, "Campaign dispatched");
            let target = format!(
                "/admin/campaigns?segment={}&sent={sent}",
                form.segment.as_str()
            );
            Ok(Redirect::to(&target).into_response())
        }
        Err(err) => {
            let status = if matches!(err, CampaignError::Invalid(_)) {
                StatusCode::BAD_REQUEST
            } else {
                tracing::error!(error = %err, "Campaign dispatch failed");
                StatusCode::BAD_GATEWAY
            };
            let page = composer(&state, &user, form, None, Some(err.to_string())).await?;
            Ok((status, page).into_response())
        }
    }
}

async fn recipients(state: &AppState) -> Result<Vec<CampaignRecipient>> {
    let since = Utc::now() - Duration::days(RECENT_WINDOW_DAYS);
    Ok(AdminRepository::new(state.pool())
        .campaign_recipients(since)
        .await?)
}

async fn composer(
    state: &AppState,
    user: &CurrentUser,
    form: CampaignForm,
    notice: Option<String>,
    error: Option<String>,
) -> Result<CampaignsTemplate> {
    let recipients: Vec<CampaignRecipient> = recipients(state)
        .await?
        .into_iter()
        .filter(|recipient| form.segment.includes(recipient))
        .collect();

    Ok(CampaignsTemplate {
        nav: NavView::new("admin", user),
        segment: form.segment,
        segments: Segment::ALL,
        recipients,
        selected: form.selected.into_iter().collect(),
        subject: form.subject,
        message_body: form.message_body,
        flyer_url: form.flyer_url,
        email_enabled: state.email().is_some(),
        notice,
        error,
    })
}
