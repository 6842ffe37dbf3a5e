//! `POST /api/admin/dispatch-campaign`.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::services::campaign::{self, CampaignRequest};
use crate::state::AppState;

/// Success body.
#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub success: bool,
}

/// Send a campaign described by a JSON body.
///
/// Responds `{"success": true}` once every batch is accepted, otherwise
/// `{"error": "..."}` with a 4xx or 5xx status.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn dispatch(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    payload: Result<Json<CampaignRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return AppError::BadRequest(rejection.body_text()).into_json_response();
        }
    };

    let Some(client) = state.email() else {
        return AppError::Internal("email delivery is not configured".to_string())
            .into_json_response();
    };

    match campaign::dispatch(client, &request, &state.config().base_url).await {
        Ok(sent) => {
            tracing::info!(sent, "Campaign dispatched via API");
            Json(DispatchResponse { success: true }).into_response()
        }
        Err(err) => AppError::from(err).into_json_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_body() {
        let body = serde_json::to_value(DispatchResponse { success: true }).expect("json");
        assert_eq!(body, serde_json::json!({ "success": true }));
    }
}
