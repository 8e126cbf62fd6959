use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use shared::{VerifyPasswordRequest, VerifyPasswordResponse};
use tracing::{info, warn};

use super::AppState;
use crate::error::{PosError, PosResult};

pub async fn verify_manager_password(
    State(state): State<AppState>,
    payload: Result<Json<VerifyPasswordRequest>, JsonRejection>,
) -> PosResult<Json<VerifyPasswordResponse>> {
    let Json(request) = payload.map_err(|e| PosError::validation(e.body_text()))?;
    let password = request
        .password
        .ok_or_else(|| PosError::validation("Password is required"))?;

    if !state.tokens.verify_password(&password) {
        warn!("Manager password verification failed");
        return Ok(Json(VerifyPasswordResponse::denied()));
    }

    let (token, expires_at) = state.tokens.issue()?;
    info!("Manager token issued, expires at {}", expires_at);
    Ok(Json(VerifyPasswordResponse::granted(token, expires_at)))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn wrong_password_is_denied_without_a_token() {
        let router = offline_router();

        let (status, body) = send(
            &router,
            Method::POST,
            "/verify-manager-password",
            None,
            Some(r#"{"password":"guess"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": false }));
    }

    #[tokio::test]
    async fn right_password_yields_a_token() {
        let router = offline_router();

        let (status, body) = send(
            &router,
            Method::POST,
            "/verify-manager-password",
            None,
            Some(&format!(r#"{{"password":"{}"}}"#, PASSWORD)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
        assert!(body["expires_at"].as_i64().is_some());
    }

    #[tokio::test]
    async fn missing_password_is_a_bad_request() {
        let router = offline_router();

        let (status, _) = send(
            &router,
            Method::POST,
            "/verify-manager-password",
            None,
            Some("{}"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
