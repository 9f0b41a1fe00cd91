use axum::{extract::State, response::IntoResponse, Json};
use chrono::DateTime;

use super::RefreshRequest;
use crate::api::{ApiError, ErrorResponse, JsonBody, MessageResponse};
use crate::auth::AuthUser;
use crate::state::AppState;

/// Revoke a refresh token. Without a token in the body this is a no-op.
#[utoipa::path(
    post,
    path = "/users/logout/",
    tag = "users",
    request_body(content = RefreshRequest, example = json!({"refresh": "<refresh token>"})),
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 400, description = "Refresh token rejected", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn logout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = req.refresh.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let claims = state
            .tokens
            .verify_refresh_token(token)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;

        if claims.sub != user.id {
            return Err(ApiError::BadRequest(
                "Token does not belong to this user.".to_string(),
            ));
        }

        let expires_at = DateTime::from_timestamp(claims.exp as i64, 0)
            .ok_or_else(|| ApiError::BadRequest("Token is invalid or expired".to_string()))?;
        state
            .store
            .blacklist_token(claims.jti, user.id, expires_at)?;

        tracing::info!(user_id = %user.id, jti = %claims.jti, "Blacklisted refresh token");
    }

    Ok(Json(MessageResponse::new("Successfully logged out.")))
}
