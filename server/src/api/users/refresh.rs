use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

use super::RefreshRequest;
use crate::api::{ApiError, ErrorResponse, JsonBody};
use crate::auth::AuthError;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccessTokenResponse {
    pub access: String,
}

/// Exchange a refresh token for a new access token.
#[utoipa::path(
    post,
    path = "/users/get-access-token/",
    tag = "users",
    request_body(content = RefreshRequest, example = json!({"refresh": "<refresh token>"})),
    responses(
        (status = 200, description = "New access token", body = AccessTokenResponse),
        (status = 400, description = "Missing, invalid, expired or revoked token", body = ErrorResponse)
    )
)]
pub async fn get_access_token(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let token = req
        .refresh
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Refresh token is required.".to_string()))?;

    let claims = state
        .tokens
        .verify_refresh_token(token)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if state.store.is_token_blacklisted(claims.jti)? {
        return Err(ApiError::BadRequest(AuthError::Blacklisted.to_string()));
    }

    // Role changes since the refresh token was issued are picked up here.
    let user = state
        .store
        .get_user(claims.sub)?
        .ok_or_else(|| ApiError::BadRequest("User not found".to_string()))?;

    let access = state
        .tokens
        .create_access_token(user.id, user.user_type)
        .map_err(|e| ApiError::Internal(format!("Failed to issue access token: {}", e)))?;

    Ok(Json(AccessTokenResponse { access }))
}
