use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use super::{issue_tokens, AuthResponse};
use crate::api::{ApiError, ErrorResponse, JsonBody};
use crate::auth::verify_password;
use crate::state::AppState;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[utoipa::path(
    post,
    path = "/users/login/",
    tag = "users",
    request_body(content = LoginRequest, example = json!({"email": "chef@example.com", "password": "s3cret"})),
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Missing or invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.as_deref().map(str::trim).unwrap_or_default();
    let password = req.password.as_deref().unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and password are required.".to_string(),
        ));
    }

    let invalid = || ApiError::BadRequest("Invalid email or password.".to_string());

    let user = state
        .store
        .find_user_by_email(&email.to_lowercase())?
        .ok_or_else(invalid)?;

    if !verify_password(password, &user.password_hash) {
        tracing::debug!(user_id = %user.id, "Rejected login with wrong password");
        return Err(invalid());
    }

    let tokens = issue_tokens(&state, &user)?;
    Ok(Json(AuthResponse::new(user, tokens)))
}
