pub mod login;
pub mod logout;
pub mod refresh;
pub mod register;

use axum::routing::post;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use super::ApiError;
use crate::auth::{AuthError, TokenPair};
use crate::state::AppState;
use crate::store::User;
use crate::types::UserType;

/// Returns the router for account endpoints (mounted at /users)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register-user/", post(register::register))
        .route("/login/", post(login::login))
        .route("/logout/", post(logout::logout))
        .route("/get-access-token/", post(refresh::get_access_token))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        register::register,
        login::login,
        logout::logout,
        refresh::get_access_token,
    ),
    components(schemas(
        UserResponse,
        AuthResponse,
        RefreshRequest,
        UserType,
        register::RegisterRequest,
        login::LoginRequest,
        refresh::AccessTokenResponse,
    ))
)]
pub struct ApiDoc;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub user_type: UserType,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            user_type: user.user_type,
            phone_number: user.phone_number,
            created_at: user.created_at,
        }
    }
}

/// Account details plus a fresh token pair.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access: String,
    pub refresh: String,
}

impl AuthResponse {
    fn new(user: User, tokens: TokenPair) -> Self {
        Self {
            user: user.into(),
            access: tokens.access,
            refresh: tokens.refresh,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

fn issue_tokens(state: &AppState, user: &User) -> Result<TokenPair, ApiError> {
    state
        .tokens
        .create_token_pair(user.id, user.user_type)
        .map_err(|e: AuthError| ApiError::Internal(format!("Failed to issue tokens: {}", e)))
}
