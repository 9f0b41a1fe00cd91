use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::api::ApiError;
use crate::state::AppState;
use crate::store::User;
use crate::types::UserType;

pub const PERMISSION_DENIED: &str = "You do not have permission to perform this action.";

/// Any authenticated user, resolved from an `Authorization: Bearer` access token.
pub struct AuthUser(pub User);

/// An authenticated user with the `creator` role.
pub struct CreatorUser(pub User);

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let value = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| {
            ApiError::Unauthorized("Authentication credentials were not provided.".to_string())
        })?;

    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header format".to_string()))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state.tokens.verify_access_token(token).map_err(|e| {
            tracing::debug!("Rejected access token: {}", e);
            ApiError::Unauthorized("Given token not valid for any token type".to_string())
        })?;

        let user = state
            .store
            .get_user(claims.sub)?
            .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

        Ok(AuthUser(user))
    }
}

impl FromRequestParts<AppState> for CreatorUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if user.user_type != UserType::Creator {
            return Err(ApiError::Forbidden(PERMISSION_DENIED.to_string()));
        }
        Ok(CreatorUser(user))
    }
}
