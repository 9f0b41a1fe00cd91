use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;

use super::{owned, NOT_OWNED};
use crate::api::{ApiError, ErrorResponse};
use crate::auth::CreatorUser;
use crate::state::AppState;
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
pub struct DeleteParams {
    /// Recipe ID
    #[param(value_type = Option<Uuid>)]
    pub id: Option<String>,
}

#[utoipa::path(
    delete,
    path = "/delete-receipe/",
    tag = "recipes",
    params(DeleteParams),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 400, description = "Missing id", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Not a creator", body = ErrorResponse),
        (status = 404, description = "Not found or not authorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_recipe(
    CreatorUser(user): CreatorUser,
    State(state): State<AppState>,
    Query(params): Query<DeleteParams>,
) -> Result<impl IntoResponse, ApiError> {
    let raw = params
        .id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing id query parameter.".to_string()))?;
    let recipe_id =
        Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(NOT_OWNED.to_string()))?;

    state
        .store
        .delete_recipe(user.id, recipe_id)
        .map_err(owned)?;
    tracing::info!(user_id = %user.id, %recipe_id, "Deleted recipe");

    Ok(StatusCode::NO_CONTENT)
}
