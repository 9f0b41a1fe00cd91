use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::api::media::parse_id;
use crate::api::{ApiError, ErrorResponse};
use crate::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
pub struct FavouriteParams {
    /// Recipe ID
    #[param(value_type = Option<Uuid>)]
    pub recipe_id: Option<String>,
}

impl FavouriteParams {
    fn recipe_id(&self) -> Result<Uuid, ApiError> {
        let raw = self
            .recipe_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                ApiError::BadRequest("Missing recipe_id query parameter.".to_string())
            })?;
        parse_id(raw)
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FavouriteStatus {
    pub status: String,
}

#[utoipa::path(
    post,
    path = "/create-favourites/",
    tag = "engagement",
    params(FavouriteParams),
    responses(
        (status = 200, description = "Recipe is a favourite", body = FavouriteStatus),
        (status = 400, description = "Missing recipe_id", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn add_favourite(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(params): Query<FavouriteParams>,
) -> Result<impl IntoResponse, ApiError> {
    let recipe_id = params.recipe_id()?;
    state.store.add_favourite(user.id, recipe_id)?;

    Ok(Json(FavouriteStatus {
        status: "added to favourites".to_string(),
    }))
}

/// Succeeds whether or not the recipe was a favourite.
#[utoipa::path(
    delete,
    path = "/create-favourites/",
    tag = "engagement",
    params(FavouriteParams),
    responses(
        (status = 200, description = "Recipe is not a favourite", body = FavouriteStatus),
        (status = 400, description = "Missing recipe_id", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn remove_favourite(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(params): Query<FavouriteParams>,
) -> Result<impl IntoResponse, ApiError> {
    // A malformed id cannot name a favourite, so there is nothing to remove.
    match params.recipe_id() {
        Ok(recipe_id) => state.store.remove_favourite(user.id, recipe_id)?,
        Err(ApiError::NotFound(_)) => {}
        Err(e) => return Err(e),
    }

    Ok(Json(FavouriteStatus {
        status: "removed from favourites".to_string(),
    }))
}
