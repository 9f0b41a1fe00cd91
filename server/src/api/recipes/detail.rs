use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

use super::RecipeResponse;
use crate::api::media::parse_id;
use crate::api::{ApiError, ErrorResponse};
use crate::state::AppState;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/detail-recipe/{id}/",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "Recipe with cuisine, ingredients and step pictures", body = RecipeResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    )
)]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let recipe_id: Uuid = parse_id(&id)?;
    let recipe = state.store.get_recipe(recipe_id)?;
    Ok(Json(RecipeResponse::from(recipe)))
}
