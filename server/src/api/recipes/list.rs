use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};

use super::RecipeResponse;
use crate::api::{ApiError, PageParams, Paginated};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/list-recipes/",
    tag = "recipes",
    params(PageParams),
    responses(
        (status = 200, description = "Newest recipes first", body = Paginated<RecipeResponse>)
    )
)]
pub async fn list_recipes(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let window = params.window();
    let page = state.store.list_recipes(window.offset, window.limit)?;

    let results = page.items.into_iter().map(RecipeResponse::from).collect();
    Ok(Json(Paginated::new(
        "/list-recipes/",
        window,
        page.total,
        results,
    )))
}
