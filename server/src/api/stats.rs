use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::api::{ApiError, PageParams, Paginated};
use crate::state::AppState;
use crate::store::CuisineStat;

pub fn router() -> Router<AppState> {
    Router::new().route("/cuisine-stats/", get(cuisine_stats))
}

#[derive(OpenApi)]
#[openapi(paths(cuisine_stats), components(schemas(CuisineStatResponse)))]
pub struct ApiDoc;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CuisineStatResponse {
    pub cuisine_id: Uuid,
    pub cuisine_name: String,
    pub recipe_count: i64,
    /// Mean of every rating on the cuisine's recipes, two decimal places.
    /// Null when nothing has been rated.
    pub average_rating: Option<f64>,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl From<CuisineStat> for CuisineStatResponse {
    fn from(stat: CuisineStat) -> Self {
        Self {
            cuisine_id: stat.cuisine_id,
            cuisine_name: stat.cuisine_name,
            recipe_count: stat.recipe_count,
            average_rating: stat.average_rating.map(round2),
        }
    }
}

#[utoipa::path(
    get,
    path = "/cuisine-stats/",
    tag = "stats",
    params(PageParams),
    responses(
        (status = 200, description = "Recipe count and average rating per cuisine", body = Paginated<CuisineStatResponse>)
    )
)]
pub async fn cuisine_stats(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, ApiError> {
    let window = params.window();
    let page = state.store.cuisine_stats(window.offset, window.limit)?;

    let results = page
        .items
        .into_iter()
        .map(CuisineStatResponse::from)
        .collect();
    Ok(Json(Paginated::new(
        "/cuisine-stats/",
        window,
        page.total,
        results,
    )))
}
