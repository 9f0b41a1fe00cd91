use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use recipebox_core::recipe::REQUIRED;
use recipebox_core::FieldErrors;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::{ApiError, ErrorResponse, JsonBody, ValidationErrorResponse};
use crate::auth::AuthUser;
use crate::state::AppState;

pub const MIN_SCORE: i64 = 1;
pub const MAX_SCORE: i64 = 5;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RatingRequest {
    /// Recipe ID
    pub recipe: Option<Uuid>,
    /// 1 to 5
    pub score: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RatingResponse {
    pub id: Uuid,
    pub recipe: Uuid,
    pub score: i32,
}

fn validate(req: &RatingRequest) -> Result<(Uuid, i32), FieldErrors> {
    let mut errors = FieldErrors::new();

    if req.recipe.is_none() {
        errors.add("recipe", REQUIRED);
    }
    let score = match req.score {
        None => {
            errors.add("score", REQUIRED);
            0
        }
        Some(score) if score < MIN_SCORE => {
            errors.add(
                "score",
                format!("Ensure this value is greater than or equal to {MIN_SCORE}."),
            );
            0
        }
        Some(score) if score > MAX_SCORE => {
            errors.add(
                "score",
                format!("Ensure this value is less than or equal to {MAX_SCORE}."),
            );
            0
        }
        Some(score) => score as i32,
    };

    errors.into_result()?;
    Ok((req.recipe.unwrap_or_default(), score))
}

/// Rate a recipe. Rating the same recipe again overwrites the earlier score.
#[utoipa::path(
    post,
    path = "/create-ratings/",
    tag = "engagement",
    request_body(content = RatingRequest, example = json!({"recipe": "7d0c5a4e-0f0e-4c52-9d51-2f0f3ee0c9a1", "score": 4})),
    responses(
        (status = 201, description = "Rating stored", body = RatingResponse),
        (status = 400, description = "Invalid score or unknown recipe", body = ValidationErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn rate_recipe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RatingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (recipe_id, score) = validate(&req).map_err(ApiError::Validation)?;

    let rating = state.store.upsert_rating(user.id, recipe_id, score)?;
    tracing::debug!(user_id = %user.id, %recipe_id, score, "Stored rating");

    Ok((
        StatusCode::CREATED,
        Json(RatingResponse {
            id: rating.id,
            recipe: rating.recipe_id,
            score: rating.score,
        }),
    ))
}
