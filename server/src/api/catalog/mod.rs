pub mod cuisines;
pub mod ingredients;
pub mod step_pictures;

use axum::routing::post;
use axum::Router;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use super::media;
use crate::state::AppState;
use crate::store::{Cuisine, IngredientSummary};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create-cuisine/", post(cuisines::create_cuisine))
        .route("/create-ingredients/", post(ingredients::create_ingredient))
        .route(
            "/create-step-picture/",
            post(step_pictures::create_step_picture),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        cuisines::create_cuisine,
        ingredients::create_ingredient,
        step_pictures::create_step_picture,
    ),
    components(schemas(
        CuisineResponse,
        IngredientResponse,
        StepPictureResponse,
        cuisines::CreateCuisineRequest,
        cuisines::CuisineCreated,
        ingredients::CreateIngredientRequest,
        ingredients::IngredientCreated,
        step_pictures::CreateStepPictureRequest,
        step_pictures::StepPictureCreated,
    ))
)]
pub struct ApiDoc;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CuisineResponse {
    pub id: Uuid,
    pub name: String,
}

impl From<Cuisine> for CuisineResponse {
    fn from(cuisine: Cuisine) -> Self {
        Self {
            id: cuisine.id,
            name: cuisine.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IngredientResponse {
    pub id: Uuid,
    pub name: String,
    /// URL of the ingredient image
    pub image: String,
}

impl From<IngredientSummary> for IngredientResponse {
    fn from(ingredient: IngredientSummary) -> Self {
        Self {
            image: media::ingredient_image_url(ingredient.id),
            id: ingredient.id,
            name: ingredient.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StepPictureResponse {
    pub id: Uuid,
    /// URL of the picture
    pub image: String,
}

impl From<Uuid> for StepPictureResponse {
    fn from(id: Uuid) -> Self {
        Self {
            id,
            image: media::step_picture_url(id),
        }
    }
}
