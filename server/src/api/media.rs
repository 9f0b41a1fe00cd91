//! Stored image bytes, served back by id.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use utoipa::OpenApi;
use uuid::Uuid;

use super::{ApiError, ErrorResponse};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/media/ingredients/{id}", get(get_ingredient_image))
        .route("/media/step-pictures/{id}", get(get_step_picture))
        .route("/media/thumbnails/{id}", get(get_recipe_thumbnail))
}

#[derive(OpenApi)]
#[openapi(paths(get_ingredient_image, get_step_picture, get_recipe_thumbnail))]
pub struct ApiDoc;

pub fn ingredient_image_url(id: Uuid) -> String {
    format!("/media/ingredients/{}", id)
}

pub fn step_picture_url(id: Uuid) -> String {
    format!("/media/step-pictures/{}", id)
}

pub fn thumbnail_url(recipe_id: Uuid) -> String {
    format!("/media/thumbnails/{}", recipe_id)
}

/// Ids arrive as raw path segments so a malformed id is a 404 like any
/// other unknown id.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::not_found())
}

fn image_response(content_type: String, data: Vec<u8>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "public, max-age=86400".to_string()),
        ],
        data,
    )
}

#[utoipa::path(
    get,
    path = "/media/ingredients/{id}",
    tag = "media",
    params(
        ("id" = Uuid, Path, description = "Ingredient ID")
    ),
    responses(
        (status = 200, description = "Image bytes", content_type = "application/octet-stream"),
        (status = 404, description = "Ingredient not found", body = ErrorResponse)
    )
)]
pub async fn get_ingredient_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let image = state.store.ingredient_image(parse_id(&id)?)?;
    Ok(image_response(image.content_type, image.data))
}

#[utoipa::path(
    get,
    path = "/media/step-pictures/{id}",
    tag = "media",
    params(
        ("id" = Uuid, Path, description = "Step picture ID")
    ),
    responses(
        (status = 200, description = "Image bytes", content_type = "application/octet-stream"),
        (status = 404, description = "Step picture not found", body = ErrorResponse)
    )
)]
pub async fn get_step_picture(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let image = state.store.step_picture_image(parse_id(&id)?)?;
    Ok(image_response(image.content_type, image.data))
}

#[utoipa::path(
    get,
    path = "/media/thumbnails/{id}",
    tag = "media",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    responses(
        (status = 200, description = "JPEG thumbnail", content_type = "image/jpeg"),
        (status = 404, description = "Recipe or thumbnail not found", body = ErrorResponse)
    )
)]
pub async fn get_recipe_thumbnail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let data = state.store.recipe_thumbnail(parse_id(&id)?)?;
    Ok(image_response("image/jpeg".to_string(), data))
}

#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};

    use crate::test_support::{body_bytes, get, png_bytes, TestApp};

    #[tokio::test]
    async fn test_serves_stored_ingredient_image() {
        let app = TestApp::new();
        let catalog = app.catalog();

        let response = app
            .send(get(
                &format!("/media/ingredients/{}", catalog.ingredients[0]),
                None,
            ))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        assert_eq!(body_bytes(response).await, png_bytes(2, 2));
    }

    #[tokio::test]
    async fn test_unknown_or_malformed_ids_are_not_found() {
        let app = TestApp::new();
        for uri in [
            format!("/media/step-pictures/{}", uuid::Uuid::new_v4()),
            "/media/step-pictures/not-a-uuid".to_string(),
            format!("/media/thumbnails/{}", uuid::Uuid::new_v4()),
        ] {
            let (status, body) = app.json(get(&uri, None)).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{}", uri);
            assert_eq!(body["error"], "Not found.");
        }
    }
}
