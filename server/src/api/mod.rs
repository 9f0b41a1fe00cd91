pub mod catalog;
pub mod engagement;
mod error;
pub mod import;
pub mod media;
mod pagination;
pub mod recipes;
pub mod stats;
mod uploads;
pub mod users;

pub use error::{ApiError, JsonBody, ValidationErrorResponse};
pub use pagination::{PageParams, Paginated, Window};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use serde::Serialize;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{OpenApi, ToSchema};

use crate::state::AppState;

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// Every API route. App routes sit at the root, account routes under `/users`.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(recipes::router())
        .merge(catalog::router())
        .merge(engagement::router())
        .merge(import::router())
        .merge(stats::router())
        .merge(media::router())
        .nest("/users", users::router())
}

/// The API with state applied and the upload size limit in place.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    router()
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(
        info(title = "recipebox", description = "Recipe sharing API"),
        components(schemas(ErrorResponse, MessageResponse, ValidationErrorResponse))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    if let Some(components) = spec.components.as_mut() {
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }

    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        users::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
        catalog::ApiDoc::openapi(),
        engagement::ApiDoc::openapi(),
        import::ApiDoc::openapi(),
        stats::ApiDoc::openapi(),
        media::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let spec = openapi();
        for path in [
            "/create-receipe/",
            "/update-receipe/{id}/",
            "/update-receipe/{id}/thumbnail/",
            "/delete-receipe/",
            "/upload-excel/",
            "/create-ingredients/",
            "/create-cuisine/",
            "/create-step-picture/",
            "/create-favourites/",
            "/create-ratings/",
            "/list-recipes/",
            "/detail-recipe/{id}/",
            "/recipe-pdf/",
            "/cuisine-stats/",
            "/media/ingredients/{id}",
            "/media/step-pictures/{id}",
            "/media/thumbnails/{id}",
            "/users/register-user/",
            "/users/login/",
            "/users/logout/",
            "/users/get-access-token/",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
        assert!(spec
            .components
            .unwrap()
            .security_schemes
            .contains_key("bearer_auth"));
    }
}
