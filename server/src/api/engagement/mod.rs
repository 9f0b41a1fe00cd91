pub mod favourites;
pub mod ratings;

use axum::routing::post;
use axum::Router;
use utoipa::OpenApi;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/create-favourites/",
            post(favourites::add_favourite).delete(favourites::remove_favourite),
        )
        .route("/create-ratings/", post(ratings::rate_recipe))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        favourites::add_favourite,
        favourites::remove_favourite,
        ratings::rate_recipe,
    ),
    components(schemas(
        favourites::FavouriteStatus,
        ratings::RatingRequest,
        ratings::RatingResponse,
    ))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use uuid::Uuid;

    use crate::store::RecipeStore;
    use crate::test_support::{draft, json_request, request, TestApp};
    use crate::types::UserType;

    fn favourite(method: Method, uri: &str, token: &str) -> axum::http::Request<Body> {
        request(method, uri, Some(token))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_favourite_add_is_idempotent_and_remove_always_succeeds() {
        let app = TestApp::new();
        let (chef, _) = app.user("chef@example.com", UserType::Creator);
        let (fan, token) = app.user("fan@example.com", UserType::Viewer);
        let catalog = app.catalog();
        let recipe = app
            .store
            .create_recipe(chef.id, &draft(&catalog, &[]))
            .unwrap();
        let uri = format!("/create-favourites/?recipe_id={}", recipe.id);

        for _ in 0..2 {
            let (status, body) = app.json(favourite(Method::POST, &uri, &token)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["status"], "added to favourites");
        }
        assert_eq!(app.store.favourite_count(fan.id, recipe.id), 1);

        for _ in 0..2 {
            let (status, body) = app.json(favourite(Method::DELETE, &uri, &token)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["status"], "removed from favourites");
        }
        assert_eq!(app.store.favourite_count(fan.id, recipe.id), 0);
    }

    #[tokio::test]
    async fn test_favourite_errors() {
        let app = TestApp::new();
        let (_, token) = app.user("fan@example.com", UserType::Viewer);

        let (status, body) = app
            .json(favourite(Method::POST, "/create-favourites/", &token))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing recipe_id query parameter.");

        let uri = format!("/create-favourites/?recipe_id={}", Uuid::new_v4());
        let (status, _) = app.json(favourite(Method::POST, &uri, &token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = app.json(favourite(Method::DELETE, &uri, &token)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rating_twice_keeps_latest_score() {
        let app = TestApp::new();
        let (chef, _) = app.user("chef@example.com", UserType::Creator);
        let (fan, token) = app.user("fan@example.com", UserType::Viewer);
        let catalog = app.catalog();
        let recipe = app
            .store
            .create_recipe(chef.id, &draft(&catalog, &[]))
            .unwrap();

        for score in [2, 5] {
            let (status, body) = app
                .json(json_request(
                    Method::POST,
                    "/create-ratings/",
                    Some(&token),
                    json!({"recipe": recipe.id, "score": score}),
                ))
                .await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(body["score"], score);
        }

        let ratings = app.store.ratings_for(fan.id, recipe.id);
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].score, 5);
    }

    #[tokio::test]
    async fn test_rating_validation() {
        let app = TestApp::new();
        let (chef, token) = app.user("chef@example.com", UserType::Creator);
        let catalog = app.catalog();
        let recipe = app
            .store
            .create_recipe(chef.id, &draft(&catalog, &[]))
            .unwrap();

        for score in [0, 6] {
            let (status, body) = app
                .json(json_request(
                    Method::POST,
                    "/create-ratings/",
                    Some(&token),
                    json!({"recipe": recipe.id, "score": score}),
                ))
                .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert!(body["fields"]["score"].is_array());
        }

        let (status, body) = app
            .json(json_request(
                Method::POST,
                "/create-ratings/",
                Some(&token),
                json!({"recipe": Uuid::new_v4(), "score": 3}),
            ))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["fields"]["recipe"].is_array());

        let (status, body) = app
            .json(json_request(
                Method::POST,
                "/create-ratings/",
                Some(&token),
                json!({}),
            ))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["fields"]["recipe"].is_array());
        assert!(body["fields"]["score"].is_array());
    }
}
