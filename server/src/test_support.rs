//! Fixtures shared by unit tests across the server crate.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use recipebox_core::RecipeDraft;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use crate::auth::hash_password;
use crate::config::Config;
use crate::state::AppState;
use crate::store::{MemoryStore, NewAccount, Profile, RecipeStore, StoredImage, User};
use crate::types::UserType;

pub const PASSWORD: &str = "correct horse battery staple";

pub fn seed_user(store: &dyn RecipeStore, email: &str, user_type: UserType) -> User {
    let profile = match user_type {
        UserType::Creator => Profile::Creator {
            restaurant_name: None,
        },
        UserType::Viewer => Profile::Viewer {
            address: None,
            preferences: None,
        },
    };
    store
        .create_account(&NewAccount {
            email: email.to_string(),
            password_hash: hash_password(PASSWORD).unwrap(),
            phone_number: None,
            profile,
        })
        .unwrap()
}

/// Ids of a small catalog: one cuisine, three ingredients, two step pictures.
pub struct Catalog {
    pub cuisine: Uuid,
    pub ingredients: Vec<Uuid>,
    pub step_pictures: Vec<Uuid>,
}

pub fn seed_catalog(store: &dyn RecipeStore) -> Catalog {
    let image = StoredImage {
        content_type: "image/png".to_string(),
        data: png_bytes(2, 2),
    };
    let cuisine = store.create_cuisine("Italian").unwrap().id;
    let ingredients = ["Tomato", "Basil", "Garlic"]
        .iter()
        .map(|name| store.create_ingredient(name, &image).unwrap().id)
        .collect();
    let step_pictures = (0..2)
        .map(|_| store.create_step_picture(&image).unwrap())
        .collect();

    Catalog {
        cuisine,
        ingredients,
        step_pictures,
    }
}

/// A valid draft using the catalog cuisine and the ingredients at `picks`.
pub fn draft(catalog: &Catalog, picks: &[usize]) -> RecipeDraft {
    RecipeDraft {
        title: "Bruschetta".to_string(),
        description: "Toasted bread with tomato".to_string(),
        instructions: "Toast, rub with garlic, top.".to_string(),
        prep_duration: 10,
        cook_duration: 5,
        cuisine_id: catalog.cuisine,
        ingredient_ids: picks.iter().map(|i| catalog.ingredients[*i]).collect(),
        step_picture_ids: Vec::new(),
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 255]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

/// Write an xlsx with the recipe header row followed by `rows`.
/// Empty strings are left as blank cells.
pub fn write_recipe_sheet(dir: &Path, rows: &[[&str; 7]]) -> PathBuf {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    let header = [
        "title",
        "description",
        "instructions",
        "prep_duration",
        "cook_duration",
        "cuisine_id",
        "ingredient_ids",
    ];
    for (col, name) in header.iter().enumerate() {
        sheet.write_string(0, col as u16, *name).unwrap();
    }
    for (row, cells) in rows.iter().enumerate() {
        for (col, value) in cells.iter().enumerate() {
            if !value.is_empty() {
                sheet
                    .write_string(row as u32 + 1, col as u16, *value)
                    .unwrap();
            }
        }
    }

    let path = dir.join(format!("{}.xlsx", Uuid::new_v4()));
    workbook.save(&path).unwrap();
    path
}

/// Router over a fresh in-memory store, with uploads in a temp directory.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub upload_dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let upload_dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(
            Config::for_tests(upload_dir.path().to_path_buf()),
            store.clone(),
        );
        Self {
            router: crate::api::app(state.clone()),
            state,
            store,
            upload_dir,
        }
    }

    pub fn user(&self, email: &str, user_type: UserType) -> (User, String) {
        let user = seed_user(self.store.as_ref(), email, user_type);
        let token = self
            .state
            .tokens
            .create_access_token(user.id, user.user_type)
            .unwrap();
        (user, token)
    }

    pub fn catalog(&self) -> Catalog {
        seed_catalog(self.store.as_ref())
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn json(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.send(request).await;
        let status = response.status();
        let bytes = body_bytes(response).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub fn request(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {}", token)),
        None => builder,
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    request(Method::GET, uri, token).body(Body::empty()).unwrap()
}

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    request(method, uri, token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Hand-built `multipart/form-data` body.
pub struct MultipartBody {
    boundary: String,
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: format!("recipebox-{}", Uuid::new_v4().simple()),
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, filename, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        request(method, uri, token)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", self.boundary),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}
