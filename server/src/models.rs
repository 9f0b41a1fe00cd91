use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::{
    blacklisted_tokens, creator_profiles, cuisines, favourites, ingredients, ratings,
    recipe_ingredients, recipe_step_pictures, recipes, step_pictures, users, viewer_profiles,
};

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub user_type: String,
    pub phone_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub user_type: &'a str,
    pub phone_number: Option<&'a str>,
}

#[derive(Insertable)]
#[diesel(table_name = creator_profiles)]
pub struct NewCreatorProfile<'a> {
    pub user_id: Uuid,
    pub restaurant_name: Option<&'a str>,
}

#[derive(Insertable)]
#[diesel(table_name = viewer_profiles)]
pub struct NewViewerProfile<'a> {
    pub user_id: Uuid,
    pub address: Option<&'a str>,
    pub preferences: Option<serde_json::Value>,
}

#[derive(Insertable)]
#[diesel(table_name = blacklisted_tokens)]
pub struct NewBlacklistedToken {
    pub jti: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = cuisines)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CuisineRow {
    pub id: Uuid,
    pub name: String,
}

#[derive(Insertable)]
#[diesel(table_name = cuisines)]
pub struct NewCuisine<'a> {
    pub name: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = ingredients)]
pub struct NewIngredient<'a> {
    pub name: &'a str,
    pub image_content_type: &'a str,
    pub image: &'a [u8],
}

#[derive(Insertable)]
#[diesel(table_name = step_pictures)]
pub struct NewStepPicture<'a> {
    pub content_type: &'a str,
    pub data: &'a [u8],
}

/// Recipe columns minus the thumbnail blob.
#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = recipes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RecipeRow {
    pub id: Uuid,
    pub creator_id: Uuid,
    pub cuisine_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub instructions: String,
    pub prep_duration: i32,
    pub cook_duration: i32,
    #[diesel(select_expression = recipes::thumbnail.is_not_null())]
    #[diesel(select_expression_type = diesel::dsl::IsNotNull<recipes::thumbnail>)]
    pub has_thumbnail: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = recipes)]
pub struct NewRecipe<'a> {
    pub creator_id: Uuid,
    pub cuisine_id: Option<Uuid>,
    pub title: &'a str,
    pub description: &'a str,
    pub instructions: &'a str,
    pub prep_duration: i32,
    pub cook_duration: i32,
}

/// Partial update; `None` fields are left out of the UPDATE.
#[derive(AsChangeset)]
#[diesel(table_name = recipes)]
pub struct RecipeChanges<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub instructions: Option<&'a str>,
    pub prep_duration: Option<i32>,
    pub cook_duration: Option<i32>,
    pub cuisine_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = recipe_ingredients)]
pub struct NewRecipeIngredient {
    pub recipe_id: Uuid,
    pub ingredient_id: Uuid,
    pub position: i32,
}

#[derive(Insertable)]
#[diesel(table_name = recipe_step_pictures)]
pub struct NewRecipeStepPicture {
    pub recipe_id: Uuid,
    pub step_picture_id: Uuid,
    pub position: i32,
}

#[derive(Insertable)]
#[diesel(table_name = favourites)]
pub struct NewFavourite {
    pub user_id: Uuid,
    pub recipe_id: Uuid,
}

#[derive(Queryable, Selectable, Debug)]
#[diesel(table_name = ratings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RatingRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub recipe_id: Uuid,
    pub score: i32,
}

#[derive(Insertable)]
#[diesel(table_name = ratings)]
pub struct NewRating {
    pub user_id: Uuid,
    pub recipe_id: Uuid,
    pub score: i32,
}
