use std::collections::HashMap;

use chrono::{DateTime, Utc};
use diesel::dsl::{exists, sql};
use diesel::pg::upsert::excluded;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_types::{BigInt, Double, Nullable};
use recipebox_core::{RecipeDraft, RecipePatch};
use uuid::Uuid;

use super::{
    Cuisine, CuisineStat, IngredientSummary, NewAccount, Page, Profile, Rating, RecipeDetail,
    RecipeStore, StoreError, StoredImage, User,
};
use crate::db::DbPool;
use crate::models::{
    CuisineRow, NewBlacklistedToken, NewCreatorProfile, NewCuisine, NewFavourite, NewIngredient,
    NewRating, NewRecipe, NewRecipeIngredient, NewRecipeStepPicture, NewStepPicture, NewUser,
    NewViewerProfile, RatingRow, RecipeChanges, RecipeRow, UserRow,
};
use crate::raw_sql::{CuisineStatRow, CUISINE_STATS_QUERY};
use crate::schema::{
    blacklisted_tokens, creator_profiles, cuisines, favourites, ingredients, ratings,
    recipe_ingredients, recipe_step_pictures, recipes, step_pictures, users, viewer_profiles,
};

type PgConn = PooledConnection<ConnectionManager<PgConnection>>;

#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl std::fmt::Debug for PgStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.pool.state();
        f.debug_struct("PgStore")
            .field("connections", &state.connections)
            .field("idle_connections", &state.idle_connections)
            .finish()
    }
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PgConn, StoreError> {
        self.pool
            .get()
            .map_err(|e| StoreError::Database(format!("Failed to get connection: {}", e)))
    }
}

/// Foreign keys whose violation means the client named a missing object.
fn reference_field(constraint: &str) -> Option<&'static str> {
    match constraint {
        "recipes_creator_id_fkey" => Some("creator"),
        "recipes_cuisine_id_fkey" => Some("cuisine"),
        "recipe_ingredients_ingredient_id_fkey" => Some("ingredients"),
        "recipe_step_pictures_step_picture_id_fkey" => Some("step_pictures"),
        "favourites_recipe_id_fkey" | "ratings_recipe_id_fkey" => Some("recipe"),
        "blacklisted_tokens_user_id_fkey" => Some("user"),
        _ => None,
    }
}

impl From<DieselError> for StoreError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::NotFound => StoreError::NotFound,
            DieselError::DatabaseError(kind, info) => {
                let constraint = info.constraint_name().unwrap_or_default();
                match kind {
                    DatabaseErrorKind::UniqueViolation if constraint == "users_email_key" => {
                        StoreError::Duplicate {
                            field: "email",
                            message: "user with this email already exists.".to_string(),
                        }
                    }
                    DatabaseErrorKind::UniqueViolation if constraint == "cuisines_name_key" => {
                        StoreError::Duplicate {
                            field: "name",
                            message: "cuisine with this name already exists.".to_string(),
                        }
                    }
                    DatabaseErrorKind::ForeignKeyViolation => match reference_field(constraint) {
                        Some(field) => StoreError::InvalidReference {
                            field,
                            message: "Referenced object does not exist.".to_string(),
                        },
                        None => StoreError::Database(info.message().to_string()),
                    },
                    _ => StoreError::Database(info.message().to_string()),
                }
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}

fn user_from_row(row: UserRow) -> Result<User, StoreError> {
    let user_type = row
        .user_type
        .parse()
        .map_err(|e: String| StoreError::Database(format!("Corrupt user_type: {}", e)))?;
    Ok(User {
        id: row.id,
        email: row.email,
        password_hash: row.password_hash,
        user_type,
        phone_number: row.phone_number,
        created_at: row.created_at,
    })
}

fn first_missing(wanted: &[Uuid], found: &[Uuid]) -> Option<Uuid> {
    wanted.iter().find(|id| !found.contains(id)).copied()
}

/// Resolve every referenced id up front so the error names the missing one.
fn check_references(
    conn: &mut PgConnection,
    cuisine_id: Option<Uuid>,
    ingredient_ids: Option<&[Uuid]>,
    step_picture_ids: Option<&[Uuid]>,
) -> Result<(), StoreError> {
    if let Some(id) = cuisine_id {
        let found: bool = diesel::select(exists(cuisines::table.find(id))).get_result(conn)?;
        if !found {
            return Err(StoreError::missing_reference("cuisine", id));
        }
    }

    if let Some(ids) = ingredient_ids.filter(|ids| !ids.is_empty()) {
        let found: Vec<Uuid> = ingredients::table
            .filter(ingredients::id.eq_any(ids))
            .select(ingredients::id)
            .load(conn)?;
        if let Some(id) = first_missing(ids, &found) {
            return Err(StoreError::missing_reference("ingredients", id));
        }
    }

    if let Some(ids) = step_picture_ids.filter(|ids| !ids.is_empty()) {
        let found: Vec<Uuid> = step_pictures::table
            .filter(step_pictures::id.eq_any(ids))
            .select(step_pictures::id)
            .load(conn)?;
        if let Some(id) = first_missing(ids, &found) {
            return Err(StoreError::missing_reference("step_pictures", id));
        }
    }

    Ok(())
}

fn replace_ingredients(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    ids: &[Uuid],
) -> Result<(), StoreError> {
    diesel::delete(recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)))
        .execute(conn)?;

    if ids.is_empty() {
        return Ok(());
    }

    let links: Vec<NewRecipeIngredient> = ids
        .iter()
        .zip(0..)
        .map(|(ingredient_id, position)| NewRecipeIngredient {
            recipe_id,
            ingredient_id: *ingredient_id,
            position,
        })
        .collect();
    diesel::insert_into(recipe_ingredients::table)
        .values(&links)
        .execute(conn)?;
    Ok(())
}

fn replace_step_pictures(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    ids: &[Uuid],
) -> Result<(), StoreError> {
    diesel::delete(
        recipe_step_pictures::table.filter(recipe_step_pictures::recipe_id.eq(recipe_id)),
    )
    .execute(conn)?;

    if ids.is_empty() {
        return Ok(());
    }

    let links: Vec<NewRecipeStepPicture> = ids
        .iter()
        .zip(0..)
        .map(|(step_picture_id, position)| NewRecipeStepPicture {
            recipe_id,
            step_picture_id: *step_picture_id,
            position,
        })
        .collect();
    diesel::insert_into(recipe_step_pictures::table)
        .values(&links)
        .execute(conn)?;
    Ok(())
}

/// Attach cuisine, ingredients and step pictures to recipe rows, keeping
/// the row order. Three queries regardless of the number of rows.
fn hydrate(conn: &mut PgConnection, rows: Vec<RecipeRow>) -> Result<Vec<RecipeDetail>, StoreError> {
    let recipe_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let cuisine_ids: Vec<Uuid> = rows.iter().filter_map(|r| r.cuisine_id).collect();

    let cuisines_by_id: HashMap<Uuid, String> = cuisines::table
        .filter(cuisines::id.eq_any(&cuisine_ids))
        .select(CuisineRow::as_select())
        .load(conn)?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let mut ingredients_by_recipe: HashMap<Uuid, Vec<IngredientSummary>> = HashMap::new();
    let ingredient_links: Vec<(Uuid, Uuid, String)> = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(&recipe_ids))
        .order((recipe_ingredients::recipe_id, recipe_ingredients::position))
        .select((
            recipe_ingredients::recipe_id,
            ingredients::id,
            ingredients::name,
        ))
        .load(conn)?;
    for (recipe_id, id, name) in ingredient_links {
        ingredients_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(IngredientSummary { id, name });
    }

    let mut steps_by_recipe: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    let step_links: Vec<(Uuid, Uuid)> = recipe_step_pictures::table
        .filter(recipe_step_pictures::recipe_id.eq_any(&recipe_ids))
        .order((
            recipe_step_pictures::recipe_id,
            recipe_step_pictures::position,
        ))
        .select((
            recipe_step_pictures::recipe_id,
            recipe_step_pictures::step_picture_id,
        ))
        .load(conn)?;
    for (recipe_id, step_picture_id) in step_links {
        steps_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(step_picture_id);
    }

    Ok(rows
        .into_iter()
        .map(|row| RecipeDetail {
            cuisine: row.cuisine_id.and_then(|id| {
                cuisines_by_id.get(&id).map(|name| Cuisine {
                    id,
                    name: name.clone(),
                })
            }),
            ingredients: ingredients_by_recipe.remove(&row.id).unwrap_or_default(),
            step_picture_ids: steps_by_recipe.remove(&row.id).unwrap_or_default(),
            id: row.id,
            creator_id: row.creator_id,
            title: row.title,
            description: row.description,
            instructions: row.instructions,
            prep_duration: row.prep_duration,
            cook_duration: row.cook_duration,
            has_thumbnail: row.has_thumbnail,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
        .collect())
}

fn load_detail(conn: &mut PgConnection, recipe_id: Uuid) -> Result<RecipeDetail, StoreError> {
    let row = recipes::table
        .find(recipe_id)
        .select(RecipeRow::as_select())
        .first(conn)?;
    hydrate(conn, vec![row])?
        .into_iter()
        .next()
        .ok_or(StoreError::NotFound)
}

/// Lock the recipe row if it belongs to `creator_id`.
fn lock_owned_recipe(
    conn: &mut PgConnection,
    creator_id: Uuid,
    recipe_id: Uuid,
) -> Result<(), StoreError> {
    recipes::table
        .filter(recipes::id.eq(recipe_id))
        .filter(recipes::creator_id.eq(creator_id))
        .select(recipes::id)
        .for_update()
        .first::<Uuid>(conn)
        .optional()?
        .map(|_| ())
        .ok_or(StoreError::NotFound)
}

impl RecipeStore for PgStore {
    fn create_account(&self, account: &NewAccount) -> Result<User, StoreError> {
        let mut conn = self.conn()?;
        conn.transaction(|conn| {
            let row: UserRow = diesel::insert_into(users::table)
                .values(&NewUser {
                    email: &account.email,
                    password_hash: &account.password_hash,
                    user_type: account.user_type().as_str(),
                    phone_number: account.phone_number.as_deref(),
                })
                .returning(UserRow::as_returning())
                .get_result(conn)?;

            match &account.profile {
                Profile::Creator { restaurant_name } => {
                    diesel::insert_into(creator_profiles::table)
                        .values(&NewCreatorProfile {
                            user_id: row.id,
                            restaurant_name: restaurant_name.as_deref(),
                        })
                        .execute(conn)?;
                }
                Profile::Viewer {
                    address,
                    preferences,
                } => {
                    diesel::insert_into(viewer_profiles::table)
                        .values(&NewViewerProfile {
                            user_id: row.id,
                            address: address.as_deref(),
                            preferences: preferences.clone(),
                        })
                        .execute(conn)?;
                }
            }

            user_from_row(row)
        })
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.conn()?;
        users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(user_from_row)
            .transpose()
    }

    fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let mut conn = self.conn()?;
        users::table
            .find(id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(user_from_row)
            .transpose()
    }

    fn blacklist_token(
        &self,
        jti: Uuid,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        diesel::insert_into(blacklisted_tokens::table)
            .values(&NewBlacklistedToken {
                jti,
                user_id,
                expires_at,
            })
            .on_conflict(blacklisted_tokens::jti)
            .do_nothing()
            .execute(&mut conn)?;
        Ok(())
    }

    fn is_token_blacklisted(&self, jti: Uuid) -> Result<bool, StoreError> {
        let mut conn = self.conn()?;
        Ok(diesel::select(exists(blacklisted_tokens::table.find(jti))).get_result(&mut conn)?)
    }

    fn create_cuisine(&self, name: &str) -> Result<Cuisine, StoreError> {
        let mut conn = self.conn()?;
        let row: CuisineRow = conn.transaction(|conn| {
            diesel::insert_into(cuisines::table)
                .values(&NewCuisine { name })
                .returning(CuisineRow::as_returning())
                .get_result(conn)
        })?;
        Ok(Cuisine {
            id: row.id,
            name: row.name,
        })
    }

    fn create_ingredient(
        &self,
        name: &str,
        image: &StoredImage,
    ) -> Result<IngredientSummary, StoreError> {
        let mut conn = self.conn()?;
        let (id, name): (Uuid, String) = diesel::insert_into(ingredients::table)
            .values(&NewIngredient {
                name,
                image_content_type: &image.content_type,
                image: &image.data,
            })
            .returning((ingredients::id, ingredients::name))
            .get_result(&mut conn)?;
        Ok(IngredientSummary { id, name })
    }

    fn create_step_picture(&self, image: &StoredImage) -> Result<Uuid, StoreError> {
        let mut conn = self.conn()?;
        Ok(diesel::insert_into(step_pictures::table)
            .values(&NewStepPicture {
                content_type: &image.content_type,
                data: &image.data,
            })
            .returning(step_pictures::id)
            .get_result(&mut conn)?)
    }

    fn ingredient_image(&self, id: Uuid) -> Result<StoredImage, StoreError> {
        let mut conn = self.conn()?;
        let (content_type, data) = ingredients::table
            .find(id)
            .select((ingredients::image_content_type, ingredients::image))
            .first::<(String, Vec<u8>)>(&mut conn)?;
        Ok(StoredImage { content_type, data })
    }

    fn step_picture_image(&self, id: Uuid) -> Result<StoredImage, StoreError> {
        let mut conn = self.conn()?;
        let (content_type, data) = step_pictures::table
            .find(id)
            .select((step_pictures::content_type, step_pictures::data))
            .first::<(String, Vec<u8>)>(&mut conn)?;
        Ok(StoredImage { content_type, data })
    }

    fn recipe_thumbnail(&self, recipe_id: Uuid) -> Result<Vec<u8>, StoreError> {
        let mut conn = self.conn()?;
        recipes::table
            .find(recipe_id)
            .select(recipes::thumbnail)
            .first::<Option<Vec<u8>>>(&mut conn)?
            .ok_or(StoreError::NotFound)
    }

    fn create_recipe(
        &self,
        creator_id: Uuid,
        draft: &RecipeDraft,
    ) -> Result<RecipeDetail, StoreError> {
        let mut conn = self.conn()?;
        conn.transaction(|conn| {
            check_references(
                conn,
                Some(draft.cuisine_id),
                Some(&draft.ingredient_ids),
                Some(&draft.step_picture_ids),
            )?;

            let recipe_id: Uuid = diesel::insert_into(recipes::table)
                .values(&NewRecipe {
                    creator_id,
                    cuisine_id: Some(draft.cuisine_id),
                    title: &draft.title,
                    description: &draft.description,
                    instructions: &draft.instructions,
                    prep_duration: draft.prep_duration,
                    cook_duration: draft.cook_duration,
                })
                .returning(recipes::id)
                .get_result(conn)?;

            replace_ingredients(conn, recipe_id, &draft.ingredient_ids)?;
            replace_step_pictures(conn, recipe_id, &draft.step_picture_ids)?;

            load_detail(conn, recipe_id)
        })
    }

    fn update_recipe(
        &self,
        creator_id: Uuid,
        recipe_id: Uuid,
        patch: &RecipePatch,
    ) -> Result<RecipeDetail, StoreError> {
        let mut conn = self.conn()?;
        conn.transaction(|conn| {
            lock_owned_recipe(conn, creator_id, recipe_id)?;
            check_references(
                conn,
                patch.cuisine_id,
                patch.ingredient_ids.as_deref(),
                patch.step_picture_ids.as_deref(),
            )?;

            diesel::update(recipes::table.find(recipe_id))
                .set(&RecipeChanges {
                    title: patch.title.as_deref(),
                    description: patch.description.as_deref(),
                    instructions: patch.instructions.as_deref(),
                    prep_duration: patch.prep_duration,
                    cook_duration: patch.cook_duration,
                    cuisine_id: patch.cuisine_id,
                    updated_at: Utc::now(),
                })
                .execute(conn)?;

            if let Some(ids) = &patch.ingredient_ids {
                replace_ingredients(conn, recipe_id, ids)?;
            }
            if let Some(ids) = &patch.step_picture_ids {
                replace_step_pictures(conn, recipe_id, ids)?;
            }

            load_detail(conn, recipe_id)
        })
    }

    fn delete_recipe(&self, creator_id: Uuid, recipe_id: Uuid) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            recipes::table
                .filter(recipes::id.eq(recipe_id))
                .filter(recipes::creator_id.eq(creator_id)),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn set_recipe_thumbnail(
        &self,
        creator_id: Uuid,
        recipe_id: Uuid,
        jpeg: &[u8],
    ) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        let updated = diesel::update(
            recipes::table
                .filter(recipes::id.eq(recipe_id))
                .filter(recipes::creator_id.eq(creator_id)),
        )
        .set((
            recipes::thumbnail.eq(Some(jpeg)),
            recipes::updated_at.eq(Utc::now()),
        ))
        .execute(&mut conn)?;

        if updated == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    fn get_recipe(&self, recipe_id: Uuid) -> Result<RecipeDetail, StoreError> {
        let mut conn = self.conn()?;
        load_detail(&mut conn, recipe_id)
    }

    fn list_recipes(&self, offset: i64, limit: i64) -> Result<Page<RecipeDetail>, StoreError> {
        let mut conn = self.conn()?;
        let total: i64 = recipes::table.count().get_result(&mut conn)?;
        let rows: Vec<RecipeRow> = recipes::table
            .select(RecipeRow::as_select())
            .order((recipes::created_at.desc(), recipes::id.desc()))
            .offset(offset)
            .limit(limit)
            .load(&mut conn)?;

        Ok(Page {
            items: hydrate(&mut conn, rows)?,
            total,
        })
    }

    fn add_favourite(&self, user_id: Uuid, recipe_id: Uuid) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        let found: bool =
            diesel::select(exists(recipes::table.find(recipe_id))).get_result(&mut conn)?;
        if !found {
            return Err(StoreError::NotFound);
        }

        diesel::insert_into(favourites::table)
            .values(&NewFavourite { user_id, recipe_id })
            .on_conflict((favourites::user_id, favourites::recipe_id))
            .do_nothing()
            .execute(&mut conn)
            .map_err(|e| match StoreError::from(e) {
                // Deleted between the check and the insert.
                StoreError::InvalidReference { .. } => StoreError::NotFound,
                other => other,
            })?;
        Ok(())
    }

    fn remove_favourite(&self, user_id: Uuid, recipe_id: Uuid) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        diesel::delete(
            favourites::table
                .filter(favourites::user_id.eq(user_id))
                .filter(favourites::recipe_id.eq(recipe_id)),
        )
        .execute(&mut conn)?;
        Ok(())
    }

    fn upsert_rating(
        &self,
        user_id: Uuid,
        recipe_id: Uuid,
        score: i32,
    ) -> Result<Rating, StoreError> {
        let mut conn = self.conn()?;
        let found: bool =
            diesel::select(exists(recipes::table.find(recipe_id))).get_result(&mut conn)?;
        if !found {
            return Err(StoreError::missing_reference("recipe", recipe_id));
        }

        let row: RatingRow = diesel::insert_into(ratings::table)
            .values(&NewRating {
                user_id,
                recipe_id,
                score,
            })
            .on_conflict((ratings::user_id, ratings::recipe_id))
            .do_update()
            .set((
                ratings::score.eq(excluded(ratings::score)),
                ratings::updated_at.eq(Utc::now()),
            ))
            .returning(RatingRow::as_returning())
            .get_result(&mut conn)?;

        Ok(Rating {
            id: row.id,
            user_id: row.user_id,
            recipe_id: row.recipe_id,
            score: row.score,
        })
    }

    fn recipe_average_rating(&self, recipe_id: Uuid) -> Result<Option<f64>, StoreError> {
        let mut conn = self.conn()?;
        let average: Option<f64> = ratings::table
            .filter(ratings::recipe_id.eq(recipe_id))
            .select(sql::<Nullable<Double>>("AVG(score)::float8"))
            .get_result(&mut conn)?;
        Ok(average)
    }

    fn cuisine_stats(&self, offset: i64, limit: i64) -> Result<Page<CuisineStat>, StoreError> {
        let mut conn = self.conn()?;
        let total: i64 = cuisines::table.count().get_result(&mut conn)?;
        let rows: Vec<CuisineStatRow> = diesel::sql_query(CUISINE_STATS_QUERY)
            .bind::<BigInt, _>(offset)
            .bind::<BigInt, _>(limit)
            .load(&mut conn)?;

        Ok(Page {
            items: rows
                .into_iter()
                .map(|row| CuisineStat {
                    cuisine_id: row.cuisine_id,
                    cuisine_name: row.cuisine_name,
                    recipe_count: row.recipe_count,
                    average_rating: row.average_rating,
                })
                .collect(),
            total,
        })
    }
}
