use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use recipebox_core::{RecipeDraft, RecipePatch};
use uuid::Uuid;

use super::{
    Cuisine, CuisineStat, IngredientSummary, NewAccount, Page, Profile, Rating, RecipeDetail,
    RecipeStore, StoreError, StoredImage, User,
};

/// In-process store with the same constraint and cascade behaviour as the
/// Postgres schema. Selected with `RECIPEBOX_STORE=memory`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    profiles: HashMap<Uuid, Profile>,
    blacklisted: HashMap<Uuid, DateTime<Utc>>,
    cuisines: HashMap<Uuid, String>,
    ingredients: HashMap<Uuid, (String, StoredImage)>,
    step_pictures: HashMap<Uuid, StoredImage>,
    recipes: HashMap<Uuid, StoredRecipe>,
    next_seq: u64,
    favourites: HashSet<(Uuid, Uuid)>,
    ratings: HashMap<(Uuid, Uuid), Rating>,
}

#[derive(Debug, Clone)]
struct StoredRecipe {
    seq: u64,
    creator_id: Uuid,
    cuisine_id: Option<Uuid>,
    title: String,
    description: String,
    instructions: String,
    prep_duration: i32,
    cook_duration: i32,
    thumbnail: Option<Vec<u8>>,
    ingredient_ids: Vec<Uuid>,
    step_picture_ids: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Database("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Database("memory store lock poisoned".to_string()))
    }
}

#[cfg(test)]
impl MemoryStore {
    pub fn favourite_count(&self, user_id: Uuid, recipe_id: Uuid) -> usize {
        usize::from(self.read().unwrap().favourites.contains(&(user_id, recipe_id)))
    }

    pub fn ratings_for(&self, user_id: Uuid, recipe_id: Uuid) -> Vec<Rating> {
        self.read()
            .unwrap()
            .ratings
            .values()
            .filter(|r| r.user_id == user_id && r.recipe_id == recipe_id)
            .cloned()
            .collect()
    }

    pub fn recipe_count(&self) -> usize {
        self.read().unwrap().recipes.len()
    }

    pub fn has_profile(&self, user_id: Uuid) -> bool {
        self.read().unwrap().profiles.contains_key(&user_id)
    }
}

impl State {
    fn check_references(
        &self,
        cuisine_id: Option<Uuid>,
        ingredient_ids: Option<&[Uuid]>,
        step_picture_ids: Option<&[Uuid]>,
    ) -> Result<(), StoreError> {
        if let Some(id) = cuisine_id {
            if !self.cuisines.contains_key(&id) {
                return Err(StoreError::missing_reference("cuisine", id));
            }
        }
        for id in ingredient_ids.unwrap_or_default() {
            if !self.ingredients.contains_key(id) {
                return Err(StoreError::missing_reference("ingredients", *id));
            }
        }
        for id in step_picture_ids.unwrap_or_default() {
            if !self.step_pictures.contains_key(id) {
                return Err(StoreError::missing_reference("step_pictures", *id));
            }
        }
        Ok(())
    }

    fn owned_recipe_mut(
        &mut self,
        creator_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<&mut StoredRecipe, StoreError> {
        self.recipes
            .get_mut(&recipe_id)
            .filter(|r| r.creator_id == creator_id)
            .ok_or(StoreError::NotFound)
    }

    fn detail(&self, id: Uuid, recipe: &StoredRecipe) -> RecipeDetail {
        RecipeDetail {
            id,
            creator_id: recipe.creator_id,
            title: recipe.title.clone(),
            description: recipe.description.clone(),
            instructions: recipe.instructions.clone(),
            prep_duration: recipe.prep_duration,
            cook_duration: recipe.cook_duration,
            has_thumbnail: recipe.thumbnail.is_some(),
            cuisine: recipe.cuisine_id.and_then(|cuisine_id| {
                self.cuisines.get(&cuisine_id).map(|name| Cuisine {
                    id: cuisine_id,
                    name: name.clone(),
                })
            }),
            ingredients: recipe
                .ingredient_ids
                .iter()
                .filter_map(|ingredient_id| {
                    self.ingredients
                        .get(ingredient_id)
                        .map(|(name, _)| IngredientSummary {
                            id: *ingredient_id,
                            name: name.clone(),
                        })
                })
                .collect(),
            step_picture_ids: recipe.step_picture_ids.clone(),
            created_at: recipe.created_at,
            updated_at: recipe.updated_at,
        }
    }
}

fn window<T>(items: Vec<T>, offset: i64, limit: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

impl RecipeStore for MemoryStore {
    fn create_account(&self, account: &NewAccount) -> Result<User, StoreError> {
        let mut state = self.write()?;
        if state.users.values().any(|u| u.email == account.email) {
            return Err(StoreError::Duplicate {
                field: "email",
                message: "user with this email already exists.".to_string(),
            });
        }

        let user = User {
            id: Uuid::new_v4(),
            email: account.email.clone(),
            password_hash: account.password_hash.clone(),
            user_type: account.user_type(),
            phone_number: account.phone_number.clone(),
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        state.profiles.insert(user.id, account.profile.clone());
        Ok(user)
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    fn get_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    fn blacklist_token(
        &self,
        jti: Uuid,
        _user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.write()?.blacklisted.entry(jti).or_insert(expires_at);
        Ok(())
    }

    fn is_token_blacklisted(&self, jti: Uuid) -> Result<bool, StoreError> {
        Ok(self.read()?.blacklisted.contains_key(&jti))
    }

    fn create_cuisine(&self, name: &str) -> Result<Cuisine, StoreError> {
        let mut state = self.write()?;
        if state.cuisines.values().any(|existing| existing == name) {
            return Err(StoreError::Duplicate {
                field: "name",
                message: "cuisine with this name already exists.".to_string(),
            });
        }
        let id = Uuid::new_v4();
        state.cuisines.insert(id, name.to_string());
        Ok(Cuisine {
            id,
            name: name.to_string(),
        })
    }

    fn create_ingredient(
        &self,
        name: &str,
        image: &StoredImage,
    ) -> Result<IngredientSummary, StoreError> {
        let id = Uuid::new_v4();
        self.write()?
            .ingredients
            .insert(id, (name.to_string(), image.clone()));
        Ok(IngredientSummary {
            id,
            name: name.to_string(),
        })
    }

    fn create_step_picture(&self, image: &StoredImage) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        self.write()?.step_pictures.insert(id, image.clone());
        Ok(id)
    }

    fn ingredient_image(&self, id: Uuid) -> Result<StoredImage, StoreError> {
        self.read()?
            .ingredients
            .get(&id)
            .map(|(_, image)| image.clone())
            .ok_or(StoreError::NotFound)
    }

    fn step_picture_image(&self, id: Uuid) -> Result<StoredImage, StoreError> {
        self.read()?
            .step_pictures
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn recipe_thumbnail(&self, recipe_id: Uuid) -> Result<Vec<u8>, StoreError> {
        self.read()?
            .recipes
            .get(&recipe_id)
            .and_then(|r| r.thumbnail.clone())
            .ok_or(StoreError::NotFound)
    }

    fn create_recipe(
        &self,
        creator_id: Uuid,
        draft: &RecipeDraft,
    ) -> Result<RecipeDetail, StoreError> {
        let mut state = self.write()?;
        if !state.users.contains_key(&creator_id) {
            return Err(StoreError::missing_reference("creator", creator_id));
        }
        state.check_references(
            Some(draft.cuisine_id),
            Some(&draft.ingredient_ids),
            Some(&draft.step_picture_ids),
        )?;

        let now = Utc::now();
        state.next_seq += 1;
        let recipe = StoredRecipe {
            seq: state.next_seq,
            creator_id,
            cuisine_id: Some(draft.cuisine_id),
            title: draft.title.clone(),
            description: draft.description.clone(),
            instructions: draft.instructions.clone(),
            prep_duration: draft.prep_duration,
            cook_duration: draft.cook_duration,
            thumbnail: None,
            ingredient_ids: draft.ingredient_ids.clone(),
            step_picture_ids: draft.step_picture_ids.clone(),
            created_at: now,
            updated_at: now,
        };
        let id = Uuid::new_v4();
        let detail = state.detail(id, &recipe);
        state.recipes.insert(id, recipe);
        Ok(detail)
    }

    fn update_recipe(
        &self,
        creator_id: Uuid,
        recipe_id: Uuid,
        patch: &RecipePatch,
    ) -> Result<RecipeDetail, StoreError> {
        let mut state = self.write()?;
        state.owned_recipe_mut(creator_id, recipe_id)?;
        state.check_references(
            patch.cuisine_id,
            patch.ingredient_ids.as_deref(),
            patch.step_picture_ids.as_deref(),
        )?;

        let recipe = state.owned_recipe_mut(creator_id, recipe_id)?;
        if let Some(title) = &patch.title {
            recipe.title = title.clone();
        }
        if let Some(description) = &patch.description {
            recipe.description = description.clone();
        }
        if let Some(instructions) = &patch.instructions {
            recipe.instructions = instructions.clone();
        }
        if let Some(prep_duration) = patch.prep_duration {
            recipe.prep_duration = prep_duration;
        }
        if let Some(cook_duration) = patch.cook_duration {
            recipe.cook_duration = cook_duration;
        }
        if let Some(cuisine_id) = patch.cuisine_id {
            recipe.cuisine_id = Some(cuisine_id);
        }
        if let Some(ids) = &patch.ingredient_ids {
            recipe.ingredient_ids = ids.clone();
        }
        if let Some(ids) = &patch.step_picture_ids {
            recipe.step_picture_ids = ids.clone();
        }
        recipe.updated_at = Utc::now();

        let recipe = recipe.clone();
        Ok(state.detail(recipe_id, &recipe))
    }

    fn delete_recipe(&self, creator_id: Uuid, recipe_id: Uuid) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.owned_recipe_mut(creator_id, recipe_id)?;
        state.recipes.remove(&recipe_id);
        state.favourites.retain(|(_, r)| *r != recipe_id);
        state.ratings.retain(|(_, r), _| *r != recipe_id);
        Ok(())
    }

    fn set_recipe_thumbnail(
        &self,
        creator_id: Uuid,
        recipe_id: Uuid,
        jpeg: &[u8],
    ) -> Result<(), StoreError> {
        let mut state = self.write()?;
        let recipe = state.owned_recipe_mut(creator_id, recipe_id)?;
        recipe.thumbnail = Some(jpeg.to_vec());
        recipe.updated_at = Utc::now();
        Ok(())
    }

    fn get_recipe(&self, recipe_id: Uuid) -> Result<RecipeDetail, StoreError> {
        let state = self.read()?;
        let recipe = state.recipes.get(&recipe_id).ok_or(StoreError::NotFound)?;
        Ok(state.detail(recipe_id, recipe))
    }

    fn list_recipes(&self, offset: i64, limit: i64) -> Result<Page<RecipeDetail>, StoreError> {
        let state = self.read()?;
        let mut recipes: Vec<_> = state.recipes.iter().collect();
        recipes.sort_by(|(_, a), (_, b)| b.seq.cmp(&a.seq));

        let total = recipes.len() as i64;
        let items = window(recipes, offset, limit)
            .into_iter()
            .map(|(id, recipe)| state.detail(*id, recipe))
            .collect();
        Ok(Page { items, total })
    }

    fn add_favourite(&self, user_id: Uuid, recipe_id: Uuid) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if !state.recipes.contains_key(&recipe_id) {
            return Err(StoreError::NotFound);
        }
        state.favourites.insert((user_id, recipe_id));
        Ok(())
    }

    fn remove_favourite(&self, user_id: Uuid, recipe_id: Uuid) -> Result<(), StoreError> {
        self.write()?.favourites.remove(&(user_id, recipe_id));
        Ok(())
    }

    fn upsert_rating(
        &self,
        user_id: Uuid,
        recipe_id: Uuid,
        score: i32,
    ) -> Result<Rating, StoreError> {
        let mut state = self.write()?;
        if !state.recipes.contains_key(&recipe_id) {
            return Err(StoreError::missing_reference("recipe", recipe_id));
        }
        let rating = state
            .ratings
            .entry((user_id, recipe_id))
            .and_modify(|existing| existing.score = score)
            .or_insert_with(|| Rating {
                id: Uuid::new_v4(),
                user_id,
                recipe_id,
                score,
            });
        Ok(rating.clone())
    }

    fn recipe_average_rating(&self, recipe_id: Uuid) -> Result<Option<f64>, StoreError> {
        let state = self.read()?;
        let scores: Vec<f64> = state
            .ratings
            .values()
            .filter(|r| r.recipe_id == recipe_id)
            .map(|r| f64::from(r.score))
            .collect();
        Ok((!scores.is_empty()).then(|| scores.iter().sum::<f64>() / scores.len() as f64))
    }

    fn cuisine_stats(&self, offset: i64, limit: i64) -> Result<Page<CuisineStat>, StoreError> {
        let state = self.read()?;
        let mut cuisines: Vec<_> = state.cuisines.iter().collect();
        cuisines.sort_by(|(a_id, a_name), (b_id, b_name)| {
            a_name.cmp(b_name).then_with(|| a_id.cmp(b_id))
        });

        let total = cuisines.len() as i64;
        let items = window(cuisines, offset, limit)
            .into_iter()
            .map(|(cuisine_id, name)| {
                let recipe_ids: HashSet<Uuid> = state
                    .recipes
                    .iter()
                    .filter(|(_, r)| r.cuisine_id == Some(*cuisine_id))
                    .map(|(id, _)| *id)
                    .collect();
                let scores: Vec<i32> = state
                    .ratings
                    .values()
                    .filter(|r| recipe_ids.contains(&r.recipe_id))
                    .map(|r| r.score)
                    .collect();
                let average_rating = (!scores.is_empty()).then(|| {
                    scores.iter().map(|s| f64::from(*s)).sum::<f64>() / scores.len() as f64
                });

                CuisineStat {
                    cuisine_id: *cuisine_id,
                    cuisine_name: name.clone(),
                    recipe_count: recipe_ids.len() as i64,
                    average_rating,
                }
            })
            .collect();

        Ok(Page { items, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{draft, seed_catalog, seed_user};
    use crate::types::UserType;

    #[test]
    fn test_duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        seed_user(&store, "chef@example.com", UserType::Creator);
        let account = NewAccount {
            email: "chef@example.com".to_string(),
            password_hash: "x".to_string(),
            phone_number: None,
            profile: Profile::Viewer {
                address: None,
                preferences: None,
            },
        };
        assert!(matches!(
            store.create_account(&account),
            Err(StoreError::Duplicate { field: "email", .. })
        ));
    }

    #[test]
    fn test_create_recipe_links_exactly_the_submitted_ingredients() {
        let store = MemoryStore::new();
        let chef = seed_user(&store, "chef@example.com", UserType::Creator);
        let catalog = seed_catalog(&store);

        let detail = store
            .create_recipe(chef.id, &draft(&catalog, &[1, 0]))
            .unwrap();

        let ids: Vec<_> = detail.ingredients.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![catalog.ingredients[1], catalog.ingredients[0]]);
        assert_eq!(detail.cuisine.unwrap().id, catalog.cuisine);
    }

    #[test]
    fn test_unknown_ingredient_writes_nothing() {
        let store = MemoryStore::new();
        let chef = seed_user(&store, "chef@example.com", UserType::Creator);
        let catalog = seed_catalog(&store);
        let mut bad = draft(&catalog, &[0]);
        bad.ingredient_ids.push(Uuid::new_v4());

        let err = store.create_recipe(chef.id, &bad).unwrap_err();

        assert!(matches!(
            err,
            StoreError::InvalidReference {
                field: "ingredients",
                ..
            }
        ));
        assert_eq!(store.recipe_count(), 0);
    }

    #[test]
    fn test_empty_ingredient_patch_clears_associations() {
        let store = MemoryStore::new();
        let chef = seed_user(&store, "chef@example.com", UserType::Creator);
        let catalog = seed_catalog(&store);
        let recipe = store
            .create_recipe(chef.id, &draft(&catalog, &[0, 1]))
            .unwrap();

        let patch = RecipePatch {
            ingredient_ids: Some(vec![]),
            ..Default::default()
        };
        let updated = store.update_recipe(chef.id, recipe.id, &patch).unwrap();

        assert!(updated.ingredients.is_empty());
        assert_eq!(updated.title, recipe.title);
    }

    #[test]
    fn test_update_by_other_user_is_not_found() {
        let store = MemoryStore::new();
        let chef = seed_user(&store, "chef@example.com", UserType::Creator);
        let rival = seed_user(&store, "rival@example.com", UserType::Creator);
        let catalog = seed_catalog(&store);
        let recipe = store.create_recipe(chef.id, &draft(&catalog, &[])).unwrap();

        let patch = RecipePatch {
            title: Some("Stolen".to_string()),
            ..Default::default()
        };
        assert_eq!(
            store.update_recipe(rival.id, recipe.id, &patch).unwrap_err(),
            StoreError::NotFound
        );
        assert_eq!(
            store.delete_recipe(rival.id, recipe.id).unwrap_err(),
            StoreError::NotFound
        );
    }

    #[test]
    fn test_delete_cascades_to_engagement() {
        let store = MemoryStore::new();
        let chef = seed_user(&store, "chef@example.com", UserType::Creator);
        let fan = seed_user(&store, "fan@example.com", UserType::Viewer);
        let catalog = seed_catalog(&store);
        let recipe = store.create_recipe(chef.id, &draft(&catalog, &[])).unwrap();
        store.add_favourite(fan.id, recipe.id).unwrap();
        store.upsert_rating(fan.id, recipe.id, 4).unwrap();

        store.delete_recipe(chef.id, recipe.id).unwrap();

        assert_eq!(store.favourite_count(fan.id, recipe.id), 0);
        assert!(store.ratings_for(fan.id, recipe.id).is_empty());
    }

    #[test]
    fn test_rating_upsert_keeps_one_row_with_latest_score() {
        let store = MemoryStore::new();
        let chef = seed_user(&store, "chef@example.com", UserType::Creator);
        let fan = seed_user(&store, "fan@example.com", UserType::Viewer);
        let catalog = seed_catalog(&store);
        let recipe = store.create_recipe(chef.id, &draft(&catalog, &[])).unwrap();

        let first = store.upsert_rating(fan.id, recipe.id, 2).unwrap();
        let second = store.upsert_rating(fan.id, recipe.id, 5).unwrap();

        assert_eq!(first.id, second.id);
        let ratings = store.ratings_for(fan.id, recipe.id);
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].score, 5);
    }

    #[test]
    fn test_list_is_newest_first() {
        let store = MemoryStore::new();
        let chef = seed_user(&store, "chef@example.com", UserType::Creator);
        let catalog = seed_catalog(&store);
        let older = store.create_recipe(chef.id, &draft(&catalog, &[])).unwrap();
        let newer = store.create_recipe(chef.id, &draft(&catalog, &[])).unwrap();

        let page = store.list_recipes(0, 10).unwrap();

        assert_eq!(page.total, 2);
        let ids: Vec<_> = page.items.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
        assert!(store.list_recipes(2, 10).unwrap().items.is_empty());
    }

    #[test]
    fn test_cuisine_stats_average_across_recipes() {
        let store = MemoryStore::new();
        let chef = seed_user(&store, "chef@example.com", UserType::Creator);
        let fan = seed_user(&store, "fan@example.com", UserType::Viewer);
        let catalog = seed_catalog(&store);
        let empty = store.create_cuisine("Aaa empty").unwrap();
        let a = store.create_recipe(chef.id, &draft(&catalog, &[])).unwrap();
        let b = store.create_recipe(chef.id, &draft(&catalog, &[])).unwrap();
        store.upsert_rating(fan.id, a.id, 5).unwrap();
        store.upsert_rating(chef.id, a.id, 4).unwrap();
        store.upsert_rating(fan.id, b.id, 2).unwrap();

        let page = store.cuisine_stats(0, 10).unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].cuisine_id, empty.id);
        assert_eq!(page.items[0].recipe_count, 0);
        assert_eq!(page.items[0].average_rating, None);
        assert_eq!(page.items[1].recipe_count, 2);
        assert_eq!(page.items[1].average_rating, Some(11.0 / 3.0));
    }

    #[test]
    fn test_blacklist_is_idempotent() {
        let store = MemoryStore::new();
        let jti = Uuid::new_v4();
        store.blacklist_token(jti, Uuid::new_v4(), Utc::now()).unwrap();
        store.blacklist_token(jti, Uuid::new_v4(), Utc::now()).unwrap();
        assert!(store.is_token_blacklisted(jti).unwrap());
        assert!(!store.is_token_blacklisted(Uuid::new_v4()).unwrap());
    }
}
