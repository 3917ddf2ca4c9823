use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use crate::model::{Cuisine, NewRecipe, Recipe};
use crate::store::{name_key, RecipeStore, StoreError};

/// In-process store, used for dry runs and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    cuisines: Vec<Cuisine>,
    recipes: Vec<Recipe>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with existing cuisines, e.g. a deactivated one
    pub fn with_cuisines(cuisines: Vec<Cuisine>) -> Self {
        MemoryStore {
            tables: Mutex::new(Tables {
                cuisines,
                recipes: Vec::new(),
            }),
        }
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    fn store_name(&self) -> &str {
        "memory"
    }

    async fn find_active_cuisine(&self, name: &str) -> Result<Option<Cuisine>, StoreError> {
        let key = name_key(name);
        Ok(self
            .tables()
            .cuisines
            .iter()
            .find(|c| c.is_active && name_key(&c.name) == key)
            .cloned())
    }

    async fn create_cuisine(&self, name: &str) -> Result<Cuisine, StoreError> {
        let mut tables = self.tables();
        let key = name_key(name);
        if tables
            .cuisines
            .iter()
            .any(|c| c.is_active && name_key(&c.name) == key)
        {
            return Err(StoreError::DuplicateCuisine(name.to_string()));
        }

        let cuisine = Cuisine {
            id: tables.cuisines.iter().map(|c| c.id).max().unwrap_or(0) + 1,
            name: name.trim().to_string(),
            is_active: true,
            created_at: Utc::now(),
        };
        tables.cuisines.push(cuisine.clone());
        Ok(cuisine)
    }

    async fn create_recipe(&self, recipe: NewRecipe) -> Result<Recipe, StoreError> {
        let mut tables = self.tables();
        if !tables.cuisines.iter().any(|c| c.id == recipe.cuisine_id) {
            return Err(StoreError::UnknownCuisine(recipe.cuisine_id));
        }

        let id = tables.recipes.len() as i64 + 1;
        let recipe = Recipe::from_new(id, recipe, Utc::now());
        tables.recipes.push(recipe.clone());
        Ok(recipe)
    }

    async fn list_cuisines(&self) -> Result<Vec<Cuisine>, StoreError> {
        Ok(self.tables().cuisines.clone())
    }

    async fn list_recipes(&self) -> Result<Vec<Recipe>, StoreError> {
        Ok(self.tables().recipes.clone())
    }
}
