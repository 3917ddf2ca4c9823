mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Cuisine, CuisineId, NewRecipe, Recipe};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("An active cuisine named \"{0}\" already exists")]
    DuplicateCuisine(String),

    #[error("Cuisine {0} does not exist")]
    UnknownCuisine(CuisineId),

    #[error("Failed to encode recipe field: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Storage operations the import pipeline needs from the platform's data store
///
/// Cuisine names are compared case-insensitively. At most one active cuisine
/// may exist per name; a second `create_cuisine` for the same name fails with
/// [`StoreError::DuplicateCuisine`].
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Get the store name (e.g., "memory", "sqlite")
    fn store_name(&self) -> &str;

    async fn find_active_cuisine(&self, name: &str) -> Result<Option<Cuisine>, StoreError>;

    /// Create an active cuisine and return it with its new id
    async fn create_cuisine(&self, name: &str) -> Result<Cuisine, StoreError>;

    async fn create_recipe(&self, recipe: NewRecipe) -> Result<Recipe, StoreError>;

    /// All cuisines, in creation order
    async fn list_cuisines(&self) -> Result<Vec<Cuisine>, StoreError>;

    /// All recipes, in creation order
    async fn list_recipes(&self) -> Result<Vec<Recipe>, StoreError>;
}

/// Key used for case-insensitive cuisine name comparison
pub(crate) fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
