use log::debug;

use crate::model::{CuisineId, NewRecipe, Recipe, UserId};
use crate::store::{RecipeStore, StoreError};
use crate::validate::ValidatedRow;

/// Build the moderation-pending recipe for an imported row
pub fn build_recipe(
    row: ValidatedRow,
    cuisine_id: CuisineId,
    featured_image: Option<String>,
    author_id: UserId,
) -> NewRecipe {
    NewRecipe {
        title: row.title,
        description: row.description,
        ingredients: row.ingredients,
        instructions: row.instructions,
        helpful_notes: row.helpful_notes,
        cuisine_id,
        tags: row.tags,
        featured_image,
        author_id,
        is_approved: false,
    }
}

/// Store a recipe for an imported row. Imported recipes always start unapproved.
pub async fn persist_recipe(
    store: &dyn RecipeStore,
    row: ValidatedRow,
    cuisine_id: CuisineId,
    featured_image: Option<String>,
    author_id: UserId,
) -> Result<Recipe, StoreError> {
    let recipe = build_recipe(row, cuisine_id, featured_image, author_id);
    let created = store.create_recipe(recipe).await?;
    debug!(
        "Stored recipe {:?} (id {}) in {}",
        created.title,
        created.id,
        store.store_name()
    );
    Ok(created)
}
