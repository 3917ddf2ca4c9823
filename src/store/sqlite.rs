use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};

use crate::model::{Cuisine, NewRecipe, Recipe};
use crate::store::{name_key, RecipeStore, StoreError};

/// Recipe lists are stored as JSON arrays in TEXT columns.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS cuisines (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        name_key TEXT NOT NULL,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS cuisines_active_name
        ON cuisines (name_key) WHERE is_active = 1
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS recipes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT,
        ingredients TEXT NOT NULL,
        instructions TEXT NOT NULL,
        helpful_notes TEXT,
        cuisine_id INTEGER NOT NULL REFERENCES cuisines (id),
        tags TEXT NOT NULL,
        featured_image TEXT,
        author_id INTEGER NOT NULL,
        is_approved INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    "#,
];

/// SQLite-backed store
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `url` and prepare the schema
    ///
    /// `sqlite::memory:` URLs get a single long-lived connection, since every
    /// connection to an in-memory database sees its own empty database.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let in_memory = url.contains(":memory:");
        let mut pool_options =
            SqlitePoolOptions::new().max_connections(if in_memory { 1 } else { 5 });
        if in_memory {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;

        let store = SqliteStore { pool };
        store.init_schema().await?;
        info!("Opened recipe database at {}", url);
        Ok(store)
    }

    pub async fn init_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("Recipe schema ready");
        Ok(())
    }

    async fn get_recipe(&self, id: i64) -> Result<Recipe, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, title, description, ingredients, instructions, helpful_notes,
                   cuisine_id, tags, featured_image, author_id, is_approved, created_at
            FROM recipes
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        recipe_from_row(&row)
    }
}

fn cuisine_from_row(row: &SqliteRow) -> Cuisine {
    Cuisine {
        id: row.get("id"),
        name: row.get("name"),
        is_active: row.get("is_active"),
        created_at: row.get("created_at"),
    }
}

fn recipe_from_row(row: &SqliteRow) -> Result<Recipe, StoreError> {
    let list = |column: &str| -> Result<Vec<String>, StoreError> {
        Ok(serde_json::from_str(&row.get::<String, _>(column))?)
    };

    Ok(Recipe {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        ingredients: list("ingredients")?,
        instructions: list("instructions")?,
        helpful_notes: row.get("helpful_notes"),
        cuisine_id: row.get("cuisine_id"),
        tags: list("tags")?,
        featured_image: row.get("featured_image"),
        author_id: row.get("author_id"),
        is_approved: row.get("is_approved"),
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl RecipeStore for SqliteStore {
    fn store_name(&self) -> &str {
        "sqlite"
    }

    async fn find_active_cuisine(&self, name: &str) -> Result<Option<Cuisine>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, is_active, created_at
            FROM cuisines
            WHERE name_key = ? AND is_active = 1
            "#,
        )
        .bind(name_key(name))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(cuisine_from_row))
    }

    async fn create_cuisine(&self, name: &str) -> Result<Cuisine, StoreError> {
        let name = name.trim();
        let created_at: DateTime<Utc> = Utc::now();

        let result = sqlx::query(
            "INSERT INTO cuisines (name, name_key, is_active, created_at) VALUES (?, ?, 1, ?)",
        )
        .bind(name)
        .bind(name_key(name))
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::DuplicateCuisine(name.to_string())
            }
            other => StoreError::Database(other),
        })?;

        Ok(Cuisine {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            is_active: true,
            created_at,
        })
    }

    async fn create_recipe(&self, recipe: NewRecipe) -> Result<Recipe, StoreError> {
        let ingredients = serde_json::to_string(&recipe.ingredients)?;
        let instructions = serde_json::to_string(&recipe.instructions)?;
        let tags = serde_json::to_string(&recipe.tags)?;

        let result = sqlx::query(
            r#"
            INSERT INTO recipes (
                title, description, ingredients, instructions, helpful_notes,
                cuisine_id, tags, featured_image, author_id, is_approved, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&recipe.title)
        .bind(&recipe.description)
        .bind(ingredients)
        .bind(instructions)
        .bind(&recipe.helpful_notes)
        .bind(recipe.cuisine_id)
        .bind(tags)
        .bind(&recipe.featured_image)
        .bind(recipe.author_id)
        .bind(recipe.is_approved)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                StoreError::UnknownCuisine(recipe.cuisine_id)
            }
            other => StoreError::Database(other),
        })?;

        self.get_recipe(result.last_insert_rowid()).await
    }

    async fn list_cuisines(&self) -> Result<Vec<Cuisine>, StoreError> {
        let rows = sqlx::query("SELECT id, name, is_active, created_at FROM cuisines ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(cuisine_from_row).collect())
    }

    async fn list_recipes(&self) -> Result<Vec<Recipe>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description, ingredients, instructions, helpful_notes,
                   cuisine_id, tags, featured_image, author_id, is_approved, created_at
            FROM recipes
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(recipe_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database")
    }

    fn new_recipe(cuisine_id: i64) -> NewRecipe {
        NewRecipe {
            title: "Tacos".to_string(),
            description: Some("Street food".to_string()),
            ingredients: vec!["tortillas".to_string(), "salt".to_string()],
            instructions: vec!["cook".to_string()],
            helpful_notes: None,
            cuisine_id,
            tags: vec!["quick".to_string()],
            featured_image: Some("https://example.com/tacos.jpg".to_string()),
            author_id: 3,
            is_approved: false,
        }
    }

    #[tokio::test]
    async fn test_cuisine_lookup_is_case_insensitive() {
        let store = memory_store().await;
        let created = store.create_cuisine("Italian").await.unwrap();

        let found = store.find_active_cuisine("iTaLiAn").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.name, "Italian");
        assert!(found.is_active);
    }

    #[tokio::test]
    async fn test_unique_index_rejects_duplicate() {
        let store = memory_store().await;
        store.create_cuisine("Italian").await.unwrap();

        let err = store.create_cuisine("ITALIAN").await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateCuisine(_)));
        assert_eq!(store.list_cuisines().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_inactive_cuisine_does_not_block_new_one() {
        let store = memory_store().await;
        let old = store.create_cuisine("Greek").await.unwrap();
        sqlx::query("UPDATE cuisines SET is_active = 0 WHERE id = ?")
            .bind(old.id)
            .execute(&store.pool)
            .await
            .unwrap();

        assert!(store.find_active_cuisine("greek").await.unwrap().is_none());
        let fresh = store.create_cuisine("Greek").await.unwrap();
        assert_ne!(fresh.id, old.id);
    }

    #[tokio::test]
    async fn test_recipe_round_trips_lists() {
        let store = memory_store().await;
        let cuisine = store.create_cuisine("Mexican").await.unwrap();

        let created = store.create_recipe(new_recipe(cuisine.id)).await.unwrap();
        assert_eq!(created.ingredients, vec!["tortillas", "salt"]);
        assert_eq!(created.tags, vec!["quick"]);
        assert!(!created.is_approved);
        assert_eq!(created.author_id, 3);

        let all = store.list_recipes().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, created.id);
    }

    #[tokio::test]
    async fn test_recipe_with_unknown_cuisine_fails() {
        let store = memory_store().await;
        let err = store.create_recipe(new_recipe(99)).await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownCuisine(99)));
        assert!(store.list_recipes().await.unwrap().is_empty());
    }
}
