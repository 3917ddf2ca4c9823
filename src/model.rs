use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type CuisineId = i64;
pub type RecipeId = i64;
pub type UserId = i64;

/// Canonical cuisine category shared by every recipe on the platform
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cuisine {
    pub id: CuisineId,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Recipe fields as handed to the store; the store assigns id and timestamp
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRecipe {
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub helpful_notes: Option<String>,
    pub cuisine_id: CuisineId,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub author_id: UserId,
    pub is_approved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub title: String,
    pub description: Option<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub helpful_notes: Option<String>,
    pub cuisine_id: CuisineId,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub author_id: UserId,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

impl Recipe {
    pub fn from_new(id: RecipeId, new: NewRecipe, created_at: DateTime<Utc>) -> Self {
        Recipe {
            id,
            title: new.title,
            description: new.description,
            ingredients: new.ingredients,
            instructions: new.instructions,
            helpful_notes: new.helpful_notes,
            cuisine_id: new.cuisine_id,
            tags: new.tags,
            featured_image: new.featured_image,
            author_id: new.author_id,
            is_approved: new.is_approved,
            created_at,
        }
    }
}

/// Outcome of one import job
///
/// Every row that reaches a terminal state is counted exactly once, either in
/// `success_count` or as one entry of `errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    success_count: usize,
    errors: Vec<String>,
}

impl JobResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> usize {
        self.success_count
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Number of rows that reached a terminal state
    pub fn processed(&self) -> usize {
        self.success_count + self.errors.len()
    }

    pub(crate) fn record_success(&mut self) {
        self.success_count += 1;
    }

    pub(crate) fn record_failure(&mut self, message: String) {
        self.errors.push(message);
    }
}
