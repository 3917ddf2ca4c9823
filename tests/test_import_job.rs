use std::sync::Arc;

use async_trait::async_trait;
use recipe_import::model::{Cuisine, NewRecipe, Recipe};
use recipe_import::{
    ImportError, Importer, MemoryStore, PassthroughImageResolver, RecipeStore, StoreError,
};

const HEADER: &str =
    "Country,Recipe Title,Intro,Ingredients,Method,Helpful Notes,Image url,Keywords\n";

fn feed(rows: &[&str]) -> String {
    let mut csv = HEADER.to_string();
    for row in rows {
        csv.push_str(row);
        csv.push('\n');
    }
    csv
}

fn importer(store: &Arc<MemoryStore>) -> Importer {
    Importer::new(store.clone(), Box::new(PassthroughImageResolver))
}

#[tokio::test]
async fn test_tacos_scenario() {
    let store = Arc::new(MemoryStore::new());
    let csv = feed(&[
        "Mexico,Tacos,,salt,cook,,,",
        "Mexico,Burrito,,beans,,,,",
    ]);

    let result = importer(&store).run(&csv, 42).await.unwrap();

    assert_eq!(result.success_count(), 1);
    assert_eq!(
        result.errors(),
        &["Skipping recipe \"Burrito\": Missing required fields"]
    );

    let cuisines = store.list_cuisines().await.unwrap();
    assert_eq!(cuisines.len(), 1);
    assert_eq!(cuisines[0].name, "Mexican");

    let recipes = store.list_recipes().await.unwrap();
    assert_eq!(recipes.len(), 1);
    assert_eq!(recipes[0].title, "Tacos");
    assert_eq!(recipes[0].ingredients, vec!["salt"]);
    assert_eq!(recipes[0].instructions, vec!["cook"]);
    assert_eq!(recipes[0].cuisine_id, cuisines[0].id);
    assert_eq!(recipes[0].author_id, 42);
    assert!(!recipes[0].is_approved);
}

#[tokio::test]
async fn test_untitled_row_reported_as_unknown() {
    let store = Arc::new(MemoryStore::new());
    let csv = feed(&["Mexico,,,salt,,,,"]);

    let result = importer(&store).run(&csv, 1).await.unwrap();

    assert_eq!(result.success_count(), 0);
    assert_eq!(
        result.errors(),
        &["Skipping recipe \"Unknown\": Missing required fields"]
    );
    assert!(store.list_cuisines().await.unwrap().is_empty());
    assert!(store.list_recipes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_italy_variants_share_one_cuisine() {
    let store = Arc::new(MemoryStore::new());
    let csv = feed(&[
        "Italy,Carbonara,,spaghetti,boil,,,",
        "italy,Tiramisu,,mascarpone,layer,,,",
    ]);

    let result = importer(&store).run(&csv, 1).await.unwrap();
    assert_eq!(result.success_count(), 2);
    assert!(result.errors().is_empty());

    let cuisines = store.list_cuisines().await.unwrap();
    assert_eq!(cuisines.len(), 1);
    assert_eq!(cuisines[0].name, "Italian");

    let recipes = store.list_recipes().await.unwrap();
    assert!(recipes.iter().all(|r| r.cuisine_id == cuisines[0].id));
}

#[tokio::test]
async fn test_unmapped_country_creates_one_cuisine() {
    let store = Arc::new(MemoryStore::new());
    let csv = feed(&[
        "Wakanda,Vibranium Stew,,herbs,simmer,,,",
        "WAKANDA,Heart-Shaped Herb Tea,,herb,steep,,,",
    ]);

    let result = importer(&store).run(&csv, 1).await.unwrap();
    assert_eq!(result.success_count(), 2);

    let cuisines = store.list_cuisines().await.unwrap();
    assert_eq!(cuisines.len(), 1);
    assert_eq!(cuisines[0].name, "Wakanda");
}

#[tokio::test]
async fn test_accounting_covers_every_row() {
    let store = Arc::new(MemoryStore::new());
    let csv = feed(&[
        "France,Crepes,,flour,whisk,,,",
        ",No Country,,rice,steam,,,",
        "Japan,,,noodles,boil,,,",
        "Japan,Ramen,,noodles,boil,,,\"ramen, soup\"",
        "Peru,Ceviche,,fish,",
        "Greece,Moussaka,Baked,\"aubergine\nlamb\",\"layer\nbake\",Rest before cutting,,",
    ]);

    let result = importer(&store).run(&csv, 1).await.unwrap();

    assert_eq!(result.processed(), 6);
    assert_eq!(result.success_count(), 3);
    assert_eq!(result.errors().len(), 3);
    assert_eq!(store.list_recipes().await.unwrap().len(), 3);
    assert!(result.errors()[0].contains("\"No Country\""));
    assert!(result.errors()[1].contains("\"Unknown\""));
    assert!(result.errors()[2].contains("\"Ceviche\""));
}

#[tokio::test]
async fn test_tags_and_optional_fields_are_stored() {
    let store = Arc::new(MemoryStore::new());
    let csv = feed(&[
        "Greece,Moussaka,Baked layers,\"aubergine\nlamb\",\"layer\nbake\",Rest before cutting,,\"baked, comfort\"",
    ]);

    importer(&store).run(&csv, 9).await.unwrap();

    let recipe = &store.list_recipes().await.unwrap()[0];
    assert_eq!(recipe.description.as_deref(), Some("Baked layers"));
    assert_eq!(recipe.ingredients, vec!["aubergine", "lamb"]);
    assert_eq!(recipe.instructions, vec!["layer", "bake"]);
    assert_eq!(recipe.helpful_notes.as_deref(), Some("Rest before cutting"));
    assert_eq!(recipe.tags, vec!["baked", "comfort"]);
    assert_eq!(recipe.featured_image, None);
}

#[tokio::test]
async fn test_cuisine_from_earlier_job_is_reused() {
    let store = Arc::new(MemoryStore::new());

    importer(&store)
        .run(feed(&["USA,Pancakes,,flour,fry,,,"]), 1)
        .await
        .unwrap();
    importer(&store)
        .run(feed(&["United States,Cornbread,,cornmeal,bake,,,"]), 2)
        .await
        .unwrap();

    let cuisines = store.list_cuisines().await.unwrap();
    assert_eq!(cuisines.len(), 1);
    assert_eq!(cuisines[0].name, "American");
    assert_eq!(store.list_recipes().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_structural_failure_aborts_before_any_write() {
    let store = Arc::new(MemoryStore::new());
    let mut csv = feed(&["Mexico,Tacos,,salt,cook,,,"]).into_bytes();
    csv.extend_from_slice(b"Mexico,");
    csv.extend_from_slice(&[0xc3, 0x28]);
    csv.extend_from_slice(b",,salt,cook,,,\n");

    let err = importer(&store).run(&csv, 1).await.unwrap_err();

    assert!(matches!(err, ImportError::CsvError(_)));
    assert!(store.list_cuisines().await.unwrap().is_empty());
    assert!(store.list_recipes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_blank_lines_are_not_counted() {
    let store = Arc::new(MemoryStore::new());
    let csv = feed(&["Mexico,Tacos,,salt,cook,,,", "   ", "Italy,Pasta,,flour,boil,,,"]);

    let result = importer(&store).run(&csv, 1).await.unwrap();

    assert_eq!(result.success_count(), 2);
    assert!(result.errors().is_empty());
    assert_eq!(result.processed(), 2);
}

#[tokio::test]
async fn test_empty_feed() {
    let store = Arc::new(MemoryStore::new());

    let result = importer(&store).run(HEADER, 1).await.unwrap();
    assert_eq!(result.success_count(), 0);
    assert!(result.errors().is_empty());
}

/// Store that refuses to save recipes with a given title
struct RejectingStore {
    inner: MemoryStore,
    rejected_title: &'static str,
}

#[async_trait]
impl RecipeStore for RejectingStore {
    fn store_name(&self) -> &str {
        "rejecting"
    }

    async fn find_active_cuisine(&self, name: &str) -> Result<Option<Cuisine>, StoreError> {
        self.inner.find_active_cuisine(name).await
    }

    async fn create_cuisine(&self, name: &str) -> Result<Cuisine, StoreError> {
        self.inner.create_cuisine(name).await
    }

    async fn create_recipe(&self, recipe: NewRecipe) -> Result<Recipe, StoreError> {
        if recipe.title == self.rejected_title {
            return Err(StoreError::UnknownCuisine(recipe.cuisine_id));
        }
        self.inner.create_recipe(recipe).await
    }

    async fn list_cuisines(&self) -> Result<Vec<Cuisine>, StoreError> {
        self.inner.list_cuisines().await
    }

    async fn list_recipes(&self) -> Result<Vec<Recipe>, StoreError> {
        self.inner.list_recipes().await
    }
}

#[tokio::test]
async fn test_persistence_failure_is_isolated() {
    let store = Arc::new(RejectingStore {
        inner: MemoryStore::new(),
        rejected_title: "Paella",
    });
    let importer = Importer::new(store.clone(), Box::new(PassthroughImageResolver));
    let csv = feed(&[
        "Spain,Gazpacho,,tomato,blend,,,",
        "Spain,Paella,,rice,simmer,,,",
        "Spain,Churros,,dough,fry,,,",
    ]);

    let result = importer.run(&csv, 1).await.unwrap();

    assert_eq!(result.success_count(), 2);
    assert_eq!(result.errors().len(), 1);
    assert!(result.errors()[0].starts_with("Failed to import recipe \"Paella\":"));

    // The cuisine created for the failed row's neighbours is kept
    let cuisines = store.list_cuisines().await.unwrap();
    assert_eq!(cuisines.len(), 1);
    assert_eq!(cuisines[0].name, "Spanish");
    let titles: Vec<String> = store
        .list_recipes()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.title)
        .collect();
    assert_eq!(titles, vec!["Gazpacho", "Churros"]);
}

/// Store that loses the race to create one cuisine: the lookup misses and
/// the insert collides with a cuisine created elsewhere
struct RacingStore {
    inner: MemoryStore,
    contested: &'static str,
}

#[async_trait]
impl RecipeStore for RacingStore {
    fn store_name(&self) -> &str {
        "racing"
    }

    async fn find_active_cuisine(&self, name: &str) -> Result<Option<Cuisine>, StoreError> {
        if name == self.contested {
            return Ok(None);
        }
        self.inner.find_active_cuisine(name).await
    }

    async fn create_cuisine(&self, name: &str) -> Result<Cuisine, StoreError> {
        if name == self.contested {
            return Err(StoreError::DuplicateCuisine(name.to_string()));
        }
        self.inner.create_cuisine(name).await
    }

    async fn create_recipe(&self, recipe: NewRecipe) -> Result<Recipe, StoreError> {
        self.inner.create_recipe(recipe).await
    }

    async fn list_cuisines(&self) -> Result<Vec<Cuisine>, StoreError> {
        self.inner.list_cuisines().await
    }

    async fn list_recipes(&self) -> Result<Vec<Recipe>, StoreError> {
        self.inner.list_recipes().await
    }
}

#[tokio::test]
async fn test_cuisine_failure_is_isolated() {
    let store = Arc::new(RacingStore {
        inner: MemoryStore::new(),
        contested: "Thai",
    });
    let importer = Importer::new(store.clone(), Box::new(PassthroughImageResolver));
    let csv = feed(&[
        "Vietnam,Pho,,noodles,simmer,,,",
        "Thailand,Pad Thai,,noodles,fry,,,",
        "Vietnam,Banh Mi,,baguette,fill,,,",
    ]);

    let result = importer.run(&csv, 1).await.unwrap();

    assert_eq!(result.processed(), 3);
    assert_eq!(result.success_count(), 2);
    assert_eq!(
        result.errors(),
        &["Failed to import recipe \"Pad Thai\": Cannot resolve cuisine \"Thai\": \
           An active cuisine named \"Thai\" already exists"]
    );

    let cuisines = store.list_cuisines().await.unwrap();
    assert_eq!(cuisines.len(), 1);
    assert_eq!(cuisines[0].name, "Vietnamese");
    let titles: Vec<String> = store
        .list_recipes()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.title)
        .collect();
    assert_eq!(titles, vec!["Pho", "Banh Mi"]);
}

#[tokio::test]
async fn test_import_csv_with_defaults() {
    let store = Arc::new(MemoryStore::new());
    let csv = feed(&["Ethiopia,Injera,,teff,ferment,,,", "Ethiopia,Doro Wat,,,,,,"]);

    let result = recipe_import::import_csv(store.clone(), csv, 3).await.unwrap();

    assert_eq!(result.success_count(), 1);
    assert_eq!(result.errors().len(), 1);
    assert_eq!(store.list_cuisines().await.unwrap()[0].name, "Ethiopian");
}
