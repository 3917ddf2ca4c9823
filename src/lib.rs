//! Bulk recipe import from a CSV content feed.
//!
//! A job reads the whole feed, then takes each row through validation,
//! cuisine resolution, image resolution and persistence in file order. Rows
//! that fail are reported in the [`JobResult`] and never stop the job.
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use recipe_import::{Importer, PassthroughImageResolver, store::MemoryStore};
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let importer = Importer::new(store, Box::new(PassthroughImageResolver));
//! let result = importer
//!     .run("Country,Recipe Title,Ingredients,Method\nMexico,Tacos,salt,cook\n", 1)
//!     .await?;
//! assert_eq!(result.success_count(), 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod cuisine;
pub mod error;
pub mod images;
pub mod importer;
pub mod model;
pub mod persist;
pub mod source;
pub mod store;
pub mod validate;

pub use config::ImportConfig;
pub use error::ImportError;
pub use images::{ImageResolver, PassthroughImageResolver, ProbeImageResolver};
pub use importer::{Importer, RowError, RowFailure, RowStage};
pub use model::{Cuisine, JobResult, NewRecipe, Recipe};
pub use store::{MemoryStore, RecipeStore, SqliteStore, StoreError};

use std::sync::Arc;

/// Import a CSV feed into `store` using default settings (image checks on)
pub async fn import_csv(
    store: Arc<dyn RecipeStore>,
    feed: impl AsRef<[u8]>,
    author_id: model::UserId,
) -> Result<JobResult, ImportError> {
    let importer = Importer::from_config(store, &ImportConfig::default())?;
    importer.run(feed, author_id).await
}
