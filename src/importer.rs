//! Job coordinator: drives every row of a feed through validation, cuisine
//! resolution, image resolution and persistence, one row at a time.

use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};
use thiserror::Error;

use crate::config::ImportConfig;
use crate::cuisine::{resolve_cuisine, CuisineError};
use crate::error::ImportError;
use crate::images::{
    bucket_public_url, ImageResolver, PassthroughImageResolver, ProbeImageResolver,
};
use crate::model::{JobResult, Recipe, UserId};
use crate::persist::persist_recipe;
use crate::source::{RawRow, RowSource};
use crate::store::{RecipeStore, StoreError};
use crate::validate::{validate_row, ValidationError};

/// Progress of a single row through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStage {
    Pending,
    Validated,
    CuisineResolved,
    ImageResolved,
    Persisted,
}

/// Why a row was not imported
#[derive(Error, Debug)]
pub enum RowError {
    #[error(transparent)]
    MissingFields(#[from] ValidationError),

    #[error(transparent)]
    Cuisine(#[from] CuisineError),

    #[error(transparent)]
    Persist(#[from] StoreError),
}

/// A row that ended in the failed state
#[derive(Debug)]
pub struct RowFailure {
    pub title: String,
    /// Last stage the row completed before failing
    pub reached: RowStage,
    pub error: RowError,
}

impl fmt::Display for RowFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            RowError::MissingFields(e) => write!(f, "Skipping recipe \"{}\": {}", self.title, e),
            other => write!(f, "Failed to import recipe \"{}\": {}", self.title, other),
        }
    }
}

impl std::error::Error for RowFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Runs import jobs against a store
pub struct Importer {
    store: Arc<dyn RecipeStore>,
    images: Box<dyn ImageResolver>,
}

impl Importer {
    pub fn new(store: Arc<dyn RecipeStore>, images: Box<dyn ImageResolver>) -> Self {
        Importer { store, images }
    }

    /// Create an importer whose image handling follows the configuration
    pub fn from_config(
        store: Arc<dyn RecipeStore>,
        config: &ImportConfig,
    ) -> Result<Self, ImportError> {
        let images: Box<dyn ImageResolver> = if config.images.check {
            let own_storage = config.images.public_base_url.clone().or_else(|| {
                config
                    .storage
                    .bucket
                    .as_deref()
                    .map(|bucket| bucket_public_url(bucket, &config.storage.region))
            });
            Box::new(ProbeImageResolver::new(
                Some(config.images.timeout_duration()),
                own_storage,
            )?)
        } else {
            Box::new(PassthroughImageResolver)
        };

        info!(
            "Importer using {} store and {} image resolver",
            store.store_name(),
            images.resolver_name()
        );
        Ok(Importer::new(store, images))
    }

    pub fn store(&self) -> &Arc<dyn RecipeStore> {
        &self.store
    }

    /// Import every row of a CSV feed as a recipe owned by `author_id`
    ///
    /// Only a feed that cannot be decoded at all fails the job; in that case
    /// nothing has been written. Otherwise each row is counted either as a
    /// success or as one message in the result's errors, and rows already
    /// imported stay imported whatever happens to later rows.
    pub async fn run(
        &self,
        feed: impl AsRef<[u8]>,
        author_id: UserId,
    ) -> Result<JobResult, ImportError> {
        let source = RowSource::parse(feed)?;
        info!("Importing {} rows for user {}", source.len(), author_id);

        let mut result = JobResult::new();
        for row in source {
            match self.process_row(&row, author_id).await {
                Ok(recipe) => {
                    info!(
                        "Row {}: imported {:?} as recipe {}",
                        row.number(),
                        recipe.title,
                        recipe.id
                    );
                    result.record_success();
                }
                Err(failure) => {
                    warn!(
                        "Row {} (line {}) failed after {:?}: {}",
                        row.number(),
                        row.line(),
                        failure.reached,
                        failure
                    );
                    result.record_failure(failure.to_string());
                }
            }
        }

        info!(
            "Import finished: {} imported, {} failed",
            result.success_count(),
            result.errors().len()
        );
        Ok(result)
    }

    async fn process_row(&self, row: &RawRow, author_id: UserId) -> Result<Recipe, RowFailure> {
        let validated = validate_row(row).map_err(|e| RowFailure {
            title: e.title.clone(),
            reached: RowStage::Pending,
            error: e.into(),
        })?;
        let title = validated.title.clone();
        let fail = |reached: RowStage, error: RowError| RowFailure {
            title: title.clone(),
            reached,
            error,
        };
        debug!("Row {} {:?}: {:?}", row.number(), RowStage::Validated, title);

        let cuisine_id = resolve_cuisine(self.store.as_ref(), &validated.country)
            .await
            .map_err(|e| fail(RowStage::Validated, e.into()))?;
        debug!(
            "Row {} {:?}: cuisine {}",
            row.number(),
            RowStage::CuisineResolved,
            cuisine_id
        );

        let image = self.images.resolve(validated.image_url.as_deref()).await;
        debug!("Row {} {:?}: {:?}", row.number(), RowStage::ImageResolved, image);

        let recipe = persist_recipe(self.store.as_ref(), validated, cuisine_id, image, author_id)
            .await
            .map_err(|e| fail(RowStage::ImageResolved, e.into()))?;
        debug!("Row {} {:?}", row.number(), RowStage::Persisted);

        Ok(recipe)
    }
}
