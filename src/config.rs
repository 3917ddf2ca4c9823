use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Main import configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct ImportConfig {
    /// Database the recipes and cuisines are written to
    #[serde(default = "default_database_url")]
    pub database_url: String,
    /// Image reference handling
    #[serde(default)]
    pub images: ImagesConfig,
    /// Object storage the platform hosts its own images in
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Configuration for image reference checks
#[derive(Debug, Deserialize, Clone)]
pub struct ImagesConfig {
    /// Whether external image URLs are checked with a HEAD request
    #[serde(default = "default_check_images")]
    pub check: bool,
    /// Request timeout in seconds
    #[serde(default = "default_image_timeout")]
    pub timeout: u64,
    /// Public base URL of the platform's image storage; derived from the
    /// bucket and region when not set
    pub public_base_url: Option<String>,
}

/// Object storage location (S3-style bucket and region)
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub bucket: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            images: ImagesConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            check: default_check_images(),
            timeout: default_image_timeout(),
            public_base_url: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: None,
            region: default_region(),
        }
    }
}

impl ImagesConfig {
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

// Default value functions
fn default_database_url() -> String {
    "sqlite://recipes.db".to_string()
}

fn default_check_images() -> bool {
    true
}

fn default_image_timeout() -> u64 {
    10
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl ImportConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_IMPORT__ prefix
    /// 2. The file given as `path`, or recipe-import.toml in the current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_IMPORT__IMAGES__TIMEOUT
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        load_config(path)
    }

    /// Reject values that deserialize fine but cannot work
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.images.timeout == 0 {
            return Err(ConfigError::Message(
                "images.timeout must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load configuration from file and environment variables
///
/// An explicit `path` must exist; the default recipe-import.toml may be missing.
pub fn load_config(path: Option<&Path>) -> Result<ImportConfig, ConfigError> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name("recipe-import").required(false),
    };

    let settings = Config::builder()
        .add_source(file)
        // Use double underscore for nested: RECIPE_IMPORT__STORAGE__BUCKET
        .add_source(
            Environment::with_prefix("RECIPE_IMPORT")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: ImportConfig = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
