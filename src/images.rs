//! Image reference resolution.
//!
//! Image problems are never fatal to a row: whatever happens, the URL from the
//! feed (or nothing, when the feed has none) is what gets stored.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Url};

/// Turns the image URL from a feed row into the reference stored on the recipe
#[async_trait]
pub trait ImageResolver: Send + Sync {
    /// Get the resolver name (e.g., "probe", "passthrough")
    fn resolver_name(&self) -> &str;

    async fn resolve(&self, url: Option<&str>) -> Option<String>;
}

/// Public base URL of an S3-style bucket
pub fn bucket_public_url(bucket: &str, region: &str) -> String {
    format!("https://{}.s3.{}.amazonaws.com/", bucket, region)
}

fn present(url: Option<&str>) -> Option<&str> {
    url.map(str::trim).filter(|u| !u.is_empty())
}

/// Stores URLs without touching the network
pub struct PassthroughImageResolver;

#[async_trait]
impl ImageResolver for PassthroughImageResolver {
    fn resolver_name(&self) -> &str {
        "passthrough"
    }

    async fn resolve(&self, url: Option<&str>) -> Option<String> {
        present(url).map(str::to_string)
    }
}

/// Checks that external images exist with a `HEAD` request
///
/// URLs already inside the platform's own object storage are trusted as-is.
/// A failed check is logged and the URL is kept anyway.
pub struct ProbeImageResolver {
    client: Client,
    own_storage: Option<Url>,
}

/// Parse the storage base URL, making its path end in `/` so that a prefix
/// match cannot run into a neighbouring path segment
fn storage_base(base: &str) -> Option<Url> {
    match Url::parse(base.trim()) {
        Ok(mut url) => {
            if !url.path().ends_with('/') {
                let path = format!("{}/", url.path());
                url.set_path(&path);
            }
            Some(url)
        }
        Err(e) => {
            warn!("Ignoring image storage base {:?}: {}", base, e);
            None
        }
    }
}

impl ProbeImageResolver {
    pub fn new(
        timeout: Option<Duration>,
        own_storage: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        let timeout = timeout.unwrap_or(Duration::from_secs(10));
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (compatible; RecipeImportBot/1.0)")
            .build()?;

        Ok(Self {
            client,
            own_storage: own_storage.as_deref().and_then(storage_base),
        })
    }

    fn is_own_storage(&self, url: &str) -> bool {
        let (Some(base), Ok(url)) = (&self.own_storage, Url::parse(url)) else {
            return false;
        };
        url.scheme() == base.scheme()
            && url.host_str() == base.host_str()
            && url.port_or_known_default() == base.port_or_known_default()
            && url.path().starts_with(base.path())
    }

    async fn probe(&self, url: &str) -> Result<(), String> {
        let parsed = Url::parse(url).map_err(|e| format!("invalid URL: {}", e))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(format!("unsupported scheme {:?}", parsed.scheme()));
        }

        let response = self
            .client
            .head(parsed)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(format!("server answered {}", status))
        }
    }
}

#[async_trait]
impl ImageResolver for ProbeImageResolver {
    fn resolver_name(&self) -> &str {
        "probe"
    }

    async fn resolve(&self, url: Option<&str>) -> Option<String> {
        let url = present(url)?;

        if self.is_own_storage(url) {
            debug!("Image {} is already in object storage", url);
        } else if let Err(reason) = self.probe(url).await {
            warn!("Image {} could not be verified ({}); keeping it", url, reason);
        } else {
            debug!("Image {} is reachable", url);
        }

        Some(url.to_string())
    }
}
