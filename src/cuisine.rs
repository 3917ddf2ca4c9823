//! Country label to canonical cuisine resolution.

use log::{debug, info};
use thiserror::Error;

use crate::model::CuisineId;
use crate::store::{RecipeStore, StoreError};

/// Country names (and common abbreviations) mapped to the cuisine they are
/// filed under. Keys are matched case-insensitively after trimming; labels
/// not listed here are used as the cuisine name verbatim.
pub const COUNTRY_CUISINES: &[(&str, &str)] = &[
    ("Italy", "Italian"),
    ("France", "French"),
    ("Spain", "Spanish"),
    ("Portugal", "Portuguese"),
    ("Greece", "Greek"),
    ("Germany", "German"),
    ("United Kingdom", "British"),
    ("UK", "British"),
    ("England", "British"),
    ("Ireland", "Irish"),
    ("United States", "American"),
    ("United States of America", "American"),
    ("USA", "American"),
    ("US", "American"),
    ("Mexico", "Mexican"),
    ("Brazil", "Brazilian"),
    ("Argentina", "Argentinian"),
    ("Peru", "Peruvian"),
    ("Jamaica", "Caribbean"),
    ("China", "Chinese"),
    ("Japan", "Japanese"),
    ("Korea", "Korean"),
    ("South Korea", "Korean"),
    ("Thailand", "Thai"),
    ("Vietnam", "Vietnamese"),
    ("India", "Indian"),
    ("Pakistan", "Pakistani"),
    ("Indonesia", "Indonesian"),
    ("Malaysia", "Malaysian"),
    ("Philippines", "Filipino"),
    ("Turkey", "Turkish"),
    ("Lebanon", "Lebanese"),
    ("Iran", "Persian"),
    ("Israel", "Israeli"),
    ("Morocco", "Moroccan"),
    ("Ethiopia", "Ethiopian"),
    ("Nigeria", "Nigerian"),
    ("South Africa", "South African"),
    ("Russia", "Russian"),
    ("Poland", "Polish"),
    ("Hungary", "Hungarian"),
    ("Sweden", "Swedish"),
    ("Australia", "Australian"),
];

#[derive(Error, Debug)]
pub enum CuisineError {
    #[error("Cannot resolve cuisine: no country given")]
    Empty,

    #[error("Cannot resolve cuisine \"{name}\": {source}")]
    Store {
        name: String,
        #[source]
        source: StoreError,
    },
}

/// Canonical cuisine name for a country label. Returns `None` for blank input.
pub fn canonical_cuisine_name(country: &str) -> Option<&str> {
    let country = country.trim();
    if country.is_empty() {
        return None;
    }

    let canonical = COUNTRY_CUISINES
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(country))
        .map(|(_, cuisine)| *cuisine)
        .unwrap_or(country);
    Some(canonical)
}

/// Find the active cuisine for `country`, creating it when none exists yet.
///
/// A cuisine created here is immediately visible to later lookups, so rows
/// later in the same job reuse it.
pub async fn resolve_cuisine(
    store: &dyn RecipeStore,
    country: &str,
) -> Result<CuisineId, CuisineError> {
    let name = canonical_cuisine_name(country).ok_or(CuisineError::Empty)?;
    let store_err = |source| CuisineError::Store {
        name: name.to_string(),
        source,
    };

    if let Some(existing) = store.find_active_cuisine(name).await.map_err(store_err)? {
        debug!("Country {:?} matched cuisine {:?}", country, existing.name);
        return Ok(existing.id);
    }

    let created = store.create_cuisine(name).await.map_err(store_err)?;
    info!("Created cuisine {:?} (id {})", created.name, created.id);
    Ok(created.id)
}
