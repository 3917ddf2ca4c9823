use log::debug;
use thiserror::Error;

use crate::source::{
    RawRow, COUNTRY, HELPFUL_NOTES, IMAGE_URL, INGREDIENTS, INTRO, KEYWORDS, METHOD, TITLE,
};

/// Placeholder used in messages when a row has no usable title
pub const UNKNOWN_TITLE: &str = "Unknown";

/// A row with every field needed to build a recipe, in normalized form
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRow {
    pub title: String,
    pub description: Option<String>,
    /// One entry per non-blank line of the `Ingredients` cell
    pub ingredients: Vec<String>,
    /// One entry per non-blank line of the `Method` cell
    pub instructions: Vec<String>,
    pub helpful_notes: Option<String>,
    /// Raw country text, resolved to a cuisine later
    pub country: String,
    pub image_url: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Missing required fields")]
pub struct ValidationError {
    /// Trimmed title, or [`UNKNOWN_TITLE`]
    pub title: String,
    pub missing: Vec<&'static str>,
}

/// Check that `Recipe Title`, `Ingredients` and `Method` are present and
/// non-blank, and normalize the row.
pub fn validate_row(row: &RawRow) -> Result<ValidatedRow, ValidationError> {
    let title = non_blank(row.get(TITLE));
    let ingredients = non_blank(row.get(INGREDIENTS));
    let method = non_blank(row.get(METHOD));

    let (title, ingredients, method) = match (title, ingredients, method) {
        (Some(t), Some(i), Some(m)) => (t, i, m),
        (title, ingredients, method) => {
            let missing = [
                (TITLE, title.is_none()),
                (INGREDIENTS, ingredients.is_none()),
                (METHOD, method.is_none()),
            ]
            .into_iter()
            .filter_map(|(name, absent)| absent.then_some(name))
            .collect();
            let err = ValidationError {
                title: title.unwrap_or(UNKNOWN_TITLE).to_string(),
                missing,
            };
            debug!("Row {} failed validation: {:?}", row.number(), err.missing);
            return Err(err);
        }
    };

    Ok(ValidatedRow {
        title: title.to_string(),
        description: non_blank(row.get(INTRO)).map(str::to_string),
        ingredients: split_lines(ingredients),
        instructions: split_lines(method),
        helpful_notes: non_blank(row.get(HELPFUL_NOTES)).map(str::to_string),
        country: row.get(COUNTRY).unwrap_or_default().trim().to_string(),
        image_url: non_blank(row.get(IMAGE_URL)).map(str::to_string),
        tags: row.get(KEYWORDS).map(parse_tags).unwrap_or_default(),
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Split a multi-line cell into trimmed, non-blank entries
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Comma-separated keywords; first spelling wins among case-insensitive duplicates
pub fn parse_tags(keywords: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in keywords.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            tags.push(tag.to_string());
        }
    }
    tags
}
