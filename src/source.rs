//! Decoding of the CSV feed into ordered rows.
//!
//! The whole feed is decoded up front so that a broken file fails the job
//! before any row reaches storage. Lines whose cells are all blank are not
//! rows. Rows with missing or extra cells are kept; judging their content is
//! the validator's job.

use std::sync::Arc;

use csv::{ReaderBuilder, StringRecord, Trim};
use log::debug;

pub const COUNTRY: &str = "Country";
pub const TITLE: &str = "Recipe Title";
pub const INTRO: &str = "Intro";
pub const INGREDIENTS: &str = "Ingredients";
pub const METHOD: &str = "Method";
pub const HELPFUL_NOTES: &str = "Helpful Notes";
pub const IMAGE_URL: &str = "Image url";
pub const KEYWORDS: &str = "Keywords";

/// One data line of the feed with access to its cells by column name
#[derive(Debug, Clone)]
pub struct RawRow {
    number: usize,
    line: u64,
    headers: Arc<Vec<String>>,
    record: StringRecord,
}

impl RawRow {
    /// 1-based position among the data rows
    pub fn number(&self) -> usize {
        self.number
    }

    /// Line of the feed the row starts on
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Cell under `column`, matched case-insensitively. `None` when the feed
    /// has no such column or the row is too short to reach it.
    pub fn get(&self, column: &str) -> Option<&str> {
        let index = self
            .headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(column))?;
        self.record.get(index)
    }

    /// (column, value) pairs in feed order
    pub fn cells(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.record.iter())
    }
}

/// Rows of one feed, in file order
#[derive(Debug)]
pub struct RowSource {
    headers: Arc<Vec<String>>,
    rows: Vec<RawRow>,
}

impl RowSource {
    /// Decode a CSV feed. The first record is the header row.
    pub fn parse(input: impl AsRef<[u8]>) -> Result<Self, csv::Error> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::Headers)
            .from_reader(input.as_ref());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        let headers = Arc::new(headers);
        debug!("CSV columns: {:?}", headers);

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            if record.iter().all(|cell| cell.trim().is_empty()) {
                debug!("Skipping blank line {}", line);
                continue;
            }
            rows.push(RawRow {
                number: rows.len() + 1,
                line,
                headers: Arc::clone(&headers),
                record,
            });
        }

        Ok(RowSource { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl IntoIterator for RowSource {
    type Item = RawRow;
    type IntoIter = std::vec::IntoIter<RawRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
