//! Data sources.
//!
//! Every source answers one query with zero, one or many results through
//! [`SourceCapability::obtain`]. Failures never escape a source: they are
//! logged and become [`Obtained::Nothing`], so a run always completes.
//!
//! Enrichment lookups ([`Enricher`]) follow the same contract but return a
//! single typed field keyed by a value taken from a primary result.

mod citation;
mod dimensions;
mod document;
mod download;
mod figures;
mod semantic_scholar;
mod summary;

pub use citation::{CitationScraper, Style};
pub use dimensions::DimensionsScraper;
pub use document::{DocScraper, DocumentMode, PageExtractor, PdfPages};
pub use download::{Downloader, MAX_PDF_BYTES};
pub use figures::{select_attributes, SemanticFigureScraper, FIGURE_SELECTOR};
pub use semantic_scholar::SemanticScholarScraper;
pub use summary::SummaryScraper;

use async_trait::async_trait;
use serde_json::Value;

use crate::result::ScrapeResult;

/// What a source produced for one query.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Obtained {
    #[default]
    Nothing,
    One(ScrapeResult),
    Many(Vec<ScrapeResult>),
}

impl Obtained {
    #[must_use]
    pub const fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Nothing => 0,
            Self::One(_) => 1,
            Self::Many(results) => results.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<ScrapeResult> {
        match self {
            Self::Nothing => Vec::new(),
            Self::One(result) => vec![result],
            Self::Many(results) => results,
        }
    }
}

impl IntoIterator for Obtained {
    type Item = ScrapeResult;
    type IntoIter = std::vec::IntoIter<ScrapeResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_vec().into_iter()
    }
}

impl From<ScrapeResult> for Obtained {
    fn from(result: ScrapeResult) -> Self {
        Self::One(result)
    }
}

impl From<Option<ScrapeResult>> for Obtained {
    fn from(result: Option<ScrapeResult>) -> Self {
        result.map_or(Self::Nothing, Self::One)
    }
}

impl From<Vec<ScrapeResult>> for Obtained {
    fn from(results: Vec<ScrapeResult>) -> Self {
        if results.is_empty() {
            Self::Nothing
        } else {
            Self::Many(results)
        }
    }
}

#[async_trait]
pub trait SourceCapability: Send + Sync {
    fn name(&self) -> &str;

    async fn obtain(&self, query: &str) -> Obtained;
}

/// A secondary lookup that fills one field of a primary result.
#[async_trait]
pub trait Enricher<T: Send>: Send + Sync {
    fn name(&self) -> &str;

    async fn lookup(&self, key: &str) -> Option<T>;
}

/// A leading `10.` marks a query as a DOI.
#[must_use]
pub fn is_doi(query: &str) -> bool {
    query.trim_start().starts_with("10.")
}

/// Text of a JSON field; numbers are rendered, empty strings count as absent.
pub(crate) fn text_field(item: &Value, key: &str) -> Option<String> {
    match item.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A list of strings from a JSON field holding an array of strings, an
/// array of `{ "name": .. }` objects, or one comma-separated string.
pub(crate) fn string_list(item: &Value, key: &str) -> Option<Vec<String>> {
    let list = match item.get(key)? {
        Value::Array(values) => values
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Object(_) => text_field(v, "name").or_else(|| text_field(v, "full_name")),
                _ => None,
            })
            .collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => return None,
    };
    Some(list)
}

/// Join a base URL and a path segment with exactly one slash.
pub(crate) fn join_url(base: &str, segment: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        segment.trim_start_matches('/')
    )
}
