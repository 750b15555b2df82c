//! Result variants produced by sources.
//!
//! Every variant converts to and from a flat key/value [`Record`], which is
//! the shape the table layer assembles rows from. Numbers stay numbers and
//! missing optional fields are left out of the record entirely.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of loosely typed data, keyed by column name in insertion order.
pub type Record = Map<String, Value>;

/// A (term, frequency) pair from relevance scoring.
pub type TermFrequency = (String, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKind {
    Document,
    Web,
    Download,
}

impl ResultKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Web => "web",
            Self::Download => "download",
        }
    }
}

impl std::fmt::Display for ResultKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lexical relevance analysis of one document or abstract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub matching_terms: usize,
    pub bycatch_terms: usize,
    pub total_length: usize,
    /// Probability that a salient term is on-topic.
    pub wordscore: f64,
    pub expectation: f64,
    pub variance: f64,
    pub standard_deviation: f64,
    pub skewness: f64,
    #[serde(default)]
    pub target_freq: Vec<TermFrequency>,
    #[serde(default)]
    pub bycatch_freq: Vec<TermFrequency>,
}

/// Bibliographic metadata for one paper, optionally enriched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebScrapeResult {
    pub title: String,
    pub pub_date: String,
    pub doi: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub times_cited: Option<u64>,
    #[serde(default)]
    pub author_list: Vec<String>,
    #[serde(default)]
    pub citations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub figures: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biblio: Option<String>,
    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
}

impl WebScrapeResult {
    #[must_use]
    pub fn new(title: String, pub_date: String, doi: String) -> Self {
        Self {
            title,
            pub_date,
            doi,
            internal_id: None,
            journal_title: None,
            times_cited: None,
            author_list: Vec::new(),
            citations: Vec::new(),
            keywords: None,
            figures: None,
            biblio: None,
            abstract_text: None,
        }
    }

    #[must_use]
    pub fn with_internal_id(mut self, id: String) -> Self {
        self.internal_id = Some(id);
        self
    }

    #[must_use]
    pub fn with_abstract(mut self, text: String) -> Self {
        self.abstract_text = Some(text);
        self
    }

    #[must_use]
    pub fn with_citations(mut self, citations: Vec<String>) -> Self {
        self.citations = citations;
        self
    }
}

/// Outcome of a download attempt. `filepath` is absent when nothing was saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadReceipt {
    pub downloader: String,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,
}

impl DownloadReceipt {
    #[must_use]
    pub const fn is_saved(&self) -> bool {
        self.filepath.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScrapeResult {
    Document(DocumentResult),
    Web(WebScrapeResult),
    Download(DownloadReceipt),
}

impl ScrapeResult {
    #[must_use]
    pub const fn kind(&self) -> ResultKind {
        match self {
            Self::Document(_) => ResultKind::Document,
            Self::Web(_) => ResultKind::Web,
            Self::Download(_) => ResultKind::Download,
        }
    }

    pub fn to_record(&self) -> crate::Result<Record> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(<serde_json::Error as serde::ser::Error>::custom(format!(
                "{} result serialized to a non-object: {other}",
                self.kind()
            ))
            .into()),
        }
    }

    /// Rebuild a typed result from its record form.
    ///
    /// The variant is chosen by its identifying key: `matching_terms` for
    /// documents, `downloader` for receipts, anything else is web metadata.
    pub fn from_record(record: Record) -> crate::Result<Self> {
        let kind = if record.contains_key("matching_terms") {
            ResultKind::Document
        } else if record.contains_key("downloader") {
            ResultKind::Download
        } else {
            ResultKind::Web
        };

        let value = Value::Object(record);
        let result = match kind {
            ResultKind::Document => Self::Document(serde_json::from_value(value)?),
            ResultKind::Download => Self::Download(serde_json::from_value(value)?),
            ResultKind::Web => Self::Web(serde_json::from_value(value)?),
        };
        Ok(result)
    }
}

impl From<DocumentResult> for ScrapeResult {
    fn from(result: DocumentResult) -> Self {
        Self::Document(result)
    }
}

impl From<WebScrapeResult> for ScrapeResult {
    fn from(result: WebScrapeResult) -> Self {
        Self::Web(result)
    }
}

impl From<DownloadReceipt> for ScrapeResult {
    fn from(receipt: DownloadReceipt) -> Self {
        Self::Download(receipt)
    }
}
