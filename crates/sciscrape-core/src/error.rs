use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Malformed staged queries: {0}")]
    MalformedStagedQueries(String),

    #[error("Staged queries and provenance differ in length: {queries} queries, {provenance} provenance entries")]
    StagingLengthMismatch { queries: usize, provenance: usize },

    #[error("Table error: {0}")]
    Table(#[from] crate::table::TableError),

    #[error("HTTP client error: {0}")]
    Client(#[from] crate::network::ClientError),

    #[error("PDF extraction failed for {path}: {reason}")]
    Pdf { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
