#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod fetch;
pub mod network;
pub mod result;
pub mod sciscraper;
pub mod score;
pub mod serialize;
pub mod source;
pub mod table;

pub use config::{ConfigError, ScrapeConfig};
pub use error::{Error, Result};
pub use fetch::{Fetcher, ScrapeFetcher, StagedQuerySet, StagingFetcher, PROVENANCE_COLUMN};
pub use network::{HttpResponse, NetworkConfig, ScholarClient, Throttle, Transport};
pub use result::{DocumentResult, DownloadReceipt, Record, ResultKind, ScrapeResult, WebScrapeResult};
pub use sciscraper::{SciScraper, ScrapeOutcome};
pub use score::{RelevanceEngine, RelevanceStatistics, Vocabulary, WordscoreCalculator};
pub use source::{Enricher, Obtained, SourceCapability};
pub use table::{Table, TableError};
