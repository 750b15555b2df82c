use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::network::{NetworkConfig, NetworkConfigError, ScholarClient, Throttle, Transport};
use crate::source::{
    CitationScraper, DimensionsScraper, DocScraper, DocumentMode, Downloader,
    SemanticFigureScraper, SemanticScholarScraper, SummaryScraper,
};

/// File looked up in the working directory before the user config dir.
pub const LOCAL_CONFIG_FILE: &str = "config_setup.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Missing configuration value: {0}")]
    Missing(&'static str),

    #[error(transparent)]
    Network(#[from] NetworkConfigError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Run configuration, read from JSON. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Delimited file of lookup queries.
    pub source_file: PathBuf,
    /// Directory of PDFs to score.
    pub source_dir: PathBuf,
    pub export_dir: PathBuf,
    pub target_words: PathBuf,
    pub bycatch_words: PathBuf,
    /// Seconds to wait after each primary request.
    pub sleep_interval: f64,
    /// Seconds to wait after each enrichment request.
    pub enrichment_sleep_interval: f64,
    pub dimensions_ai_dataset_url: String,
    /// Search endpoint used to resolve titles for figure scraping.
    pub semantic_scholar_url: String,
    pub semantic_scholar_paper_url: String,
    pub semantic_scholar_api_url: String,
    pub citation_crosscite_url: String,
    pub abstract_getting_url: String,
    pub downloader_url: Option<String>,
    pub drop_empty_tokens: bool,
    pub network: NetworkConfig,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            source_file: PathBuf::from("source.csv"),
            source_dir: PathBuf::from("papers"),
            export_dir: PathBuf::from("export"),
            target_words: PathBuf::from("target_words.txt"),
            bycatch_words: PathBuf::from("bycatch_words.txt"),
            sleep_interval: 1.0,
            enrichment_sleep_interval: 0.1,
            dimensions_ai_dataset_url:
                "https://app.dimensions.ai/discover/publication/results.json".to_string(),
            semantic_scholar_url: "https://www.semanticscholar.org/api/1/search".to_string(),
            semantic_scholar_paper_url: "https://www.semanticscholar.org/paper".to_string(),
            semantic_scholar_api_url: "https://api.semanticscholar.org/graph/v1".to_string(),
            citation_crosscite_url: "https://citation.crosscite.org/format".to_string(),
            abstract_getting_url: "https://app.dimensions.ai/details/publication".to_string(),
            downloader_url: None,
            drop_empty_tokens: false,
            network: NetworkConfig::default(),
        }
    }
}

impl ScrapeConfig {
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.network.validate()?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// `./config_setup.json`, then `<config dir>/sciscrape/config.json`,
    /// then defaults.
    pub fn discover() -> ConfigResult<Self> {
        for candidate in Self::candidates() {
            if candidate.is_file() {
                return Self::load(&candidate);
            }
        }
        tracing::debug!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    fn candidates() -> Vec<PathBuf> {
        let mut candidates = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("sciscrape").join("config.json"));
        }
        candidates
    }

    /// Date stamp used in export file names.
    #[must_use]
    pub fn today() -> String {
        chrono::Local::now().format("%y%m%d").to_string()
    }

    pub fn throttle(&self) -> Throttle {
        Throttle::from_secs_f64(self.sleep_interval)
    }

    pub fn enrichment_throttle(&self) -> Throttle {
        Throttle::from_secs_f64(self.enrichment_sleep_interval)
    }

    /// The one HTTP client shared by every source of a run.
    pub fn transport(&self) -> crate::Result<Arc<dyn Transport>> {
        let client: Arc<dyn Transport> = Arc::new(ScholarClient::new(self.network.clone())?);
        Ok(client)
    }

    pub fn doc_scraper(&self, mode: DocumentMode) -> crate::Result<DocScraper> {
        Ok(DocScraper::from_files(&self.target_words, &self.bycatch_words, mode)?
            .with_drop_empty_tokens(self.drop_empty_tokens))
    }

    /// Dimensions lookups with citation, abstract and figure enrichment.
    pub fn dimensions_scraper(
        &self,
        transport: &Arc<dyn Transport>,
        citation_subset: bool,
    ) -> DimensionsScraper {
        let nested = self.enrichment_throttle();

        DimensionsScraper::new(Arc::clone(transport), &self.dimensions_ai_dataset_url)
            .with_citation_subset(citation_subset)
            .with_throttle(self.throttle())
            .with_biblio(Box::new(
                CitationScraper::new(Arc::clone(transport), &self.citation_crosscite_url)
                    .with_throttle(nested),
            ))
            .with_abstracts(Box::new(
                SummaryScraper::new(Arc::clone(transport), &self.abstract_getting_url)
                    .with_throttle(nested),
            ))
            .with_figures(Box::new(
                SemanticFigureScraper::new(
                    Arc::clone(transport),
                    &self.semantic_scholar_url,
                    &self.semantic_scholar_paper_url,
                )
                .with_throttle(nested),
            ))
    }

    pub fn semantic_scholar_scraper(&self, transport: &Arc<dyn Transport>) -> SemanticScholarScraper {
        SemanticScholarScraper::new(Arc::clone(transport), &self.semantic_scholar_api_url)
            .with_throttle(self.throttle())
    }

    pub fn downloader(&self, transport: &Arc<dyn Transport>) -> ConfigResult<Downloader> {
        let url = self
            .downloader_url
            .as_deref()
            .ok_or(ConfigError::Missing("downloader_url"))?;
        Ok(Downloader::new(Arc::clone(transport), url, &self.export_dir).with_throttle(self.throttle()))
    }
}
