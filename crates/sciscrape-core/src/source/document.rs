use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{Obtained, SourceCapability};
use crate::error::{Error, Result};
use crate::score::{tokenize_abstract, tokenize_pages, RelevanceEngine, Vocabulary};

/// How a [`DocScraper`] interprets its query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentMode {
    /// The query is a path to a local PDF.
    #[default]
    Pdf,
    /// The query is abstract text.
    Abstract,
}

/// Per-page text of a local document.
pub trait PageExtractor: Send + Sync {
    fn extract_pages(&self, path: &Path) -> std::result::Result<Vec<String>, String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfPages;

impl PageExtractor for PdfPages {
    fn extract_pages(&self, path: &Path) -> std::result::Result<Vec<String>, String> {
        pdf_extract::extract_text_by_pages(path).map_err(|e| e.to_string())
    }
}

/// Scores local PDFs or literal abstracts against the target and bycatch
/// vocabularies.
pub struct DocScraper {
    engine: RelevanceEngine,
    mode: DocumentMode,
    extractor: Arc<dyn PageExtractor>,
    drop_empty_tokens: bool,
}

impl DocScraper {
    pub fn new(engine: RelevanceEngine, mode: DocumentMode) -> Self {
        Self {
            engine,
            mode,
            extractor: Arc::new(PdfPages),
            drop_empty_tokens: false,
        }
    }

    /// Load both vocabularies from newline-delimited files.
    pub fn from_files(target: &Path, bycatch: &Path, mode: DocumentMode) -> Result<Self> {
        let target = Vocabulary::load(target)?;
        let bycatch = Vocabulary::load(bycatch)?;
        Ok(Self::new(RelevanceEngine::new(target, bycatch), mode))
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: Arc<dyn PageExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    #[must_use]
    pub const fn with_drop_empty_tokens(mut self, drop_empty: bool) -> Self {
        self.drop_empty_tokens = drop_empty;
        self
    }

    pub const fn mode(&self) -> DocumentMode {
        self.mode
    }

    async fn tokens(&self, query: &str) -> Result<Vec<String>> {
        match self.mode {
            DocumentMode::Abstract => Ok(tokenize_abstract(query, self.drop_empty_tokens)),
            DocumentMode::Pdf => {
                let pages = self.extract(PathBuf::from(query)).await?;
                Ok(tokenize_pages(&pages, self.drop_empty_tokens))
            }
        }
    }

    async fn extract(&self, path: PathBuf) -> Result<Vec<String>> {
        let extractor = Arc::clone(&self.extractor);
        let shown = path.display().to_string();

        let pages = tokio::task::spawn_blocking(move || extractor.extract_pages(&path))
            .await
            .map_err(|e| Error::Pdf {
                path: shown.clone(),
                reason: e.to_string(),
            })?
            .map_err(|reason| Error::Pdf {
                path: shown.clone(),
                reason,
            })?;

        tracing::debug!(path = %shown, pages = pages.len(), "Extracted document text");
        Ok(pages)
    }
}

#[async_trait]
impl SourceCapability for DocScraper {
    fn name(&self) -> &str {
        match self.mode {
            DocumentMode::Pdf => "pdf",
            DocumentMode::Abstract => "abstract",
        }
    }

    async fn obtain(&self, query: &str) -> Obtained {
        match self.tokens(query).await {
            Ok(tokens) => Obtained::One(self.engine.score_tokens(&tokens).into()),
            Err(e) => {
                tracing::warn!(query, error = %e, "Could not read document, skipping");
                Obtained::Nothing
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ScrapeResult;
    use std::collections::HashMap;

    struct FakePages(HashMap<PathBuf, Vec<String>>);

    impl PageExtractor for FakePages {
        fn extract_pages(&self, path: &Path) -> std::result::Result<Vec<String>, String> {
            self.0
                .get(path)
                .cloned()
                .ok_or_else(|| "unreadable".to_string())
        }
    }

    fn engine() -> RelevanceEngine {
        RelevanceEngine::new(
            ["protein", "folding"].into_iter().collect(),
            ["galaxy"].into_iter().collect(),
        )
    }

    fn document(obtained: Obtained) -> crate::result::DocumentResult {
        match obtained {
            Obtained::One(ScrapeResult::Document(doc)) => doc,
            other => panic!("expected one document result, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_abstract_mode_scores_text() {
        let scraper = DocScraper::new(engine(), DocumentMode::Abstract);

        let doc = document(scraper.obtain("Protein folding of protein galaxy").await);

        assert_eq!(doc.matching_terms, 3);
        assert_eq!(doc.bycatch_terms, 1);
        assert_eq!(doc.total_length, 5);
    }

    #[tokio::test]
    async fn test_pdf_mode_reads_pages() {
        let mut pages = HashMap::new();
        pages.insert(
            PathBuf::from("/papers/a.pdf"),
            vec!["Protein-folding.".to_string(), "Galaxy".to_string()],
        );
        let scraper = DocScraper::new(engine(), DocumentMode::Pdf)
            .with_extractor(Arc::new(FakePages(pages)));

        let doc = document(scraper.obtain("/papers/a.pdf").await);

        assert_eq!(doc.matching_terms, 2);
        assert_eq!(doc.bycatch_terms, 1);
        // "protein folding " splits into a trailing empty token
        assert_eq!(doc.total_length, 4);
    }

    #[tokio::test]
    async fn test_pdf_drop_empty_tokens() {
        let mut pages = HashMap::new();
        pages.insert(PathBuf::from("/a.pdf"), vec!["Protein-folding.".to_string()]);
        let scraper = DocScraper::new(engine(), DocumentMode::Pdf)
            .with_extractor(Arc::new(FakePages(pages)))
            .with_drop_empty_tokens(true);

        let doc = document(scraper.obtain("/a.pdf").await);

        assert_eq!(doc.total_length, 2);
    }

    #[tokio::test]
    async fn test_blank_vocabulary_line_matches_empty_tokens() {
        let engine = || {
            RelevanceEngine::new(
                ["protein", ""].into_iter().collect(),
                ["galaxy"].into_iter().collect(),
            )
        };
        let keep = DocScraper::new(engine(), DocumentMode::Abstract);
        let drop = DocScraper::new(engine(), DocumentMode::Abstract).with_drop_empty_tokens(true);

        let kept = document(keep.obtain("protein  galaxy").await);
        let dropped = document(drop.obtain("protein  galaxy").await);

        assert_eq!(kept.matching_terms, 2);
        assert_eq!(kept.total_length, 3);
        assert_eq!(dropped.matching_terms, 1);
        assert_eq!(dropped.total_length, 2);
    }

    #[tokio::test]
    async fn test_unreadable_pdf_is_absent() {
        let scraper = DocScraper::new(engine(), DocumentMode::Pdf)
            .with_extractor(Arc::new(FakePages(HashMap::new())));

        assert!(scraper.obtain("/missing.pdf").await.is_nothing());
    }

    #[tokio::test]
    async fn test_real_extractor_rejects_non_pdf() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"plain text, not a pdf").unwrap();
        let scraper = DocScraper::new(engine(), DocumentMode::Pdf);

        let obtained = scraper.obtain(&file.path().display().to_string()).await;

        assert!(obtained.is_nothing());
    }

    #[test]
    fn test_from_files_requires_vocabularies() {
        let result = DocScraper::from_files(
            Path::new("/nonexistent/target.txt"),
            Path::new("/nonexistent/bycatch.txt"),
            DocumentMode::Abstract,
        );

        assert!(matches!(result, Err(Error::Io(_))));
    }
}
