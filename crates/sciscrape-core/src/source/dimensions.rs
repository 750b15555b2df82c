use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::{is_doi, string_list, text_field, Enricher, Obtained, SourceCapability};
use crate::network::{Throttle, Transport};
use crate::result::WebScrapeResult;

#[derive(Debug, Deserialize)]
struct DimensionsResponse {
    #[serde(default)]
    docs: Vec<Value>,
}

/// Bibliographic search against the Dimensions dataset endpoint, with
/// optional citation, abstract and figure enrichment of each hit.
pub struct DimensionsScraper {
    transport: Arc<dyn Transport>,
    url: String,
    citation_subset: bool,
    throttle: Throttle,
    biblio: Option<Box<dyn Enricher<String>>>,
    abstracts: Option<Box<dyn Enricher<String>>>,
    figures: Option<Box<dyn Enricher<Vec<String>>>>,
}

impl DimensionsScraper {
    pub fn new(transport: Arc<dyn Transport>, url: impl Into<String>) -> Self {
        Self {
            transport,
            url: url.into(),
            citation_subset: false,
            throttle: Throttle::none(),
            biblio: None,
            abstracts: None,
            figures: None,
        }
    }

    /// Treat each query as a publication id and return the papers citing it.
    #[must_use]
    pub const fn with_citation_subset(mut self, citation_subset: bool) -> Self {
        self.citation_subset = citation_subset;
        self
    }

    #[must_use]
    pub const fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }

    #[must_use]
    pub fn with_biblio(mut self, enricher: Box<dyn Enricher<String>>) -> Self {
        self.biblio = Some(enricher);
        self
    }

    #[must_use]
    pub fn with_abstracts(mut self, enricher: Box<dyn Enricher<String>>) -> Self {
        self.abstracts = Some(enricher);
        self
    }

    #[must_use]
    pub fn with_figures(mut self, enricher: Box<dyn Enricher<Vec<String>>>) -> Self {
        self.figures = Some(enricher);
        self
    }

    fn querystring(&self, query: &str) -> Vec<(String, String)> {
        if self.citation_subset {
            return vec![("or_subset_publication_citations".into(), query.into())];
        }

        let field = if is_doi(query) { "doi" } else { "text_search" };
        vec![
            ("search_mode".into(), "content".into()),
            ("search_text".into(), query.into()),
            ("search_type".into(), "kws".into()),
            ("search_field".into(), field.into()),
        ]
    }

    async fn enrich(&self, result: &mut WebScrapeResult) {
        let doi = non_empty(&result.doi);
        let internal_id = result.internal_id.clone();
        let title = non_empty(&result.title);

        result.biblio = enrich_field(self.biblio.as_deref(), "doi", doi.as_deref()).await;
        result.abstract_text =
            enrich_field(self.abstracts.as_deref(), "internal_id", internal_id.as_deref()).await;
        result.figures = enrich_field(self.figures.as_deref(), "title", title.as_deref()).await;
    }
}

#[async_trait]
impl SourceCapability for DimensionsScraper {
    fn name(&self) -> &str {
        "dimensions"
    }

    async fn obtain(&self, query: &str) -> Obtained {
        let response = self.transport.get(&self.url, &self.querystring(query)).await;
        self.throttle.pause().await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(query, error = %e, "Dimensions request failed");
                return Obtained::Nothing;
            }
        };
        tracing::debug!(query, status = response.status, "Dimensions response");

        if !response.is_success() {
            tracing::warn!(query, status = response.status, "Dimensions returned an error status");
            return Obtained::Nothing;
        }

        let docs = match response.json::<DimensionsResponse>() {
            Ok(parsed) => parsed.docs,
            Err(e) => {
                tracing::warn!(query, error = %e, "Dimensions response was not valid JSON");
                return Obtained::Nothing;
            }
        };

        let Some(doc) = docs.first() else {
            tracing::debug!(query, "No Dimensions records");
            return Obtained::Nothing;
        };

        let mut result = parse_doc(doc);
        self.enrich(&mut result).await;
        Obtained::One(result.into())
    }
}

/// Map one Dimensions record onto the bibliographic result shape.
fn parse_doc(doc: &Value) -> WebScrapeResult {
    let mut result = WebScrapeResult::new(
        text_field(doc, "title").unwrap_or_default(),
        text_field(doc, "pub_date").unwrap_or_default(),
        text_field(doc, "doi").unwrap_or_default(),
    );

    result.internal_id = text_field(doc, "id");
    result.journal_title = text_field(doc, "journal_title")
        .or_else(|| doc.get("journal").and_then(|j| text_field(j, "title")));
    result.times_cited = doc.get("times_cited").and_then(Value::as_u64);
    result.author_list = string_list(doc, "author_list").unwrap_or_default();
    result.citations = string_list(doc, "cited_dimensions_ids").unwrap_or_default();
    result.keywords = string_list(doc, "mesh_terms");
    result
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Run one enrichment lookup. A missing key leaves the field absent
/// without contacting the enricher.
async fn enrich_field<T: Send>(
    enricher: Option<&dyn Enricher<T>>,
    key_name: &str,
    key: Option<&str>,
) -> Option<T> {
    let enricher = enricher?;
    let Some(key) = key else {
        tracing::debug!(enricher = enricher.name(), key = key_name, "Record has no enrichment key");
        return None;
    };

    let value = enricher.lookup(key).await;
    if value.is_none() {
        tracing::debug!(enricher = enricher.name(), key, "Enrichment found nothing");
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::testing::{Method, ScriptedTransport};
    use crate::result::ScrapeResult;
    use crate::source::CitationScraper;
    use std::sync::Mutex;
    use std::time::Duration;

    const URL: &str = "https://dimensions.test/discover/publication/results.json";

    /// Echoes its key, recording every key it was asked for.
    struct EchoEnricher {
        name: &'static str,
        keys: Arc<Mutex<Vec<String>>>,
    }

    impl EchoEnricher {
        fn boxed(name: &'static str) -> (Box<Self>, Arc<Mutex<Vec<String>>>) {
            let keys = Arc::new(Mutex::new(Vec::new()));
            (
                Box::new(Self {
                    name,
                    keys: Arc::clone(&keys),
                }),
                keys,
            )
        }
    }

    #[async_trait]
    impl Enricher<String> for EchoEnricher {
        fn name(&self) -> &str {
            self.name
        }

        async fn lookup(&self, key: &str) -> Option<String> {
            self.keys.lock().unwrap().push(key.to_string());
            Some(format!("{}:{key}", self.name))
        }
    }

    struct FixedFigures;

    #[async_trait]
    impl Enricher<Vec<String>> for FixedFigures {
        fn name(&self) -> &str {
            "figures"
        }

        async fn lookup(&self, _key: &str) -> Option<Vec<String>> {
            Some(vec!["https://figures.test/1.png".into()])
        }
    }

    fn body(doc: &Value) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({ "docs": [doc] })).unwrap()
    }

    fn full_doc() -> Value {
        serde_json::json!({
            "title": "Protein folding in vivo",
            "pub_date": "2021-03-04",
            "doi": "10.1000/fold",
            "id": "pub.1001",
            "journal_title": "Cell Studies",
            "times_cited": 12,
            "author_list": "A. Author, B. Author",
            "cited_dimensions_ids": ["pub.1", "pub.2"],
            "mesh_terms": ["Proteins"]
        })
    }

    fn web(obtained: Obtained) -> WebScrapeResult {
        match obtained {
            Obtained::One(ScrapeResult::Web(web)) => web,
            other => panic!("expected one web result, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_maps_record_and_enriches() {
        let transport = Arc::new(ScriptedTransport::new().on_get(URL, 200, body(&full_doc())));
        let (biblio, biblio_keys) = EchoEnricher::boxed("biblio");
        let (abstracts, abstract_keys) = EchoEnricher::boxed("abstract");
        let scraper = DimensionsScraper::new(transport.clone(), URL)
            .with_biblio(biblio)
            .with_abstracts(abstracts)
            .with_figures(Box::new(FixedFigures));

        let result = web(scraper.obtain("protein folding").await);

        assert_eq!(result.title, "Protein folding in vivo");
        assert_eq!(result.internal_id.as_deref(), Some("pub.1001"));
        assert_eq!(result.times_cited, Some(12));
        assert_eq!(result.author_list, vec!["A. Author", "B. Author"]);
        assert_eq!(result.citations, vec!["pub.1", "pub.2"]);
        assert_eq!(result.keywords, Some(vec!["Proteins".to_string()]));
        assert_eq!(result.biblio.as_deref(), Some("biblio:10.1000/fold"));
        assert_eq!(result.abstract_text.as_deref(), Some("abstract:pub.1001"));
        assert_eq!(result.figures.as_ref().map(Vec::len), Some(1));
        assert_eq!(*biblio_keys.lock().unwrap(), vec!["10.1000/fold"]);
        assert_eq!(*abstract_keys.lock().unwrap(), vec!["pub.1001"]);
    }

    #[tokio::test]
    async fn test_missing_internal_id_leaves_abstract_absent() {
        let mut doc = full_doc();
        doc.as_object_mut().unwrap().remove("id");
        let transport = Arc::new(ScriptedTransport::new().on_get(URL, 200, body(&doc)));
        let (biblio, _) = EchoEnricher::boxed("biblio");
        let (abstracts, abstract_keys) = EchoEnricher::boxed("abstract");
        let scraper = DimensionsScraper::new(transport, URL)
            .with_biblio(biblio)
            .with_abstracts(abstracts)
            .with_figures(Box::new(FixedFigures));

        let result = web(scraper.obtain("protein folding").await);

        assert!(result.abstract_text.is_none());
        assert!(abstract_keys.lock().unwrap().is_empty());
        assert_eq!(result.title, "Protein folding in vivo");
        assert_eq!(result.doi, "10.1000/fold");
        assert!(result.biblio.is_some());
        assert!(result.figures.is_some());
        assert_eq!(result.times_cited, Some(12));
    }

    #[tokio::test]
    async fn test_failed_biblio_keeps_other_fields() {
        const CITE: &str = "https://citation.test/format";
        let transport = Arc::new(
            ScriptedTransport::new()
                .on_get(URL, 200, body(&full_doc()))
                .fail_get(CITE),
        );
        let (abstracts, abstract_keys) = EchoEnricher::boxed("abstract");
        let scraper = DimensionsScraper::new(transport.clone(), URL)
            .with_biblio(Box::new(CitationScraper::new(transport.clone(), CITE)))
            .with_abstracts(abstracts)
            .with_figures(Box::new(FixedFigures));

        let result = web(scraper.obtain("protein folding").await);

        assert_eq!(transport.count(Method::Get, CITE), 1);
        assert!(result.biblio.is_none());
        assert_eq!(result.title, "Protein folding in vivo");
        assert_eq!(result.doi, "10.1000/fold");
        assert_eq!(result.times_cited, Some(12));
        assert_eq!(result.abstract_text.as_deref(), Some("abstract:pub.1001"));
        assert_eq!(*abstract_keys.lock().unwrap(), vec!["pub.1001"]);
        assert_eq!(result.figures.as_ref().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_querystring_modes() {
        let transport = Arc::new(ScriptedTransport::new());
        let scraper = DimensionsScraper::new(transport.clone(), URL);
        let subset = DimensionsScraper::new(transport.clone(), URL).with_citation_subset(true);

        scraper.obtain("10.1000/fold").await;
        scraper.obtain("protein folding").await;
        subset.obtain("pub.1001").await;

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert!(requests[0]
            .query
            .contains(&("search_field".into(), "doi".into())));
        assert!(requests[1]
            .query
            .contains(&("search_field".into(), "text_search".into())));
        assert_eq!(
            requests[2].query,
            vec![("or_subset_publication_citations".to_string(), "pub.1001".to_string())]
        );
    }

    #[tokio::test]
    async fn test_failures_are_absent() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .on_get("https://dimensions.test/empty", 200, r#"{"docs": []}"#)
                .on_get("https://dimensions.test/garbage", 200, "<html>")
                .fail_get("https://dimensions.test/down"),
        );

        for url in [
            "https://dimensions.test/empty",
            "https://dimensions.test/garbage",
            "https://dimensions.test/down",
            "https://dimensions.test/missing",
        ] {
            let scraper = DimensionsScraper::new(transport.clone(), url);
            assert!(scraper.obtain("anything").await.is_nothing(), "{url}");
        }
    }

    #[tokio::test]
    async fn test_missing_fields_default_to_empty() {
        let transport = Arc::new(ScriptedTransport::new().on_get(URL, 200, r#"{"docs": [{}]}"#));
        let (biblio, biblio_keys) = EchoEnricher::boxed("biblio");
        let scraper = DimensionsScraper::new(transport, URL).with_biblio(biblio);

        let result = web(scraper.obtain("x").await);

        assert_eq!(result.title, "");
        assert_eq!(result.doi, "");
        assert!(result.biblio.is_none());
        assert!(biblio_keys.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pauses_after_each_request() {
        let transport = Arc::new(ScriptedTransport::new().fail_get(URL));
        let scraper = DimensionsScraper::new(transport.clone(), URL)
            .with_throttle(Throttle::new(Duration::from_secs(1)));

        let start = tokio::time::Instant::now();
        scraper.obtain("a").await;
        scraper.obtain("b").await;

        assert!(start.elapsed() >= Duration::from_secs(2));
        assert_eq!(transport.count(Method::Get, URL), 2);
    }
}
