use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::{is_doi, join_url, string_list, text_field, Obtained, SourceCapability};
use crate::network::{Throttle, Transport};
use crate::result::WebScrapeResult;

const FIELDS: &str =
    "title,publicationDate,externalIds,paperId,journal,citationCount,fieldsOfStudy,authors,abstract";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Value>,
}

/// Bibliographic lookup against the Semantic Scholar graph API.
///
/// DOI-like queries resolve the paper directly; anything else takes the
/// best hit of a keyword search.
pub struct SemanticScholarScraper {
    transport: Arc<dyn Transport>,
    api_url: String,
    throttle: Throttle,
}

impl SemanticScholarScraper {
    pub fn new(transport: Arc<dyn Transport>, api_url: impl Into<String>) -> Self {
        Self {
            transport,
            api_url: api_url.into(),
            throttle: Throttle::none(),
        }
    }

    #[must_use]
    pub const fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }

    fn request(&self, query: &str) -> (String, Vec<(String, String)>) {
        let fields = ("fields".to_string(), FIELDS.to_string());
        if is_doi(query) {
            let url = join_url(&self.api_url, &format!("paper/DOI:{}", query.trim()));
            (url, vec![fields])
        } else {
            let url = join_url(&self.api_url, "paper/search");
            let params = vec![
                ("query".to_string(), query.to_string()),
                ("limit".to_string(), "1".to_string()),
                fields,
            ];
            (url, params)
        }
    }
}

#[async_trait]
impl SourceCapability for SemanticScholarScraper {
    fn name(&self) -> &str {
        "semantic_scholar"
    }

    async fn obtain(&self, query: &str) -> Obtained {
        let (url, params) = self.request(query);
        let response = self.transport.get(&url, &params).await;
        self.throttle.pause().await;

        let response = match response {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                tracing::warn!(query, status = response.status, "Semantic Scholar returned an error status");
                return Obtained::Nothing;
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "Semantic Scholar request failed");
                return Obtained::Nothing;
            }
        };

        let paper = if is_doi(query) {
            response.json::<Value>().ok()
        } else {
            response
                .json::<SearchResponse>()
                .ok()
                .and_then(|r| r.data.into_iter().next())
        };

        match paper {
            Some(paper) if paper.is_object() => Obtained::One(parse_paper(&paper).into()),
            _ => {
                tracing::debug!(query, "No Semantic Scholar record");
                Obtained::Nothing
            }
        }
    }
}

fn parse_paper(paper: &Value) -> WebScrapeResult {
    let doi = paper
        .get("externalIds")
        .and_then(|ids| text_field(ids, "DOI"))
        .unwrap_or_default();

    let mut result = WebScrapeResult::new(
        text_field(paper, "title").unwrap_or_default(),
        text_field(paper, "publicationDate").unwrap_or_default(),
        doi,
    );

    result.internal_id = text_field(paper, "paperId");
    result.journal_title = paper.get("journal").and_then(|j| text_field(j, "name"));
    result.times_cited = paper.get("citationCount").and_then(Value::as_u64);
    result.keywords = string_list(paper, "fieldsOfStudy");
    result.author_list = string_list(paper, "authors").unwrap_or_default();
    result.abstract_text = text_field(paper, "abstract");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::testing::ScriptedTransport;
    use crate::result::ScrapeResult;

    const API: &str = "https://api.semantic.test/graph/v1";

    const PAPER: &str = r#"{
        "paperId": "649def34",
        "title": "Protein folding in vivo",
        "publicationDate": "2021-03-04",
        "externalIds": {"DOI": "10.1000/fold", "MAG": "123"},
        "journal": {"name": "Cell Studies"},
        "citationCount": 40,
        "fieldsOfStudy": ["Biology"],
        "authors": [{"authorId": "1", "name": "A. Author"}],
        "abstract": null
    }"#;

    fn web(obtained: Obtained) -> WebScrapeResult {
        match obtained {
            Obtained::One(ScrapeResult::Web(web)) => web,
            other => panic!("expected one web result, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_doi_lookup_maps_fields() {
        let transport = Arc::new(ScriptedTransport::new().on_get(
            "https://api.semantic.test/graph/v1/paper/DOI:10.1000/fold",
            200,
            PAPER,
        ));
        let scraper = SemanticScholarScraper::new(transport, API);

        let result = web(scraper.obtain("10.1000/fold").await);

        assert_eq!(result.doi, "10.1000/fold");
        assert_eq!(result.internal_id.as_deref(), Some("649def34"));
        assert_eq!(result.journal_title.as_deref(), Some("Cell Studies"));
        assert_eq!(result.times_cited, Some(40));
        assert_eq!(result.author_list, vec!["A. Author"]);
        assert_eq!(result.keywords, Some(vec!["Biology".to_string()]));
        assert!(result.abstract_text.is_none());
    }

    #[tokio::test]
    async fn test_keyword_search_takes_first_hit() {
        let body = format!(r#"{{"total": 2, "data": [{PAPER}]}}"#);
        let transport = Arc::new(ScriptedTransport::new().on_get(
            "https://api.semantic.test/graph/v1/paper/search",
            200,
            body,
        ));
        let scraper = SemanticScholarScraper::new(transport.clone(), API);

        let result = web(scraper.obtain("protein folding").await);

        assert_eq!(result.title, "Protein folding in vivo");
        let query = &transport.requests()[0].query;
        assert!(query.contains(&("query".into(), "protein folding".into())));
        assert!(query.contains(&("limit".into(), "1".into())));
    }

    #[tokio::test]
    async fn test_empty_search_is_absent() {
        let transport = Arc::new(ScriptedTransport::new().on_get(
            "https://api.semantic.test/graph/v1/paper/search",
            200,
            r#"{"total": 0, "data": []}"#,
        ));
        let scraper = SemanticScholarScraper::new(transport, API);

        assert!(scraper.obtain("nothing matches").await.is_nothing());
    }

    #[tokio::test]
    async fn test_unknown_doi_is_absent() {
        let scraper = SemanticScholarScraper::new(Arc::new(ScriptedTransport::new()), API);

        assert!(scraper.obtain("10.9999/none").await.is_nothing());
    }
}
