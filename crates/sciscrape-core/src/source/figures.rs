use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::{json, Value};
use std::sync::Arc;

use super::{join_url, Enricher};
use crate::network::{Throttle, Transport};

/// Figure thumbnails on a Semantic Scholar paper page.
pub const FIGURE_SELECTOR: &str = "li.figure-list__figure > a > figure > div > img";

/// Values of `attribute` on every element matching `selector`, in document
/// order. An unparsable selector matches nothing.
pub fn select_attributes(html: &str, selector: &str, attribute: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse(selector) else {
        tracing::warn!(selector, "Invalid CSS selector");
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attribute))
        .map(String::from)
        .collect()
}

/// Figure URLs for a paper title: a search request resolves the title to a
/// paper id, then the paper page is scraped for figure images.
pub struct SemanticFigureScraper {
    transport: Arc<dyn Transport>,
    search_url: String,
    paper_url: String,
    throttle: Throttle,
}

impl SemanticFigureScraper {
    pub fn new(
        transport: Arc<dyn Transport>,
        search_url: impl Into<String>,
        paper_url: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            search_url: search_url.into(),
            paper_url: paper_url.into(),
            throttle: Throttle::none(),
        }
    }

    #[must_use]
    pub const fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }

    async fn paper_id(&self, title: &str) -> Option<String> {
        let payload = search_payload(title);
        let response = self.transport.post_json(&self.search_url, &payload).await;
        self.throttle.pause().await;

        let response = match response {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                tracing::debug!(title, status = response.status, "Figure search returned an error status");
                return None;
            }
            Err(e) => {
                tracing::warn!(title, error = %e, "Figure search failed");
                return None;
            }
        };

        let parsed: Value = match response.json() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(title, error = %e, "Figure search response was not valid JSON");
                return None;
            }
        };
        parsed
            .get("results")?
            .get(0)?
            .get("id")?
            .as_str()
            .map(String::from)
    }

    async fn paper_page(&self, paper_id: &str) -> Option<String> {
        let url = join_url(&self.paper_url, paper_id);
        let response = self.transport.get(&url, &[]).await;
        self.throttle.pause().await;

        match response {
            Ok(response) if response.is_success() => Some(response.text()),
            Ok(response) => {
                tracing::debug!(paper_id, status = response.status, "Paper page unavailable");
                None
            }
            Err(e) => {
                tracing::warn!(paper_id, error = %e, "Paper page request failed");
                None
            }
        }
    }
}

#[async_trait]
impl Enricher<Vec<String>> for SemanticFigureScraper {
    fn name(&self) -> &str {
        "figures"
    }

    async fn lookup(&self, title: &str) -> Option<Vec<String>> {
        let paper_id = self.paper_id(title).await?;
        let page = self.paper_page(&paper_id).await?;

        let figures = select_attributes(&page, FIGURE_SELECTOR, "src");
        tracing::debug!(title, paper_id = %paper_id, figures = figures.len(), "Scraped figures");
        (!figures.is_empty()).then_some(figures)
    }
}

fn search_payload(title: &str) -> Value {
    json!({
        "queryString": title,
        "page": 1,
        "pageSize": 10,
        "sort": "relevance",
        "authors": [],
        "coAuthors": [],
        "venues": [],
        "performTitleMatch": true,
        "requireViewablePdf": false,
        "includeTldrs": false
    })
}
