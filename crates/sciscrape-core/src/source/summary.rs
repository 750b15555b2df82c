use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;

use super::{join_url, Enricher};
use crate::network::{Throttle, Transport};

#[derive(Debug, Deserialize)]
struct AbstractResponse {
    #[serde(default)]
    docs: Vec<AbstractDoc>,
}

#[derive(Debug, Deserialize)]
struct AbstractDoc {
    #[serde(rename = "abstract")]
    text: Option<String>,
}

/// Abstract text for a Dimensions publication id, fetched from
/// `<url>/<id>/abstract.json`.
pub struct SummaryScraper {
    transport: Arc<dyn Transport>,
    url: String,
    throttle: Throttle,
}

impl SummaryScraper {
    pub fn new(transport: Arc<dyn Transport>, url: impl Into<String>) -> Self {
        Self {
            transport,
            url: url.into(),
            throttle: Throttle::none(),
        }
    }

    #[must_use]
    pub const fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }
}

#[async_trait]
impl Enricher<String> for SummaryScraper {
    fn name(&self) -> &str {
        "summary"
    }

    async fn lookup(&self, internal_id: &str) -> Option<String> {
        let url = join_url(&self.url, &format!("{internal_id}/abstract.json"));
        let response = self.transport.get(&url, &[]).await;
        self.throttle.pause().await;

        let response = match response {
            Ok(response) if response.is_success() => response,
            Ok(response) => {
                tracing::debug!(internal_id, status = response.status, "No abstract available");
                return None;
            }
            Err(e) => {
                tracing::warn!(internal_id, error = %e, "Abstract request failed");
                return None;
            }
        };

        match response.json::<AbstractResponse>() {
            Ok(parsed) => parsed
                .docs
                .into_iter()
                .next()
                .and_then(|doc| doc.text)
                .filter(|text| !text.trim().is_empty()),
            Err(e) => {
                tracing::warn!(internal_id, error = %e, "Abstract response was not valid JSON");
                None
            }
        }
    }
}
