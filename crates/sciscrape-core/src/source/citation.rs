use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;

use super::Enricher;
use crate::network::{Throttle, Transport};

/// Citation style understood by the formatting service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    Apa,
    Mla,
    Chicago,
}

impl Style {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Apa => "apa",
            Self::Mla => "modern-language-association",
            Self::Chicago => "chicago-fullnote-bibliography",
        }
    }
}

impl FromStr for Style {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "apa" => Ok(Self::Apa),
            "mla" | "modern-language-association" => Ok(Self::Mla),
            "chicago" | "chicago-fullnote-bibliography" => Ok(Self::Chicago),
            other => Err(format!("Unknown citation style: {other}")),
        }
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formatted reference for a DOI, from a citation formatting service.
pub struct CitationScraper {
    transport: Arc<dyn Transport>,
    url: String,
    style: Style,
    lang: String,
    throttle: Throttle,
}

impl CitationScraper {
    pub fn new(transport: Arc<dyn Transport>, url: impl Into<String>) -> Self {
        Self {
            transport,
            url: url.into(),
            style: Style::default(),
            lang: "en-US".into(),
            throttle: Throttle::none(),
        }
    }

    #[must_use]
    pub const fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub const fn with_throttle(mut self, throttle: Throttle) -> Self {
        self.throttle = throttle;
        self
    }
}

#[async_trait]
impl Enricher<String> for CitationScraper {
    fn name(&self) -> &str {
        "citation"
    }

    async fn lookup(&self, doi: &str) -> Option<String> {
        let params = vec![
            ("doi".to_string(), doi.to_string()),
            ("style".to_string(), self.style.as_str().to_string()),
            ("lang".to_string(), self.lang.clone()),
        ];

        let response = self.transport.get(&self.url, &params).await;
        self.throttle.pause().await;

        match response {
            Ok(response) if response.is_success() => {
                let text = response.text();
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            }
            Ok(response) => {
                tracing::debug!(doi, status = response.status, "No citation available");
                None
            }
            Err(e) => {
                tracing::warn!(doi, error = %e, "Citation request failed");
                None
            }
        }
    }
}
