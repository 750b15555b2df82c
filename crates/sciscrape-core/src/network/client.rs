use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use super::config::{NetworkConfig, NetworkConfigError};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("Invalid network configuration: {0}")]
    Config(#[from] NetworkConfigError),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Status and raw body of one HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

/// Request/response boundary every network-backed source talks through.
///
/// A non-success status is a normal response, not an error; `Err` is
/// reserved for requests that never produced a response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, query: &[(String, String)]) -> ClientResult<HttpResponse>;

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> ClientResult<HttpResponse>;
}

/// The single reusable HTTP client of a run.
///
/// Holds no per-request state, so one instance is shared read-only by every
/// source through an `Arc<dyn Transport>`.
pub struct ScholarClient {
    config: NetworkConfig,
    inner: Client,
}

impl ScholarClient {
    pub fn new(config: NetworkConfig) -> ClientResult<Self> {
        config.validate()?;
        let inner = build_client(&config)?;
        Ok(Self { config, inner })
    }

    fn validate_request(url: &str) -> ClientResult<Url> {
        let parsed = Url::parse(url)?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::UnsupportedScheme(parsed.scheme().to_string()));
        }

        if parsed.host_str().is_none() {
            return Err(ClientError::InvalidUrl("No host in URL".to_string()));
        }

        Ok(parsed)
    }

    pub const fn config(&self) -> &NetworkConfig {
        &self.config
    }
}

#[async_trait]
impl Transport for ScholarClient {
    async fn get(&self, url: &str, query: &[(String, String)]) -> ClientResult<HttpResponse> {
        let url = Self::validate_request(url)?;

        let response = self.inner.get(url).query(query).send().await?;

        read_response(response).await
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> ClientResult<HttpResponse> {
        let url = Self::validate_request(url)?;

        let response = self.inner.post(url).json(body).send().await?;

        read_response(response).await
    }
}

async fn read_response(response: Response) -> ClientResult<HttpResponse> {
    let status = response.status().as_u16();
    let body = response.bytes().await?.to_vec();
    Ok(HttpResponse { status, body })
}

fn build_client(config: &NetworkConfig) -> ClientResult<Client> {
    let user_agent = config
        .user_agent
        .clone()
        .unwrap_or_else(random_user_agent);

    Client::builder()
        .connect_timeout(Duration::from_secs(u64::from(config.connect_timeout_seconds)))
        .timeout(Duration::from_secs(u64::from(config.request_timeout_seconds)))
        .user_agent(user_agent)
        .build()
        .map_err(ClientError::Http)
}

fn random_user_agent() -> String {
    use rand::Rng;

    let agents = [
        "Mozilla/5.0 (Windows NT 10.0; rv:128.0) Gecko/20100101 Firefox/128.0",
        "Mozilla/5.0 (Windows NT 10.0; rv:115.0) Gecko/20100101 Firefox/115.0",
        "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:128.0) Gecko/20100101 Firefox/128.0",
    ];

    let mut rng = rand::rng();
    agents[rng.random_range(0..agents.len())].to_string()
}
