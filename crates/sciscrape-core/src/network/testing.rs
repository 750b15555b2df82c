//! In-memory transport for exercising sources without a network.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use super::client::{ClientError, ClientResult, HttpResponse, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

/// Answers requests by exact (method, url); unknown routes get a 404.
/// Routes registered with `fail_*` produce a transport error instead.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: HashMap<(Method, String), HttpResponse>,
    failures: Vec<(Method, String)>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_get(mut self, url: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.routes
            .insert((Method::Get, url.to_string()), HttpResponse::new(status, body));
        self
    }

    pub fn on_post(mut self, url: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.routes
            .insert((Method::Post, url.to_string()), HttpResponse::new(status, body));
        self
    }

    pub fn fail_get(mut self, url: &str) -> Self {
        self.failures.push((Method::Get, url.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn count(&self, method: Method, url: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }

    fn answer(&self, request: RecordedRequest) -> ClientResult<HttpResponse> {
        let key = (request.method, request.url.clone());
        if let Ok(mut log) = self.requests.lock() {
            log.push(request);
        }

        if self.failures.contains(&key) {
            return Err(ClientError::InvalidUrl(format!("scripted failure: {}", key.1)));
        }

        Ok(self
            .routes
            .get(&key)
            .cloned()
            .unwrap_or_else(|| HttpResponse::new(404, "not found")))
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str, query: &[(String, String)]) -> ClientResult<HttpResponse> {
        self.answer(RecordedRequest {
            method: Method::Get,
            url: url.to_string(),
            query: query.to_vec(),
            body: None,
        })
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> ClientResult<HttpResponse> {
        self.answer(RecordedRequest {
            method: Method::Post,
            url: url.to_string(),
            query: Vec::new(),
            body: Some(body.clone()),
        })
    }
}
