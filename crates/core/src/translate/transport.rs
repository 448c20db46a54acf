use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::collections::BTreeMap;
use url::Url;

#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    /// Raw response body, kept for diagnostics.
    pub body: String,
    /// Body decoded as JSON, if it was JSON.
    pub data: Option<Value>,
}

impl HttpResponse {
    pub fn json(status: u16, data: Value) -> Self {
        Self {
            status,
            status_text: canonical_reason(status).to_owned(),
            body: data.to_string(),
            data: Some(data),
        }
    }

    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

fn canonical_reason(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or_default()
}

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("HTTP {status}{}", status_detail(.status_text, .body))]
    Status {
        status: u16,
        status_text: String,
        body: Option<String>,
    },
    #[error("request failed: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),
}

fn status_detail(status_text: &str, body: &Option<String>) -> String {
    let mut detail = String::new();
    if !status_text.is_empty() {
        detail.push_str(" - ");
        detail.push_str(status_text);
    }
    if let Some(body) = body {
        detail.push_str(": ");
        detail.push_str(body);
    }
    detail
}

/// The single HTTP call a translator makes. Hosts inject their own
/// implementation; `ReqwestTransport` is the default.
pub trait HttpTransport: Send + Sync {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, TransportError>>;
}

#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse, TransportError>> {
        async move {
            let mut builder = self.client.request(request.method, request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }

            let response = builder
                .json(&request.body)
                .send()
                .await
                .map_err(|e| TransportError::Network(Box::new(e)))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| TransportError::Network(Box::new(e)))?;
            let data = serde_json::from_str(&body).ok();

            Ok(HttpResponse {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_owned(),
                body,
                data,
            })
        }
        .boxed()
    }
}
