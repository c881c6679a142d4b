//! HTTP transport seam
//!
//! Connection pooling, proxying and TLS trust live behind [`Transport`]; the
//! strategies only build requests and read responses.

use std::collections::HashMap;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

use reqwest::Method;
use tracing::debug;
use url::Url;

use crate::config::TransportConfig;
use crate::release::error::TransportError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: Vec::new(),
        }
    }

    pub fn head(url: Url) -> Self {
        Self {
            method: Method::HEAD,
            url,
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Header names are lowercase
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Trait for executing HTTP requests
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport backed by a shared reqwest client
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_millis(config.timeout_ms));

        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!("{} {}", request.method, request.url);

        let mut builder = self.client.request(request.method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn transport() -> ReqwestTransport {
        ReqwestTransport::new(&TransportConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn execute_returns_status_headers_and_body() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/manifest.json")
            .match_header("x-test", "1")
            .with_status(200)
            .with_header("Last-Modified", "Tue, 01 Oct 2024 10:00:00 GMT")
            .with_body(r#"{"version": "1.0.0"}"#)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/manifest.json", server.url())).unwrap();
        let response = transport()
            .execute(HttpRequest::get(url).header("x-test", "1"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(response.is_success());
        assert_eq!(
            response.header("last-modified"),
            Some("Tue, 01 Oct 2024 10:00:00 GMT")
        );
        assert_eq!(response.body, r#"{"version": "1.0.0"}"#);
    }

    #[tokio::test]
    async fn execute_passes_non_success_status_through() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("HEAD", "/missing.apk")
            .with_status(404)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/missing.apk", server.url())).unwrap();
        let response = transport().execute(HttpRequest::head(url)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 404);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn execute_returns_network_error_for_unreachable_host() {
        let url = Url::parse("http://invalid.localhost.test:9/").unwrap();
        let result = transport().execute(HttpRequest::get(url)).await;

        assert!(matches!(result, Err(TransportError::Network(_))));
    }
}
