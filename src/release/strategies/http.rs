//! Request helpers shared by the strategies

use serde::de::DeserializeOwned;
use tracing::warn;
use url::Url;

use crate::release::error::FetchError;
use crate::release::strategy::FetchContext;
use crate::release::transport::{HttpRequest, HttpResponse};

/// Executes a request and requires a success status
pub async fn send(ctx: &FetchContext<'_>, request: HttpRequest) -> Result<HttpResponse, FetchError> {
    let url = request.url.clone();
    let response = ctx.transport.execute(request).await.map_err(|e| {
        warn!("Request to {} failed: {}", url, e);
        FetchError::from(e)
    })?;

    if !response.is_success() {
        warn!("{} returned status {}", url, response.status);
        return Err(FetchError::Unavailable(format!(
            "Unexpected status {} from {}",
            response.status, url
        )));
    }

    Ok(response)
}

/// Executes a request and decodes the JSON body
pub async fn send_json<T: DeserializeOwned>(
    ctx: &FetchContext<'_>,
    request: HttpRequest,
) -> Result<T, FetchError> {
    let url = request.url.clone();
    let response = send(ctx, request).await?;
    serde_json::from_str(&response.body).map_err(|e| {
        warn!("Failed to parse response from {}: {}", url, e);
        FetchError::Parse(format!("{url}: {e}"))
    })
}

/// Joins a base URL and a path; the base may or may not end with a slash
pub fn join(base_url: &str, path: &str) -> Result<Url, FetchError> {
    let joined = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    parse_url(&joined)
}

/// Parses a URL found in (or built from) upstream data
pub fn parse_url(url: &str) -> Result<Url, FetchError> {
    Url::parse(url).map_err(|e| FetchError::Parse(format!("Invalid URL {url:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::error::TransportError;
    use crate::release::transport::MockTransport;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Debug, Deserialize)]
    struct Manifest {
        version: String,
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: body.to_string(),
        }
    }

    fn request() -> HttpRequest {
        HttpRequest::get(Url::parse("https://example.com/manifest.json").unwrap())
    }

    #[tokio::test]
    async fn send_json_decodes_successful_response() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .returning(|_| Ok(response(200, r#"{"version": "1.2.3"}"#)));

        let manifest: Manifest = send_json(&FetchContext::new(&transport), request())
            .await
            .unwrap();

        assert_eq!(manifest.version, "1.2.3");
    }

    #[tokio::test]
    async fn send_json_maps_malformed_body_to_parse_failure() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .returning(|_| Ok(response(200, "<html>maintenance</html>")));

        let result: Result<Manifest, _> = send_json(&FetchContext::new(&transport), request()).await;

        assert!(matches!(result, Err(FetchError::Parse(_))));
    }

    #[tokio::test]
    async fn send_maps_error_status_to_unavailable() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .returning(|_| Ok(response(503, "")));

        let result = send(&FetchContext::new(&transport), request()).await;

        assert!(matches!(result, Err(FetchError::Unavailable(_))));
    }

    #[tokio::test]
    async fn send_maps_transport_error_to_unavailable() {
        let mut transport = MockTransport::new();
        transport.expect_execute().returning(|_| {
            let client_error = reqwest::Client::new().get("not a url").build().unwrap_err();
            Err(TransportError::Network(client_error))
        });

        let result = send(&FetchContext::new(&transport), request()).await;

        assert!(matches!(result, Err(FetchError::Unavailable(_))));
    }

    #[test]
    fn join_handles_slashes() {
        assert_eq!(
            join("https://api.github.com/", "/repos/a/b").unwrap().as_str(),
            "https://api.github.com/repos/a/b"
        );
        assert_eq!(
            join("http://127.0.0.1:1234", "x.json").unwrap().as_str(),
            "http://127.0.0.1:1234/x.json"
        );
    }
}
