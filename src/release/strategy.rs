//! Strategy trait for reading the latest release from one upstream channel

use url::Url;

use crate::release::artifact::ReleaseCandidate;
use crate::release::error::FetchError;
use crate::release::transport::{HttpRequest, Transport};

/// Collaborators a strategy may use while fetching
pub struct FetchContext<'a> {
    pub transport: &'a dyn Transport,
}

impl<'a> FetchContext<'a> {
    pub fn new(transport: &'a dyn Transport) -> Self {
        Self { transport }
    }
}

/// Trait for fetching the latest release of one application
///
/// Implementations only know how to read their own upstream. They list every
/// artifact they find, tagged with its ABI; picking one for the device and
/// judging staleness happen afterwards.
#[async_trait::async_trait]
pub trait FetchStrategy: Send + Sync {
    /// Short name of the upstream integration, used in logs
    fn name(&self) -> &'static str;

    /// Fetches the latest release
    ///
    /// # Returns
    /// * `Ok(ReleaseCandidate)` - Version text, publish time and all known artifacts
    /// * `Err(FetchError::Unavailable)` - Transport failure or non-success status
    /// * `Err(FetchError::Parse)` - The response lacks the expected data
    async fn fetch_latest(&self, ctx: &FetchContext<'_>) -> Result<ReleaseCandidate, FetchError>;
}

/// Checks that a download URL answers a `HEAD` request with a success status
pub async fn verify_download(transport: &dyn Transport, url: &Url) -> Result<(), FetchError> {
    let response = transport.execute(HttpRequest::head(url.clone())).await?;
    if response.is_success() {
        Ok(())
    } else {
        Err(FetchError::Unavailable(format!(
            "Download {} answered with status {}",
            url, response.status
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::transport::{HttpResponse, MockTransport};
    use reqwest::Method;
    use std::collections::HashMap;

    fn response(status: u16) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: String::new(),
        }
    }

    #[tokio::test]
    async fn verify_download_sends_head_and_accepts_success() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|req| req.method == Method::HEAD && req.url.path() == "/app.apk")
            .times(1)
            .returning(|_| Ok(response(200)));

        let url = Url::parse("https://example.com/app.apk").unwrap();
        assert!(verify_download(&transport, &url).await.is_ok());
    }

    #[tokio::test]
    async fn verify_download_rejects_error_status() {
        let mut transport = MockTransport::new();
        transport.expect_execute().returning(|_| Ok(response(404)));

        let url = Url::parse("https://example.com/app.apk").unwrap();
        let result = verify_download(&transport, &url).await;

        assert!(matches!(result, Err(FetchError::Unavailable(_))));
    }
}
