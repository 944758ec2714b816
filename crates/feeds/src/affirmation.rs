//! Affirmation source used to fill the digest when no bot is running.

use crate::error::{FetchError, FetchResult};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct AffirmationResponse {
    affirmation: String,
}

/// Client for an unauthenticated `GET` returning `{"affirmation": "..."}`.
#[derive(Debug, Clone)]
pub struct AffirmationClient {
    http: reqwest::Client,
    url: String,
}

impl AffirmationClient {
    pub const DEFAULT_URL: &'static str = "https://www.affirmations.dev/";

    pub fn new(url: impl Into<String>, request_timeout: Duration) -> FetchResult<Self> {
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub async fn fetch(&self) -> FetchResult<String> {
        debug!(url = %self.url, "Fetching affirmation");
        let response = self.http.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: AffirmationResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))?;
        Ok(parsed.affirmation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_fetch_affirmation() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"affirmation":"You got this"}"#)
            .create_async()
            .await;

        let client = AffirmationClient::new(server.url(), Duration::from_secs(5)).unwrap();
        assert_eq!(client.fetch().await.unwrap(), "You got this");
    }

    #[tokio::test]
    async fn test_missing_field_is_parse_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .with_status(200)
            .with_body(r#"{"quote":"nope"}"#)
            .create_async()
            .await;

        let client = AffirmationClient::new(server.url(), Duration::from_secs(5)).unwrap();
        assert!(matches!(client.fetch().await, Err(FetchError::Parse(_))));
    }
}
