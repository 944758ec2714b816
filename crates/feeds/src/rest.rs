//! OKX v5 REST client.
//!
//! Every OKX response is wrapped as `{"code":"0","msg":"","data":[...]}`;
//! a non-zero `code` is an API error even when the HTTP status is 200.

use crate::error::{FetchError, FetchResult};
use crate::signer::{OkxCredentials, SignedRequest};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tickerhug_core::{BalanceSnapshot, GridBotRecord, TickerQuote};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct OkxEnvelope<T> {
    code: String,
    #[serde(default)]
    msg: String,
    data: Option<Vec<T>>,
}

/// REST client for the OKX endpoints the digest reads.
#[derive(Debug, Clone)]
pub struct OkxClient {
    http: reqwest::Client,
    base_url: String,
    credentials: OkxCredentials,
}

impl OkxClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://www.okx.com";
    pub const TICKER_PATH: &'static str = "/api/v5/market/ticker";
    pub const BALANCE_PATH: &'static str = "/api/v5/account/balance";
    pub const GRID_PENDING_PATH: &'static str =
        "/api/v5/tradingBot/grid/orders-algo-pending?algoOrdType=contract_grid";

    /// Create a client. `request_timeout` bounds each individual HTTP call.
    pub fn new(
        base_url: impl Into<String>,
        credentials: OkxCredentials,
        request_timeout: Duration,
    ) -> FetchResult<Self> {
        let http = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Last trade price for one instrument (public endpoint).
    pub async fn ticker(&self, inst_id: &str) -> FetchResult<TickerQuote> {
        let quotes: Vec<TickerQuote> = self
            .get_public(Self::TICKER_PATH, &[("instId", inst_id)])
            .await?;
        quotes.into_iter().next().ok_or(FetchError::EmptyData)
    }

    /// Account equity (signed endpoint).
    pub async fn balance(&self) -> FetchResult<BalanceSnapshot> {
        let balances: Vec<BalanceSnapshot> = self.get_signed(Self::BALANCE_PATH).await?;
        balances.into_iter().next().ok_or(FetchError::EmptyData)
    }

    /// Running contract grid bots (signed endpoint). An empty list is valid.
    pub async fn pending_grid_bots(&self) -> FetchResult<Vec<GridBotRecord>> {
        self.get_signed(Self::GRID_PENDING_PATH).await
    }

    async fn get_public<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> FetchResult<Vec<T>> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, ?query, "OKX public GET");

        let response = self
            .http
            .get(&url)
            .query(query)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        Self::read_envelope(response).await
    }

    async fn get_signed<T: DeserializeOwned>(&self, path: &str) -> FetchResult<Vec<T>> {
        let url = format!("{}{}", self.base_url, path);
        // Stamp right before sending
        let request = SignedRequest::get(path);
        debug!(%url, timestamp = %request.timestamp, "OKX signed GET");

        let mut builder = self.http.get(&url);
        for (name, value) in request.auth_headers(&self.credentials) {
            builder = builder.header(name, value);
        }
        let response = builder.send().await?;

        Self::read_envelope(response).await
    }

    async fn read_envelope<T: DeserializeOwned>(response: reqwest::Response) -> FetchResult<Vec<T>> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: OkxEnvelope<T> = serde_json::from_str(&body)?;
        if envelope.code != "0" {
            return Err(FetchError::Api {
                code: envelope.code,
                msg: envelope.msg,
            });
        }

        Ok(envelope.data.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use pretty_assertions::assert_eq;

    fn client(url: &str) -> OkxClient {
        OkxClient::new(
            url,
            OkxCredentials::new("test-key", "test-secret", "test-pass"),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_ticker_parses_first_entry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v5/market/ticker")
            .match_query(Matcher::UrlEncoded("instId".into(), "BTC-USDT-SWAP".into()))
            .with_status(200)
            .with_body(r#"{"code":"0","msg":"","data":[{"instId":"BTC-USDT-SWAP","last":"65000.1"}]}"#)
            .create_async()
            .await;

        let quote = client(&server.url()).ticker("BTC-USDT-SWAP").await.unwrap();
        assert_eq!(quote, TickerQuote::new("BTC-USDT-SWAP", "65000.1"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ticker_instrument_is_query_encoded() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v5/market/ticker")
            .match_query(Matcher::UrlEncoded("instId".into(), "A&B #1".into()))
            .with_status(200)
            .with_body(r#"{"code":"0","msg":"","data":[{"instId":"A&B #1","last":"2"}]}"#)
            .create_async()
            .await;

        let quote = client(&server.url()).ticker("A&B #1").await.unwrap();
        assert_eq!(quote.last, "2");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_signed_request_sends_auth_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v5/account/balance")
            .match_header("OK-ACCESS-KEY", "test-key")
            .match_header("OK-ACCESS-PASSPHRASE", "test-pass")
            .match_header(
                "OK-ACCESS-TIMESTAMP",
                Matcher::Regex(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}\.\d{3}Z$".to_string()),
            )
            .match_header("OK-ACCESS-SIGN", Matcher::Any)
            .with_status(200)
            .with_body(r#"{"code":"0","msg":"","data":[{"totalEq":"1234.567"}]}"#)
            .create_async()
            .await;

        let balance = client(&server.url()).balance().await.unwrap();
        assert_eq!(balance.total_equity, 1234.567);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_grid_bots_empty_data() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v5/tradingBot/grid/orders-algo-pending")
            .match_query(Matcher::UrlEncoded("algoOrdType".into(), "contract_grid".into()))
            .with_status(200)
            .with_body(r#"{"code":"0","msg":"","data":[]}"#)
            .create_async()
            .await;

        let bots = client(&server.url()).pending_grid_bots().await.unwrap();
        assert!(bots.is_empty());
    }

    #[tokio::test]
    async fn test_api_error_code() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v5/account/balance")
            .with_status(200)
            .with_body(r#"{"code":"50102","msg":"Timestamp request expired","data":[]}"#)
            .create_async()
            .await;

        let err = client(&server.url()).balance().await.unwrap_err();
        assert!(matches!(err, FetchError::Api { ref code, .. } if code == "50102"));
        assert!(err.is_auth_failure());
    }

    #[tokio::test]
    async fn test_http_status_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v5/account/balance")
            .with_status(500)
            .with_body("oops")
            .create_async()
            .await;

        let err = client(&server.url()).balance().await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_empty_balance_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v5/account/balance")
            .with_status(200)
            .with_body(r#"{"code":"0","msg":"","data":[]}"#)
            .create_async()
            .await;

        let err = client(&server.url()).balance().await.unwrap_err();
        assert!(matches!(err, FetchError::EmptyData));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        assert_eq!(client("http://localhost:1234/").base_url(), "http://localhost:1234");
    }
}
