//! Remote exchange-rate source.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;

use crate::utils::url::rates_endpoint;

/// Failures while fetching a rate table.
#[derive(Debug)]
pub enum FetchError {
    /// The HTTP request could not be sent or the connection failed.
    Request(reqwest::Error),

    /// The rate API answered with a non-success status.
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// The response body was not the expected `{ "rates": { ... } }` shape.
    Decode(String),

    /// The payload decoded but violates rate table invariants.
    InvalidTable(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Request(err) => write!(f, "Rate request failed: {err}"),
            FetchError::Status { status, body } => {
                write!(f, "Rate API returned status {status}: {body}")
            }
            FetchError::Decode(reason) => write!(f, "Malformed rate payload: {reason}"),
            FetchError::InvalidTable(reason) => write!(f, "Invalid rate table: {reason}"),
        }
    }
}

impl StdError for FetchError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            FetchError::Request(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Request(err)
        }
    }
}

/// Wire shape of the rate API response. Extra fields are ignored.
#[derive(Debug, Deserialize)]
pub struct RatesResponse {
    pub rates: BTreeMap<String, f64>,
}

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetch the latest rates quoted against `base` (1 base = rate units).
    async fn fetch(&self, base: &str) -> Result<BTreeMap<String, f64>, FetchError>;
}

pub struct HttpRateSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRateSource {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn fetch(&self, base: &str) -> Result<BTreeMap<String, f64>, FetchError> {
        let url = rates_endpoint(&self.base_url, base);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FetchError::Status { status, body });
        }

        let body = response.text().await?;
        parse_rates_payload(&body)
    }
}

/// Decode a rate API body into its rate map.
pub fn parse_rates_payload(body: &str) -> Result<BTreeMap<String, f64>, FetchError> {
    let payload: RatesResponse =
        serde_json::from_str(body).map_err(|err| FetchError::Decode(err.to_string()))?;
    Ok(payload.rates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_expected_payload_and_ignores_extra_fields() {
        let body = r#"{
            "provider": "https://www.exchangerate-api.com",
            "base": "EUR",
            "time_last_updated": 1700000000,
            "rates": { "EUR": 1, "USD": 1.0841, "JPY": 161.2 }
        }"#;

        let rates = parse_rates_payload(body).expect("payload should parse");
        assert_eq!(rates.len(), 3);
        assert_eq!(rates.get("USD"), Some(&1.0841));
        assert_eq!(rates.get("EUR"), Some(&1.0));
    }

    #[test]
    fn rejects_payload_without_rates() {
        let err = parse_rates_payload(r#"{"result":"error","error-type":"unsupported-code"}"#)
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
        assert!(err.to_string().starts_with("Malformed rate payload"));
    }

    #[test]
    fn rejects_non_numeric_rates() {
        let err = parse_rates_payload(r#"{"rates":{"USD":"1.1"}}"#).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    async fn read_request_line(stream: &mut tokio::net::TcpStream) -> String {
        use tokio::io::AsyncReadExt;

        let mut request = Vec::new();
        let mut chunk = [0_u8; 1024];
        while !request.windows(4).any(|window| window == b"\r\n\r\n") {
            let read = stream.read(&mut chunk).await.expect("request should be readable");
            if read == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..read]);
        }
        String::from_utf8_lossy(&request)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    }

    /// Serve a single canned response and report the request line seen.
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::AsyncWriteExt;
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let addr = listener.local_addr().expect("local addr should resolve");

        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.expect("client should connect");
            let request_line = read_request_line(&mut stream).await;
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream
                .write_all(response.as_bytes())
                .await
                .expect("response should be written");
            stream.shutdown().await.ok();
            request_line
        });

        (format!("http://{addr}/v4/latest/"), server)
    }

    #[tokio::test]
    async fn http_source_returns_rates_for_base() {
        let (base_url, server) =
            serve_once("200 OK", r#"{"base":"EUR","rates":{"EUR":1,"USD":1.1}}"#).await;
        let source = HttpRateSource::new(reqwest::Client::new(), base_url);

        let rates = source.fetch("eur").await.expect("fetch should succeed");
        assert_eq!(rates.get("USD"), Some(&1.1));

        let request_line = server.await.expect("server task should finish");
        assert!(request_line.starts_with("GET /v4/latest/EUR "), "{request_line}");
    }

    #[tokio::test]
    async fn http_source_reports_error_status_with_body() {
        let (base_url, server) =
            serve_once("503 Service Unavailable", r#"{"error":"maintenance"}"#).await;
        let source = HttpRateSource::new(reqwest::Client::new(), base_url);

        let err = source.fetch("EUR").await.unwrap_err();
        match &err {
            FetchError::Status { status, body } => {
                assert_eq!(*status, reqwest::StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, r#"{"error":"maintenance"}"#);
            }
            other => panic!("expected status error, got {other:?}"),
        }
        assert!(err.to_string().starts_with("Rate API returned status 503"));
        server.await.expect("server task should finish");
    }

    #[tokio::test]
    async fn http_source_rejects_malformed_success_body() {
        let (base_url, server) = serve_once("200 OK", "<html>rate limited</html>").await;
        let source = HttpRateSource::new(reqwest::Client::new(), base_url);

        let err = source.fetch("EUR").await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)), "{err:?}");
        server.await.expect("server task should finish");
    }

    #[tokio::test]
    async fn http_source_maps_connection_failure_to_request_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("listener should bind");
        let addr = listener.local_addr().expect("local addr should resolve");
        drop(listener);

        let source = HttpRateSource::new(reqwest::Client::new(), format!("http://{addr}"));
        let err = source.fetch("EUR").await.unwrap_err();
        assert!(matches!(err, FetchError::Request(_)), "{err:?}");
        assert!(err.source().is_some());
    }
}
