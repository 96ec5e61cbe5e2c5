use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{MeteoError, Result};

/// What came back from a GET: the status code, and the body or the reason
/// it could not be read.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: std::result::Result<Vec<u8>, String>,
}

/// The one HTTP capability providers need. Implemented for
/// [`reqwest::Client`]; tests plug in a canned double.
#[async_trait]
pub trait HttpClient: Send + Sync + Debug {
    /// Issue a GET. An `Err` here means no response arrived at all.
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

#[async_trait]
impl HttpClient for reqwest::Client {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let res = reqwest::Client::get(self, url).send().await.map_err(|e| {
            MeteoError::Transport {
                url: redact(url),
                reason: e.to_string(),
            }
        })?;

        let status = res.status().as_u16();
        let body = res
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| e.to_string());

        Ok(HttpResponse { status, body })
    }
}

pub fn default_client() -> Arc<dyn HttpClient> {
    Arc::new(reqwest::Client::new())
}

/// Perform a single GET and return the body of a 200 response.
pub async fn fetch_body(client: &dyn HttpClient, url: &str) -> Result<Vec<u8>> {
    debug!(url = %redact(url), "sending forecast request");

    let res = client.get(url).await?;
    debug!(status = res.status, "received response");

    if res.status != 200 {
        let body = match &res.body {
            Ok(bytes) => truncate_body(&String::from_utf8_lossy(bytes)),
            Err(_) => String::new(),
        };
        return Err(MeteoError::UnexpectedStatus { status: res.status, body });
    }

    let body = res.body.map_err(MeteoError::Read)?;
    debug!(bytes = body.len(), "read response body");
    Ok(body)
}

/// Strip the signature from logged URLs.
fn redact(url: &str) -> String {
    match url.find("&sig=") {
        Some(idx) => format!("{}&sig=<redacted>", &url[..idx]),
        None => url.to_string(),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}


#[cfg(test)]
mod tests {
    use super::mock::MockClient;
    use super::*;

    #[tokio::test]
    async fn returns_body_on_200() {
        let client = MockClient::respond(200, r#"{"ok":true}"#);
        let body = fetch_body(&client, "https://example.test/forecast").await.unwrap();
        assert_eq!(body, br#"{"ok":true}"#);
        assert_eq!(client.requested_urls(), vec!["https://example.test/forecast"]);
    }

    #[tokio::test]
    async fn non_200_is_unexpected_status() {
        let client = MockClient::respond(400, "Bad Request");
        let err = fetch_body(&client, "https://example.test").await.unwrap_err();
        match err {
            MeteoError::UnexpectedStatus { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "Bad Request");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn network_failure_is_transport() {
        let client = MockClient::network_error("network error");
        let err = fetch_body(&client, "https://example.test").await.unwrap_err();
        assert!(matches!(err, MeteoError::Transport { .. }));
    }

    #[tokio::test]
    async fn unreadable_body_is_read_error() {
        let client = MockClient::unreadable_body(200);
        let err = fetch_body(&client, "https://example.test").await.unwrap_err();
        assert!(matches!(err, MeteoError::Read(_)));
    }

    #[test]
    fn redacts_signature() {
        assert_eq!(
            redact("https://my.meteoblue.com/packages/basic-1h?lat=1&sig=abcdef"),
            "https://my.meteoblue.com/packages/basic-1h?lat=1&sig=<redacted>"
        );
        assert_eq!(redact("https://x.test/?a=1"), "https://x.test/?a=1");
    }

    #[test]
    fn truncates_long_bodies() {
        let long = "x".repeat(300);
        let truncated = truncate_body(&long);
        assert_eq!(truncated.len(), 203);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncate_body("short"), "short");
    }
}
