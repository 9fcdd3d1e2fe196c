//! HTTP bank loader.
//!
//! Fetches the bank once with caching disabled. Any non-2xx status is a load
//! error; nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use tracing::instrument;

use analogy_core::error::BankError;
use analogy_core::model::Bank;
use analogy_core::parser::parse_bank_str;
use analogy_core::traits::BankLoader;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Fetches the bank document over HTTP(S).
pub struct HttpBankLoader {
    url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl HttpBankLoader {
    pub fn new(url: &str, timeout_secs: Option<u64>) -> Result<Self, BankError> {
        let timeout_secs = timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| BankError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            url: url.to_string(),
            timeout_secs,
            client,
        })
    }
}

#[async_trait]
impl BankLoader for HttpBankLoader {
    fn describe(&self) -> String {
        self.url.clone()
    }

    #[instrument(skip(self), fields(url = %self.url))]
    async fn load(&self) -> Result<Bank, BankError> {
        let response = self
            .client
            .get(&self.url)
            .header("Cache-Control", "no-cache, no-store")
            .header("Pragma", "no-cache")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BankError::Timeout(self.timeout_secs)
                } else {
                    BankError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BankError::Http {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| BankError::Network(e.to_string()))?;
        let bank = parse_bank_str(&body)?;
        tracing::info!(items = bank.len(), version = ?bank.version(), "bank fetched");
        Ok(bank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn successful_fetch_bypasses_cache() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "meta": { "bank_version": "2024-06-a" },
            "items": [
                { "ITEM_ID": "ITEM_1", "ITEM_TYPE": "FIXED", "ANSWER_KEY": "B" },
                { "ITEM_ID": "ITEM_2", "ITEM_TYPE": "ROTATION" }
            ]
        });

        Mock::given(method("GET"))
            .and(path("/data/analogies_items_private.json"))
            .and(header("Cache-Control", "no-cache, no-store"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/data/analogies_items_private.json", server.uri());
        let loader = HttpBankLoader::new(&url, None).unwrap();
        let bank = loader.load().await.unwrap();
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.version(), Some("2024-06-a"));
        assert_eq!(loader.describe(), url);
    }

    #[tokio::test]
    async fn not_found_is_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let loader = HttpBankLoader::new(&format!("{}/bank.json", server.uri()), None).unwrap();
        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, BankError::Http { status: 404, .. }));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn server_error_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let loader = HttpBankLoader::new(&format!("{}/bank.json", server.uri()), None).unwrap();
        let err = loader.load().await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn malformed_body_is_parse_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let loader = HttpBankLoader::new(&server.uri(), None).unwrap();
        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, BankError::Parse(_)));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{}")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let loader = HttpBankLoader::new(&server.uri(), Some(1)).unwrap();
        let err = loader.load().await.unwrap_err();
        assert!(matches!(err, BankError::Timeout(1)));
    }
}
