//! Query-parsing client: the single point of contact with the external
//! natural-language parsing service.
//!
//! Only `search::service` talks to it, through the `QueryParser` trait, so
//! tests can swap in a stub and failures can be routed to the keyword fallback.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::search::parsed_query::ParseQueryResult;

const MAX_RETRIES: u32 = 3;
const BACKOFF_BASE_MS: u64 = 250;
const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum NlpError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Parser error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parser reported an error: {0}")]
    Rejected(String),

    #[error("Parser unavailable after {retries} retries")]
    Unavailable { retries: u32 },

    #[error("Parser health check failed")]
    Unhealthy,

    #[error("Parser timed out after {0:?}")]
    Timeout(Duration),
}

#[async_trait]
pub trait QueryParser: Send + Sync {
    /// Structures free text into a `ParseQueryResult`.
    async fn parse(&self, text: &str) -> Result<ParseQueryResult, NlpError>;

    /// True when the service answers its health endpoint with 2xx.
    async fn health_check(&self) -> bool;
}

#[derive(Debug, Serialize)]
struct ParseRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "detail", alias = "message")]
    error: String,
}

#[derive(Clone)]
pub struct NlpClient {
    client: Client,
    base_url: String,
}

impl NlpClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl QueryParser for NlpClient {
    /// Retries on 429 and 5xx with exponential backoff.
    async fn parse(&self, text: &str) -> Result<ParseQueryResult, NlpError> {
        let url = self.endpoint("parse");
        let mut last_error: Option<NlpError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // 250ms, 500ms
                let delay = Duration::from_millis(BACKOFF_BASE_MS * (1 << (attempt - 1)));
                warn!(
                    "Parser call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(&url)
                .json(&ParseRequest { query: text })
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(NlpError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("Parser returned {}: {}", status, body);
                last_error = Some(NlpError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ErrorBody>(&body)
                    .map(|e| e.error)
                    .unwrap_or(body);
                return Err(NlpError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let result: ParseQueryResult = response.json().await?;
            if let Some(error) = result.error.as_deref().filter(|e| !e.trim().is_empty()) {
                return Err(NlpError::Rejected(error.to_string()));
            }

            debug!(
                skills_found = result.skills_found,
                applied_filters = result.applied_filters.len(),
                "Parser call succeeded"
            );
            return Ok(result);
        }

        Err(last_error.unwrap_or(NlpError::Unavailable {
            retries: MAX_RETRIES,
        }))
    }

    async fn health_check(&self) -> bool {
        match self
            .client
            .get(self.endpoint("health"))
            .timeout(HEALTH_TIMEOUT)
            .send()
            .await
        {
            Ok(r) => r.status().is_success(),
            Err(e) => {
                debug!("Parser health check failed: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> NlpClient {
        NlpClient::new(&server.uri(), Duration::from_secs(5))
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let client = NlpClient::new("http://parser:5000/", Duration::from_secs(1));
        assert_eq!(client.base_url(), "http://parser:5000");
        assert_eq!(client.endpoint("/parse"), "http://parser:5000/parse");
        assert_eq!(client.endpoint("health"), "http://parser:5000/health");
    }

    #[tokio::test]
    async fn test_parse_posts_query_and_decodes_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/parse"))
            .and(body_json(json!({"query": "python in pune"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "original_query": "python in pune",
                "parsed": {"skills": ["Python"], "location": "Pune"},
                "applied_filters": ["Skills: Python", "Location: Pune"],
                "skills_found": 1
            })))
            .mount(&server)
            .await;

        let result = client_for(&server).parse("python in pune").await.unwrap();
        assert_eq!(result.parsed.skills, vec!["Python"]);
        assert_eq!(result.parsed.location.as_deref(), Some("Pune"));
        assert_eq!(result.skills_found, 1);
    }

    #[tokio::test]
    async fn test_error_field_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/parse"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"error": "model not loaded"})),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).parse("anything").await.unwrap_err();
        assert!(matches!(err, NlpError::Rejected(msg) if msg == "model not loaded"));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/parse"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "empty query"})))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server).parse("").await.unwrap_err();
        assert!(matches!(err, NlpError::Api { status: 400, ref message } if message == "empty query"));
    }

    #[tokio::test]
    async fn test_server_errors_are_retried_then_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/parse"))
            .respond_with(ResponseTemplate::new(503).set_body_string("warming up"))
            .expect(u64::from(MAX_RETRIES))
            .mount(&server)
            .await;

        let err = client_for(&server).parse("rust").await.unwrap_err();
        assert!(matches!(err, NlpError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .mount(&server)
            .await;
        assert!(client_for(&server).health_check().await);

        let unreachable = NlpClient::new("http://127.0.0.1:9", Duration::from_millis(200));
        assert!(!unreachable.health_check().await);
    }
}
