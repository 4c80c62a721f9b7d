//! HTTP client for the Anthropic Messages API.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use super::config::ClientConfig;
use super::types::{ApiErrorBody, ApiMessage, ApiRequest, ApiResponse};
use crate::config::SecretString;
use crate::error::OracleError;
use crate::traits::{OracleRequest, TextOracle};

/// Maximum prompt length in bytes (200KB).
pub const MAX_CONTENT_LENGTH: usize = 200_000;

/// Anthropic API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic API client. One HTTP attempt per call.
pub struct AnthropicClient {
    client: Client,
    api_key: SecretString,
    config: ClientConfig,
}

impl AnthropicClient {
    /// Create a new Anthropic client.
    ///
    /// # Errors
    ///
    /// Returns [`OracleError::Network`] if the HTTP client cannot be built.
    pub fn new(api_key: SecretString, config: ClientConfig) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| OracleError::Network {
                message: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Get the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the wire request for an oracle request.
    fn to_api_request(&self, request: &OracleRequest) -> ApiRequest {
        let mut api = ApiRequest::new(
            self.config.model.clone(),
            request.max_tokens.unwrap_or(self.config.max_tokens),
            vec![ApiMessage::user(request.prompt.clone())],
        );
        if let Some(system) = &request.system_prompt {
            api = api.with_system(system.clone());
        }
        if let Some(temperature) = request.temperature {
            api = api.with_temperature(temperature);
        }
        api
    }

    fn validate_request(request: &ApiRequest) -> Result<(), OracleError> {
        let content_len: usize = request.messages.iter().map(|m| m.content.len()).sum::<usize>()
            + request.system.as_ref().map_or(0, String::len);
        if content_len > MAX_CONTENT_LENGTH {
            return Err(OracleError::InvalidRequest {
                message: format!("Prompt too large: {content_len} > {MAX_CONTENT_LENGTH}"),
            });
        }
        Ok(())
    }

    /// Send one request and return the concatenated text blocks.
    ///
    /// # Errors
    ///
    /// Maps HTTP failures to [`OracleError`]: 401 to `AuthenticationFailed`,
    /// 429 to `RateLimited`, 529 to `ModelOverloaded`, 400 to `InvalidRequest`,
    /// other non-success statuses and empty replies to `UnexpectedResponse`.
    pub async fn send(&self, request: &ApiRequest) -> Result<String, OracleError> {
        Self::validate_request(request)?;

        let url = format!("{}/messages", self.config.base_url);
        let start = Instant::now();

        tracing::debug!(
            url = %url,
            model = %request.model,
            max_tokens = request.max_tokens,
            timeout_ms = self.config.timeout_ms,
            "Starting Anthropic API request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", self.api_key.expose())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                if e.is_timeout() {
                    tracing::error!(url = %url, elapsed_ms, timeout_ms = self.config.timeout_ms, "Anthropic API request timed out");
                    OracleError::Timeout {
                        timeout_ms: self.config.timeout_ms,
                    }
                } else {
                    tracing::error!(url = %url, elapsed_ms, error = %e, "Anthropic API request failed");
                    OracleError::Network {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        tracing::debug!(
            status = %status,
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Anthropic API response received"
        );

        match status {
            StatusCode::UNAUTHORIZED => return Err(OracleError::AuthenticationFailed),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60);
                return Err(OracleError::RateLimited {
                    retry_after_seconds: retry_after,
                });
            }
            s if s.as_u16() == 529 => {
                return Err(OracleError::ModelOverloaded {
                    model: request.model.clone(),
                });
            }
            StatusCode::BAD_REQUEST => {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiErrorBody>(&body)
                    .map_or(body, |parsed| parsed.error.message);
                return Err(OracleError::InvalidRequest { message });
            }
            s if !s.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(OracleError::UnexpectedResponse {
                    message: format!("Status {s}: {body}"),
                });
            }
            _ => {}
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| OracleError::UnexpectedResponse {
                message: format!("Failed to parse response: {e}"),
            })?;

        let text = body.text();
        if text.trim().is_empty() {
            return Err(OracleError::UnexpectedResponse {
                message: "Empty response content".to_string(),
            });
        }

        tracing::debug!(
            input_tokens = body.usage.input_tokens,
            output_tokens = body.usage.output_tokens,
            stop_reason = ?body.stop_reason,
            "Anthropic API usage"
        );

        Ok(text)
    }
}

#[async_trait]
impl TextOracle for AnthropicClient {
    async fn generate(&self, request: OracleRequest) -> Result<String, OracleError> {
        let api_request = self.to_api_request(&request);
        tracing::debug!(label = %request.label, "Sending oracle request");
        self.send(&api_request).await
    }
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("api_key", &self.api_key)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_mock_client(server: &MockServer) -> AnthropicClient {
        let config = ClientConfig::default()
            .with_base_url(server.uri())
            .with_model("claude-test")
            .with_timeout_ms(5_000);
        AnthropicClient::new(SecretString::new("test-api-key"), config).unwrap()
    }

    fn success_response_body(text: &str) -> serde_json::Value {
        json!({
            "id": "msg_123",
            "content": [{"type": "text", "text": text}],
            "model": "claude-test",
            "usage": {"input_tokens": 10, "output_tokens": 20},
            "stop_reason": "end_turn"
        })
    }

    fn request() -> OracleRequest {
        OracleRequest::new("round1.turn01", "Propose a criterion")
    }

    #[test]
    fn test_client_new() {
        let client =
            AnthropicClient::new(SecretString::new("k"), ClientConfig::default()).unwrap();
        assert_eq!(client.base_url(), "https://api.anthropic.com/v1");
        assert!(!format!("{client:?}").contains("\"k\""));
    }

    #[test]
    fn test_to_api_request_maps_fields() {
        let client =
            AnthropicClient::new(SecretString::new("k"), ClientConfig::default().with_model("m"))
                .unwrap();
        let api = client.to_api_request(
            &request()
                .with_system_prompt("You are Ava")
                .with_temperature(0.5)
                .with_max_tokens(1024),
        );
        assert_eq!(api.model, "m");
        assert_eq!(api.max_tokens, 1024);
        assert_eq!(api.system.as_deref(), Some("You are Ava"));
        assert_eq!(api.temperature, Some(0.5));
        assert_eq!(api.messages, vec![ApiMessage::user("Propose a criterion")]);
    }

    #[test]
    fn test_to_api_request_uses_default_max_tokens() {
        let client = AnthropicClient::new(
            SecretString::new("k"),
            ClientConfig::default().with_max_tokens(77),
        )
        .unwrap();
        assert_eq!(client.to_api_request(&request()).max_tokens, 77);
    }

    #[tokio::test]
    async fn test_generate_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .and(header("x-api-key", "test-api-key"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .and(body_partial_json(json!({"model": "claude-test", "system": "You are Ava"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_response_body("Salary matters")))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_mock_client(&server);
        let text = client
            .generate(request().with_system_prompt("You are Ava"))
            .await
            .unwrap();
        assert_eq!(text, "Salary matters");
    }

    #[tokio::test]
    async fn test_generate_rejects_oversized_prompt() {
        let server = MockServer::start().await;
        let client = create_mock_client(&server);
        let err = client
            .generate(OracleRequest::new("x", "x".repeat(MAX_CONTENT_LENGTH + 1)))
            .await
            .unwrap_err();
        assert!(matches!(err, OracleError::InvalidRequest { .. }));
        assert!(err.to_string().contains("Prompt too large"));
    }

    #[tokio::test]
    async fn test_generate_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let err = create_mock_client(&server).generate(request()).await.unwrap_err();
        assert_eq!(err, OracleError::AuthenticationFailed);
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_generate_rate_limited_reads_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(
                ResponseTemplate::new(429)
                    .append_header("retry-after", "30")
                    .set_body_string("Rate limited"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = create_mock_client(&server).generate(request()).await.unwrap_err();
        assert_eq!(
            err,
            OracleError::RateLimited {
                retry_after_seconds: 30
            }
        );
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_generate_rate_limited_default_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = create_mock_client(&server).generate(request()).await.unwrap_err();
        assert_eq!(
            err,
            OracleError::RateLimited {
                retry_after_seconds: 60
            }
        );
    }

    #[tokio::test]
    async fn test_generate_model_overloaded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(529).set_body_string("Overloaded"))
            .mount(&server)
            .await;

        let err = create_mock_client(&server).generate(request()).await.unwrap_err();
        assert_eq!(
            err,
            OracleError::ModelOverloaded {
                model: "claude-test".into()
            }
        );
    }

    #[tokio::test]
    async fn test_generate_bad_request_uses_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "type": "error",
                "error": {"type": "invalid_request_error", "message": "temperature out of range"}
            })))
            .mount(&server)
            .await;

        let err = create_mock_client(&server).generate(request()).await.unwrap_err();
        assert_eq!(
            err,
            OracleError::InvalidRequest {
                message: "temperature out of range".into()
            }
        );
    }

    #[tokio::test]
    async fn test_generate_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;

        let err = create_mock_client(&server).generate(request()).await.unwrap_err();
        match err {
            OracleError::UnexpectedResponse { message } => {
                assert!(message.contains("500"));
                assert!(message.contains("Internal Server Error"));
            }
            e => panic!("Wrong error type: {e:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_empty_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "msg_123",
                "content": [],
                "model": "claude-test",
                "usage": {"input_tokens": 10, "output_tokens": 0},
                "stop_reason": "end_turn"
            })))
            .mount(&server)
            .await;

        let err = create_mock_client(&server).generate(request()).await.unwrap_err();
        assert!(matches!(err, OracleError::UnexpectedResponse { .. }));
    }

    #[tokio::test]
    async fn test_generate_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = create_mock_client(&server).generate(request()).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse response"));
    }

    #[tokio::test]
    async fn test_generate_network_error() {
        let config = ClientConfig::default()
            .with_base_url("http://127.0.0.1:1")
            .with_timeout_ms(1_000);
        let client = AnthropicClient::new(SecretString::new("k"), config).unwrap();
        let err = client.generate(request()).await.unwrap_err();
        assert!(err.is_retryable());
    }
}
