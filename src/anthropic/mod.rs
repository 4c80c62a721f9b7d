//! Anthropic Messages API client.
//!
//! [`AnthropicClient`] implements [`TextOracle`](crate::traits::TextOracle)
//! with a single HTTP attempt per call. Transient failures are reported as
//! retryable [`OracleError`](crate::error::OracleError) variants and retried by
//! [`OracleCaller`](crate::caller::OracleCaller).
//!
//! # Example
//!
//! ```no_run
//! use major_advisor::anthropic::{AnthropicClient, ClientConfig};
//! use major_advisor::config::SecretString;
//!
//! let client = AnthropicClient::new(SecretString::new("sk-ant-xxx"), ClientConfig::default())
//!     .expect("client");
//! assert_eq!(client.base_url(), "https://api.anthropic.com/v1");
//! ```

mod client;
mod config;
mod types;

pub use client::{AnthropicClient, MAX_CONTENT_LENGTH};
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_TIMEOUT_MS};
pub use types::{ApiErrorBody, ApiErrorDetails, ApiMessage, ApiRequest, ApiResponse, ApiUsage, ContentBlock};
