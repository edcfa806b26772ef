//! Inference endpoint client
//!
//! Handles communication with the remote multimodal endpoint:
//! - chat-completions request shape (image parts + one text instruction)
//! - bounded retry with exponential backoff
//! - normalization of the endpoint's loosely specified response shapes
//!
//! The endpoint contract does not pin down what `predictions` looks like:
//! deployments have returned a bare string, a list with one element, and a
//! chat-completions object. `normalize_predictions` handles all of them
//! with explicit cases rather than probing.

use crate::config::AnalyzerConfig;
use crate::error::ServiceError;
use async_trait::async_trait;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;

/// One part of the request message: image parts first, then the single
/// text instruction.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrlContent },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrlContent {
    pub url: String,
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Image part carrying an inline `data:` URI.
    pub fn image_data_url(mime: &str, base64_payload: &str) -> Self {
        Self::ImageUrl {
            image_url: ImageUrlContent {
                url: format!("data:{mime};base64,{base64_payload}"),
            },
        }
    }
}

/// Bounded retry with exponential backoff, applied around a call site.
///
/// Defaults mirror the endpoint's observed failure pattern: five attempts,
/// waits of 2s, 4s, 8s capped at 10s.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            min_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay before retrying after the given 1-based failed attempt.
    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = Duration::from_secs(2u64.saturating_pow(attempt));
        exp.clamp(self.min_delay, self.max_delay)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or
    /// the attempt budget is spent. The last error is returned as-is.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, ServiceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let mut attempt = 1u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= self.max_attempts || !err.is_retryable() {
                        return Err(err);
                    }
                    let delay = self.backoff_delay(attempt);
                    tracing::warn!(
                        "inference attempt {}/{} failed: {} - retrying in {:?}",
                        attempt,
                        self.max_attempts,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// The operation the orchestrator needs from an inference service.
/// Abstracted so the progressive loop can be driven by a scripted
/// implementation in tests.
#[async_trait]
pub trait InferenceBackend {
    /// Send one message of content parts and return the normalized text.
    async fn generate(
        &self,
        parts: Vec<ContentPart>,
        max_output_tokens: u32,
    ) -> Result<String, ServiceError>;
}

/// HTTP client for the inference endpoint, constructed once per run.
pub struct EndpointClient {
    client: reqwest::Client,
    config: AnalyzerConfig,
    retry: RetryPolicy,
}

impl EndpointClient {
    pub fn new(config: AnalyzerConfig) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            config,
            retry: RetryPolicy::default(),
        })
    }

    #[allow(dead_code)]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// One unretried call: POST, status check, normalize.
    async fn call_once(&self, body: &serde_json::Value) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(&self.config.endpoint_url)
            .header("Authorization", format!("Bearer {}", self.config.api_token))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Http { status, body });
        }

        let value: serde_json::Value = response.json().await?;
        normalize_predictions(value.get("predictions").unwrap_or(&serde_json::Value::Null))
    }
}

#[async_trait]
impl InferenceBackend for EndpointClient {
    async fn generate(
        &self,
        parts: Vec<ContentPart>,
        max_output_tokens: u32,
    ) -> Result<String, ServiceError> {
        let body = serde_json::json!({
            "instances": [{
                "@requestFormat": "chatCompletions",
                "messages": [{ "role": "user", "content": parts }],
                "max_tokens": max_output_tokens,
                "temperature": self.config.temperature,
            }]
        });

        self.retry.run(|| self.call_once(&body)).await
    }
}

/// Normalize the endpoint's `predictions` field into a single text result.
///
/// Cases, in order: a list is reduced to its first element; an object with
/// a `choices` field yields `choices[0].message.content`; an object
/// without one is serialized whole; a string passes through; any other
/// scalar is rendered with its display form. Missing, empty, or
/// whitespace-only results are an empty response, which the retry policy
/// treats as transient.
fn normalize_predictions(predictions: &serde_json::Value) -> Result<String, ServiceError> {
    use serde_json::Value;

    let first = match predictions {
        Value::Null => return Err(ServiceError::EmptyResponse),
        Value::Array(items) => items.first().ok_or(ServiceError::EmptyResponse)?,
        other => other,
    };

    let text = match first {
        Value::Object(map) if map.contains_key("choices") => first
            .pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .map(str::to_string)
            .ok_or(ServiceError::EmptyResponse)?,
        Value::Object(_) => serde_json::to_string_pretty(first).unwrap_or_default(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    if text.trim().is_empty() {
        return Err(ServiceError::EmptyResponse);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            min_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        }
    }

    #[test]
    fn test_backoff_delay_is_exponential_and_capped() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_delay(1), Duration::from_secs(2));
        assert_eq!(policy.backoff_delay(2), Duration::from_secs(4));
        assert_eq!(policy.backoff_delay(3), Duration::from_secs(8));
        assert_eq!(policy.backoff_delay(4), Duration::from_secs(10));
        assert_eq!(policy.backoff_delay(9), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_retry_succeeds_on_first_attempt() {
        let calls = AtomicU32::new(0);
        let result = fast_policy(5)
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, ServiceError>("report text") }
            })
            .await;
        assert_eq!(result.unwrap(), "report text");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_exhausts_attempt_budget() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = fast_policy(5)
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(ServiceError::EmptyResponse) }
            })
            .await;
        assert!(matches!(result, Err(ServiceError::EmptyResponse)));
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_retry_recovers_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = fast_policy(5)
            .run(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(ServiceError::EmptyResponse)
                    } else {
                        Ok("recovered")
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_stops_on_non_retryable_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = fast_policy(5)
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    Err(ServiceError::Http {
                        status: reqwest::StatusCode::UNAUTHORIZED,
                        body: "bad token".to_string(),
                    })
                }
            })
            .await;
        assert!(matches!(result, Err(ServiceError::Http { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_normalize_choices_shape() {
        let predictions = json!([{
            "choices": [{ "message": { "content": "X" } }]
        }]);
        assert_eq!(normalize_predictions(&predictions).unwrap(), "X");
    }

    #[test]
    fn test_normalize_bare_string() {
        assert_eq!(normalize_predictions(&json!("Y")).unwrap(), "Y");
        assert_eq!(normalize_predictions(&json!(["Z"])).unwrap(), "Z");
    }

    #[test]
    fn test_normalize_mapping_without_choices() {
        let predictions = json!([{ "output": "findings" }]);
        let text = normalize_predictions(&predictions).unwrap();
        assert!(text.contains("\"output\""));
        assert!(text.contains("\"findings\""));
    }

    #[test]
    fn test_normalize_empty_is_retryable_error() {
        for predictions in [json!(null), json!([]), json!(""), json!(["   "])] {
            let err = normalize_predictions(&predictions).unwrap_err();
            assert!(matches!(err, ServiceError::EmptyResponse));
            assert!(err.is_retryable());
        }
    }

    #[test]
    fn test_normalize_malformed_choices_is_empty_response() {
        let predictions = json!([{ "choices": [] }]);
        assert!(matches!(
            normalize_predictions(&predictions),
            Err(ServiceError::EmptyResponse)
        ));
    }

    #[test]
    fn test_content_part_wire_shape() {
        let part = ContentPart::image_data_url("image/png", "QUJD");
        let value = serde_json::to_value(&part).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "image_url",
                "image_url": { "url": "data:image/png;base64,QUJD" }
            })
        );

        let text = serde_json::to_value(ContentPart::text("hello")).unwrap();
        assert_eq!(text, json!({ "type": "text", "text": "hello" }));
    }
}
