//! AI 提供方
//!
//! `AiProvider` 封装单个大模型 API，`AiClient` 负责主备切换。

pub mod anthropic;
pub mod client;
pub mod openai;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::{CourseGenError, Result};

pub use anthropic::AnthropicProvider;
pub use client::AiClient;
pub use openai::OpenAiProvider;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// 要求模型只输出 JSON
    pub json_mode: bool,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            temperature: 0.7,
            max_tokens: 4096,
            json_mode: false,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    pub provider: String,
    pub model: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[async_trait]
pub trait AiProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, request: &CompletionRequest) -> Result<Completion>;

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn supports_embeddings(&self) -> bool {
        true
    }
}

/// 非 2xx 响应转换为错误：429 限流，5xx 不可用，其余为调用错误
pub(crate) async fn check_provider_response(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let body = crate::utils::excerpt(&body);
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        Err(CourseGenError::ai_rate_limited(format!(
            "{provider} rate limited (HTTP 429): {body}"
        )))
    } else if status.is_server_error() {
        Err(CourseGenError::ai_unavailable(format!(
            "{provider} returned HTTP {status}: {body}"
        )))
    } else {
        Err(CourseGenError::ai_provider(format!(
            "{provider} returned HTTP {status}: {body}"
        )))
    }
}

/// 限流、网络错误和 5xx 按指数退避重试
pub(crate) async fn with_retries<T, F, Fut>(max_retries: u32, mut call: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_retries && is_retryable(&e) => {
                let delay = backoff_delay(attempt);
                tracing::debug!("Retrying AI call in {:?} after error: {}", delay, e);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// 单次退避的上限
const MAX_BACKOFF_MS: u64 = 30_000;

/// 指数退避加随机抖动，封顶 `MAX_BACKOFF_MS`
fn backoff_delay(attempt: u32) -> Duration {
    let base = 500u64
        .saturating_mul(2u64.saturating_pow(attempt))
        .min(MAX_BACKOFF_MS);
    Duration::from_millis(base + rand::random_range(0..250))
}

fn is_retryable(err: &CourseGenError) -> bool {
    matches!(
        err,
        CourseGenError::AiRateLimited(_)
            | CourseGenError::AiUnavailable(_)
            | CourseGenError::HttpClient(_)
    )
}

/// 从模型输出中提取 JSON：原样 JSON、```json 代码块、或夹在文字中的第一个对象 / 数组
pub fn extract_json(text: &str) -> Result<serde_json::Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        // 跳过语言标记所在的行
        let body_start = after.find('\n').map(|i| i + 1).unwrap_or(0);
        let body = &after[body_start..];
        if let Some(end) = body.find("```")
            && let Ok(value) = serde_json::from_str(body[..end].trim())
        {
            return Ok(value);
        }
    }

    for (open, close) in [('{', '}'), ('[', ']')] {
        if let (Some(start), Some(end)) = (trimmed.find(open), trimmed.rfind(close))
            && start < end
            && let Ok(value) = serde_json::from_str(&trimmed[start..=end])
        {
            return Ok(value);
        }
    }

    Err(CourseGenError::serialization(format!(
        "No JSON found in model output: {}",
        crate::utils::excerpt(trimmed)
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_extract_raw_json() {
        let value = extract_json(r#"  {"chapters": []} "#).unwrap();
        assert!(value["chapters"].is_array());
    }

    #[test]
    fn test_extract_fenced_json() {
        let text = "Here is the outline:\n```json\n{\"title\": \"Intro\"}\n```\nEnjoy!";
        assert_eq!(extract_json(text).unwrap()["title"], "Intro");
    }

    #[test]
    fn test_extract_embedded_json() {
        let text = "Sure! {\"cards\": [{\"front\": \"a\"}]} Let me know.";
        assert_eq!(extract_json(text).unwrap()["cards"][0]["front"], "a");

        let text = "Questions: [1, 2, 3]";
        assert_eq!(extract_json(text).unwrap()[2], 3);
    }

    #[test]
    fn test_backoff_grows_then_caps() {
        let first = backoff_delay(0).as_millis();
        assert!((500..750).contains(&first));
        let third = backoff_delay(2).as_millis();
        assert!((2000..2250).contains(&third));

        let cap = u128::from(MAX_BACKOFF_MS);
        for attempt in [7, 20, 64, u32::MAX] {
            let delay = backoff_delay(attempt).as_millis();
            assert!(delay >= cap && delay < cap + 250, "attempt {attempt}: {delay}");
        }
    }

    #[test]
    fn test_extract_json_failure() {
        let err = extract_json("no structured data here").unwrap_err();
        assert_eq!(err.code(), "E009");
    }

    #[tokio::test]
    async fn test_retries_only_retryable_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = with_retries(2, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(CourseGenError::ai_provider("bad request"))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_rate_limit_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result = with_retries(2, || async {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(CourseGenError::ai_rate_limited("slow down"))
            } else {
                Ok(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
