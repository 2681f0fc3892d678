use std::sync::Arc;

use tracing::{info, warn};

use super::{AiProvider, AnthropicProvider, Completion, CompletionRequest, OpenAiProvider};
use crate::config::AiConfig;
use crate::errors::{CourseGenError, Result};

/// 主备切换的 AI 客户端
pub struct AiClient {
    primary: Option<Arc<dyn AiProvider>>,
    fallback: Option<Arc<dyn AiProvider>>,
    temperature: f32,
    max_tokens: u32,
}

impl AiClient {
    pub fn new(
        primary: Option<Arc<dyn AiProvider>>,
        fallback: Option<Arc<dyn AiProvider>>,
    ) -> Self {
        // 只有备用时把它提升为主
        let (primary, fallback) = match (primary, fallback) {
            (None, Some(fallback)) => (Some(fallback), None),
            other => other,
        };
        Self {
            primary,
            fallback,
            temperature: 0.7,
            max_tokens: 4096,
        }
    }

    pub fn with_defaults(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// 根据配置创建；没有 api key 的提供方不会被创建
    pub fn from_config(config: &AiConfig) -> Self {
        let primary = build_provider(&config.primary, config);
        let fallback = if config.fallback.is_empty() || config.fallback == config.primary {
            None
        } else {
            build_provider(&config.fallback, config)
        };
        let client =
            Self::new(primary, fallback).with_defaults(config.temperature, config.max_tokens);
        if client.is_available() {
            info!("AI providers configured: {}", client.provider_names().join(", "));
        } else {
            warn!("No AI provider configured, course generation is disabled");
        }
        client
    }

    pub fn is_available(&self) -> bool {
        self.primary.is_some()
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers().map(|p| p.name().to_string()).collect()
    }

    /// 用客户端默认的温度和 token 上限构造请求
    pub fn request(&self, prompt: impl Into<String>) -> CompletionRequest {
        let mut request = CompletionRequest::new(prompt);
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;
        request
    }

    fn providers(&self) -> impl Iterator<Item = &Arc<dyn AiProvider>> {
        self.primary.iter().chain(self.fallback.iter())
    }

    pub async fn generate(&self, request: &CompletionRequest) -> Result<Completion> {
        let primary = self
            .primary
            .as_ref()
            .ok_or_else(|| CourseGenError::ai_unavailable("No AI provider configured"))?;

        let primary_err = match primary.generate(request).await {
            Ok(completion) => return Ok(completion),
            Err(e) => e,
        };

        let Some(fallback) = &self.fallback else {
            return Err(primary_err);
        };
        warn!(
            "AI provider '{}' failed ({}), falling back to '{}'",
            primary.name(),
            primary_err,
            fallback.name()
        );

        match fallback.generate(request).await {
            Ok(completion) => Ok(completion),
            Err(fallback_err) => Err(annotate(primary_err, &fallback_err)),
        }
    }

    /// 依次尝试支持 embedding 的提供方
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut last_err = None;
        for provider in self.providers().filter(|p| p.supports_embeddings()) {
            match provider.embed(texts).await {
                Ok(vectors) => return Ok(vectors),
                Err(e) => {
                    warn!("Embedding with '{}' failed: {}", provider.name(), e);
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| {
            CourseGenError::ai_unavailable("No configured AI provider supports embeddings")
        }))
    }
}

fn build_provider(name: &str, config: &AiConfig) -> Option<Arc<dyn AiProvider>> {
    let timeout = config.request_timeout_secs;
    let retries = config.max_retries;
    let result: Result<Arc<dyn AiProvider>> = match name {
        "openai" => OpenAiProvider::new(&config.openai, timeout, retries)
            .map(|p| Arc::new(p) as Arc<dyn AiProvider>),
        "anthropic" => AnthropicProvider::new(&config.anthropic, timeout, retries)
            .map(|p| Arc::new(p) as Arc<dyn AiProvider>),
        other => Err(CourseGenError::ai_unavailable(format!(
            "Unknown AI provider '{other}'"
        ))),
    };
    match result {
        Ok(provider) => Some(provider),
        Err(e) => {
            info!("AI provider '{}' not enabled: {}", name, e.message());
            None
        }
    }
}

// 保留主提供方的错误类型，附加备用提供方的错误信息
fn annotate(primary: CourseGenError, fallback: &CourseGenError) -> CourseGenError {
    let message = format!("{} (fallback failed: {})", primary.message(), fallback.message());
    match primary {
        CourseGenError::AiRateLimited(_) => CourseGenError::ai_rate_limited(message),
        CourseGenError::AiUnavailable(_) => CourseGenError::ai_unavailable(message),
        CourseGenError::HttpClient(_) => CourseGenError::http_client(message),
        _ => CourseGenError::ai_provider(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProvider {
        name: &'static str,
        fail: bool,
        embeddings: bool,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn new(name: &'static str, fail: bool, embeddings: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                fail,
                embeddings,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl AiProvider for StubProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn generate(&self, request: &CompletionRequest) -> Result<Completion> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(CourseGenError::ai_unavailable(format!("{} down", self.name)));
            }
            Ok(Completion {
                text: format!("{}: {}", self.name, request.prompt),
                provider: self.name.to_string(),
                model: "stub".to_string(),
                input_tokens: 1,
                output_tokens: 1,
            })
        }

        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            if self.fail {
                return Err(CourseGenError::ai_unavailable("down"));
            }
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn supports_embeddings(&self) -> bool {
            self.embeddings
        }
    }

    fn as_dyn(provider: &Arc<StubProvider>) -> Arc<dyn AiProvider> {
        provider.clone()
    }

    #[tokio::test]
    async fn test_primary_success_skips_fallback() {
        let primary = StubProvider::new("a", false, true);
        let fallback = StubProvider::new("b", false, true);
        let client = AiClient::new(Some(as_dyn(&primary)), Some(as_dyn(&fallback)));
        let completion = client.generate(&client.request("hi")).await.unwrap();
        assert_eq!(completion.provider, "a");
        assert_eq!(fallback.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_back_on_primary_error() {
        let client = AiClient::new(
            Some(as_dyn(&StubProvider::new("a", true, true))),
            Some(as_dyn(&StubProvider::new("b", false, false))),
        );
        let completion = client.generate(&client.request("hi")).await.unwrap();
        assert_eq!(completion.provider, "b");
    }

    #[tokio::test]
    async fn test_both_failing_keeps_primary_error() {
        let client = AiClient::new(
            Some(as_dyn(&StubProvider::new("a", true, true))),
            Some(as_dyn(&StubProvider::new("b", true, true))),
        );
        let err = client.generate(&client.request("hi")).await.unwrap_err();
        assert_eq!(err.code(), "E012");
        assert!(err.message().contains("a down"));
        assert!(err.message().contains("fallback failed: b down"));
    }

    #[tokio::test]
    async fn test_embed_skips_unsupported_provider() {
        let client = AiClient::new(
            Some(as_dyn(&StubProvider::new("anthropic-like", false, false))),
            Some(as_dyn(&StubProvider::new("openai-like", false, true))),
        );
        let vectors = client.embed(&["x".to_string()]).await.unwrap();
        assert_eq!(vectors.len(), 1);
    }

    #[tokio::test]
    async fn test_no_provider() {
        let client = AiClient::new(None, None);
        assert!(!client.is_available());
        let err = client.generate(&client.request("hi")).await.unwrap_err();
        assert_eq!(err.code(), "E012");
        assert!(client.embed(&[]).await.is_err());
    }

    #[test]
    fn test_fallback_promoted_when_primary_missing() {
        let client = AiClient::new(None, Some(as_dyn(&StubProvider::new("b", false, true))));
        assert_eq!(client.provider_names(), vec!["b".to_string()]);
    }

    #[test]
    fn test_from_config_without_keys() {
        let client = AiClient::from_config(&AiConfig::default());
        assert!(!client.is_available());
    }
}
