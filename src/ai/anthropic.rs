use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{AiProvider, Completion, CompletionRequest, check_provider_response, with_retries};
use crate::config::AnthropicConfig;
use crate::errors::{CourseGenError, Result};

const JSON_ONLY_INSTRUCTION: &str =
    "Respond with a single valid JSON document and no surrounding prose.";

pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    api_version: String,
    max_retries: u32,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    model: Option<String>,
    content: Vec<ContentBlock>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicProvider {
    pub fn new(config: &AnthropicConfig, timeout_secs: u64, max_retries: u32) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(CourseGenError::ai_unavailable(
                "Anthropic api key is not configured",
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_version: config.api_version.clone(),
            max_retries,
        })
    }

    fn system_prompt(request: &CompletionRequest) -> Option<String> {
        match (&request.system, request.json_mode) {
            (Some(system), true) => Some(format!("{system}\n\n{JSON_ONLY_INSTRUCTION}")),
            (None, true) => Some(JSON_ONLY_INSTRUCTION.to_string()),
            (system, false) => system.clone(),
        }
    }

    async fn messages_once(&self, request: &CompletionRequest) -> Result<Completion> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: Self::system_prompt(request),
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&body)
            .send()
            .await?;
        let response: MessagesResponse = check_provider_response("anthropic", response)
            .await?
            .json()
            .await?;

        let text: String = response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");
        if text.is_empty() {
            return Err(CourseGenError::ai_provider(
                "Anthropic returned no text content",
            ));
        }
        let (input_tokens, output_tokens) = response
            .usage
            .map(|u| (u.input_tokens, u.output_tokens))
            .unwrap_or_default();

        Ok(Completion {
            text,
            provider: "anthropic".to_string(),
            model: response.model.unwrap_or_else(|| self.model.clone()),
            input_tokens,
            output_tokens,
        })
    }
}

#[async_trait]
impl AiProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, request: &CompletionRequest) -> Result<Completion> {
        with_retries(self.max_retries, || self.messages_once(request)).await
    }

    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(CourseGenError::ai_provider(
            "Anthropic does not provide an embeddings API",
        ))
    }

    fn supports_embeddings(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_mode_extends_system_prompt() {
        let request = CompletionRequest::new("outline").with_system("You design courses.").json();
        let system = AnthropicProvider::system_prompt(&request).unwrap();
        assert!(system.starts_with("You design courses."));
        assert!(system.ends_with(JSON_ONLY_INSTRUCTION));

        let plain = CompletionRequest::new("hello");
        assert_eq!(AnthropicProvider::system_prompt(&plain), None);
    }

    #[test]
    fn test_parse_messages_response() {
        let raw = r#"{"id":"msg_1","model":"claude-3-5-sonnet-latest","content":[{"type":"text","text":"Hi"},{"type":"text","text":" there"}],"usage":{"input_tokens":3,"output_tokens":2}}"#;
        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.content.len(), 2);
        assert_eq!(parsed.usage.unwrap().input_tokens, 3);
    }

    #[test]
    fn test_requires_api_key() {
        assert!(AnthropicProvider::new(&AnthropicConfig::default(), 30, 0).is_err());
    }
}
