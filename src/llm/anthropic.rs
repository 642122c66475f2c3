use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::llm::{LlmError, TextGenerator};

const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ErrorWrapper {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Anthropic Messages API 客户端
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicClient {
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            max_tokens,
        })
    }

    /// 未配置 API key 时返回 `None`
    pub fn from_config(config: &Config) -> Result<Option<Self>, LlmError> {
        match &config.anthropic_api_key {
            Some(api_key) => Self::new(
                api_key.clone(),
                config.anthropic_base_url.clone(),
                config.anthropic_model.clone(),
                config.anthropic_max_tokens,
            )
            .map(Some),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: vec![RequestMessage {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "calling messages API");

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            return Err(parse_error_response(status, &bytes));
        }

        let parsed: MessagesResponse = serde_json::from_slice(&bytes)?;
        first_text(parsed).ok_or(LlmError::EmptyResponse)
    }
}

fn first_text(response: MessagesResponse) -> Option<String> {
    response.content.into_iter().find_map(|block| match block {
        ContentBlock::Text { text } => Some(text),
        ContentBlock::Other => None,
    })
}

fn parse_error_response(status: StatusCode, bytes: &[u8]) -> LlmError {
    match status {
        StatusCode::UNAUTHORIZED => LlmError::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited,
        _ => {
            let message = serde_json::from_slice::<ErrorWrapper>(bytes)
                .map(|wrapper| wrapper.error.message)
                .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned());
            LlmError::Api { status, message }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_text_block() {
        let response: MessagesResponse = serde_json::from_str(
            r#"{"content":[{"type":"tool_use","id":"t","name":"x","input":{}},
                {"type":"text","text":"1. Hello"},{"type":"text","text":"ignored"}]}"#,
        )
        .unwrap();
        assert_eq!(first_text(response).as_deref(), Some("1. Hello"));
    }

    #[test]
    fn no_text_block_is_none() {
        let response: MessagesResponse = serde_json::from_str(r#"{"content":[]}"#).unwrap();
        assert!(first_text(response).is_none());
    }

    #[test]
    fn maps_error_statuses() {
        assert!(matches!(
            parse_error_response(StatusCode::UNAUTHORIZED, b"{}"),
            LlmError::Unauthorized
        ));
        assert!(matches!(
            parse_error_response(StatusCode::TOO_MANY_REQUESTS, b""),
            LlmError::RateLimited
        ));

        let body = br#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        match parse_error_response(StatusCode::from_u16(529).unwrap(), body) {
            LlmError::Api { status, message } => {
                assert_eq!(status.as_u16(), 529);
                assert_eq!(message, "Overloaded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_key_means_no_client() {
        let config = Config::default();
        assert!(AnthropicClient::from_config(&config).unwrap().is_none());

        let config = Config {
            anthropic_api_key: Some("sk-test".into()),
            ..Config::default()
        };
        assert!(AnthropicClient::from_config(&config).unwrap().is_some());
    }
}
