// 文本生成
// 封装对大模型接口的调用，处理器只依赖 `TextGenerator`

pub mod anthropic;
pub mod prompts;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

pub use anthropic::AnthropicClient;
pub use prompts::{RemixType, remix_prompt, tweet_prompt};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("upstream rejected the API key")]
    Unauthorized,

    #[error("upstream rate limit exceeded")]
    RateLimited,

    #[error("upstream API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    #[error("no text content in upstream response")]
    EmptyResponse,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// 发送单轮用户提示，返回模型的文本回复
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
