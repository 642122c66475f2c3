use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extract::GeneratedTweet;
use crate::llm::RemixType;

// 生成推文请求，content 保持原始 JSON 以便区分缺失和类型错误
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub content: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    /// 模型原始输出
    pub tweets: String,
    pub remaining: u32,
    pub extracted: Vec<GeneratedTweet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemixRequest {
    #[serde(default)]
    pub content: Option<Value>,
    #[serde(default)]
    pub remix_type: RemixType,
}

#[derive(Debug, Serialize)]
pub struct RemixResponse {
    pub output: String,
    pub remaining: u32,
}
