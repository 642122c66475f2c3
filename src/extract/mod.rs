// 推文提取
// 把模型返回的自由文本解析成有序、限长的推文列表

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::utils::char_count;

pub const MAX_TWEETS: usize = 6;
pub const MAX_TWEET_CHARS: usize = 280;
pub const ELLIPSIS: &str = "...";

// 可选前导空白、数字、句点、可选空白，其余为正文
static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\.\s*(.*)$").expect("valid tweet line pattern"));

/// 一次生成结果中的单条推文
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedTweet {
    /// 从 1 开始的序号
    pub index: usize,
    pub text: String,
    /// 字符数
    pub length: usize,
    /// 超长被截断时为 true
    pub truncated: bool,
}

/// 提取推文正文，最多 `MAX_TWEETS` 条，每条不超过 `MAX_TWEET_CHARS` 字符
pub fn extract_tweets(raw: &str) -> Vec<String> {
    extract(raw).into_iter().map(|tweet| tweet.text).collect()
}

pub fn extract(raw: &str) -> Vec<GeneratedTweet> {
    raw.lines()
        .filter_map(numbered_payload)
        .take(MAX_TWEETS)
        .enumerate()
        .map(|(i, payload)| {
            let index = i + 1;
            let original_length = char_count(payload);
            let (text, truncated) = cap_length(payload);
            if truncated {
                tracing::warn!(index, original_length, "tweet exceeds {MAX_TWEET_CHARS} characters, truncated");
            }
            GeneratedTweet {
                index,
                length: char_count(&text),
                text,
                truncated,
            }
        })
        .collect()
}

fn numbered_payload(line: &str) -> Option<&str> {
    // 编号后为空的行同样计入，占用一个名额
    Some(NUMBERED_LINE.captures(line)?.get(1)?.as_str().trim())
}

fn cap_length(payload: &str) -> (String, bool) {
    if char_count(payload) <= MAX_TWEET_CHARS {
        return (payload.to_string(), false);
    }
    let keep = MAX_TWEET_CHARS - char_count(ELLIPSIS);
    let mut text: String = payload.chars().take(keep).collect();
    text.push_str(ELLIPSIS);
    (text, true)
}
