/// 标题最多取前几个词
const TITLE_WORDS: usize = 3;
/// 标题超过该长度时截断
const TITLE_MAX_CHARS: usize = 30;

/// 按 Unicode 字符计数
pub fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// 由原文生成简短标题：取前三个词，超过 30 个字符时截断并加省略号
pub fn derive_title(content: &str) -> Option<String> {
    let words = content
        .split_whitespace()
        .take(TITLE_WORDS)
        .collect::<Vec<_>>()
        .join(" ");
    if words.is_empty() {
        return None;
    }
    if char_count(&words) > TITLE_MAX_CHARS {
        let mut title: String = words.chars().take(TITLE_MAX_CHARS).collect();
        title.push_str("...");
        Some(title)
    } else {
        Some(words)
    }
}
