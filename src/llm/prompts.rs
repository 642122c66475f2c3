use serde::Deserialize;

const TWEET_PROMPT: &str = "Create exactly 6 tweets from the following text. CRITICAL: Each tweet MUST be under 280 characters (aim for 270 to be safe). Count carefully before including each tweet. Maintain the tone of the original text. Format each tweet with a number (1., 2., 3., 4., 5., 6.) on a new line. Do not include any additional text or incomplete tweets:";

/// 改写方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemixType {
    #[default]
    Summarize,
    Expand,
    Simplify,
    Creative,
    Formal,
    Casual,
}

impl RemixType {
    fn instruction(self) -> &'static str {
        match self {
            RemixType::Summarize => {
                "Please summarize the following content in a concise and clear way, highlighting the key points:"
            }
            RemixType::Expand => {
                "Please expand the following content with more detail, examples, and context while maintaining the original meaning:"
            }
            RemixType::Simplify => {
                "Please simplify the following content to make it easier to understand for a general audience, using simpler language:"
            }
            RemixType::Creative => {
                "Please rewrite the following content with a creative and engaging style, adding personality and flair:"
            }
            RemixType::Formal => {
                "Please rewrite the following content in a more formal and professional tone, suitable for business or academic contexts:"
            }
            RemixType::Casual => {
                "Please rewrite the following content in a casual and conversational tone, as if speaking to a friend:"
            }
        }
    }
}

pub fn tweet_prompt(content: &str) -> String {
    format!("{TWEET_PROMPT}\n\n{content}")
}

pub fn remix_prompt(remix_type: RemixType, content: &str) -> String {
    format!("{}\n\n{content}", remix_type.instruction())
}
