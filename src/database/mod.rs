// 数据库模块
// 收藏推文的持久化

pub mod models; // 数据库实体定义
pub mod operations; // 数据库操作实现

pub use models::tweet::{NewSavedTweet, SavedTweet};
pub use operations::tweet::SavedTweetOperation;
