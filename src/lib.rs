use std::sync::Arc;

use config::Config;
use database::SavedTweetOperation;
use llm::TextGenerator;
use quota::{QuotaGate, QuotaStore};

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod extract;
pub mod llm;
pub mod middleware;
pub mod quota;
pub mod router;
pub mod routes;
pub mod utils;

pub use router::build_router;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub quota: QuotaGate,
    /// 未配置 API key 时为 None，生成请求返回配置错误
    pub generator: Option<Arc<dyn TextGenerator>>,
    /// 未配置数据库时为 None
    pub tweets: Option<SavedTweetOperation>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn QuotaStore>) -> Self {
        let quota = QuotaGate::new(store, config.rate_limit_requests, config.rate_limit_window());
        Self {
            config: Arc::new(config),
            quota,
            generator: None,
            tweets: None,
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_tweets(mut self, tweets: SavedTweetOperation) -> Self {
        self.tweets = Some(tweets);
        self
    }
}
