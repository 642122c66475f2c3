use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tweetcraft::{
    AppState, build_router,
    cache::{MemoryQuotaStore, RedisQuotaStore},
    config::Config,
    database::SavedTweetOperation,
    llm::AnthropicClient,
    quota::QuotaStore,
};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env();
    tracing::info!(
        api_base_uri = %config.api_base_uri,
        rate_limit_requests = config.rate_limit_requests,
        rate_limit_window_secs = config.rate_limit_window_secs,
        model = %config.anthropic_model,
        "Configuration loaded"
    );

    // 配额存储：配置了 Redis 则多实例共享，否则进程内存
    let store: Arc<dyn QuotaStore> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str()).expect("Failed to create Redis client");
            tracing::info!("Quota records stored in Redis");
            Arc::new(RedisQuotaStore::new(Arc::new(client)))
        }
        None => {
            let memory = Arc::new(MemoryQuotaStore::new());
            spawn_quota_sweeper(memory.clone(), config.quota_sweep_interval());
            tracing::info!("Quota records stored in process memory");
            memory
        }
    };

    let mut state = AppState::new(config.clone(), store);

    match AnthropicClient::from_config(&config).expect("Failed to build HTTP client") {
        Some(client) => state = state.with_generator(Arc::new(client)),
        None => tracing::warn!("ANTHROPIC_API_KEY not set, generation requests will fail"),
    }

    // 设置数据库连接池
    match &config.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .after_connect(|conn, _meta| {
                    Box::pin(async move {
                        conn.execute("SET application_name = 'tweetcraft';").await?;
                        Ok(())
                    })
                })
                .connect(url)
                .await
                .expect("Failed to connect to Postgres");
            state = state.with_tweets(SavedTweetOperation::new(Arc::new(pool)));
        }
        None => tracing::warn!("DATABASE_URL not set, saved tweets are disabled"),
    }

    let router = build_router(state);

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    // 启动服务器
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}

// 定期清理过期的配额记录，限制内存占用
fn spawn_quota_sweeper(store: Arc<MemoryQuotaStore>, every: std::time::Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let removed = store.purge_expired(chrono::Utc::now());
            if removed > 0 {
                tracing::debug!(removed, remaining = store.len(), "Purged expired quota records");
            }
        }
    });
}
