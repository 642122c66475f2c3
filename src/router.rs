use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{any, delete, get, post},
};

use crate::{
    AppState,
    middleware::{log_errors, rate_limit},
    routes,
};

// 生成类路由，受配额限制
fn generation_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/generate-tweets", post(routes::generate::generate_tweets))
        .route("/remix", post(routes::generate::remix))
        .route_layer(from_fn_with_state(state.clone(), rate_limit))
}

// 收藏推文路由
fn tweet_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tweets",
            get(routes::tweets::list_tweets).post(routes::tweets::save_tweet),
        )
        .route("/tweets/{id}", delete(routes::tweets::delete_tweet))
}

// 创建主路由
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(generation_routes(&state))
        .merge(tweet_routes())
        .route("/test", any(routes::health::test));

    let base = state.config.api_base_uri.trim_end_matches('/');
    let router = if base.is_empty() {
        api
    } else {
        Router::new().nest(base, api)
    };

    router.layer(from_fn(log_errors)).with_state(state)
}
