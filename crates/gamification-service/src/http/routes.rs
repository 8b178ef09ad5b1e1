//! 路由配置模块

use std::time::Duration;

use axum::{
    Json, Router,
    http::{HeaderValue, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use gamification_shared::config::CorsConfig;
use gamification_shared::observability::middleware::{http_tracing, request_id};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::http::{handlers, response::ApiResponse, state::AppState, timeout::request_timeout};

/// 业务路由（不含中间件）
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/actions", post(handlers::action::process_action))
        .route("/badges", get(handlers::badge::list_badges))
        .route("/users/{user_id}/score", get(handlers::user::get_user_score))
        .route("/users/{user_id}/badges", get(handlers::user::list_user_badges))
        .route(
            "/users/{user_id}/challenges",
            get(handlers::user::list_user_challenges),
        )
        .route("/leaderboard", get(handlers::leaderboard::get_leaderboard))
        .route("/challenges", get(handlers::challenge::list_challenges))
        .route(
            "/challenges/{challenge_id}/participations",
            post(handlers::challenge::join_challenge),
        )
        .fallback(not_found)
}

/// 完整应用：路由、跨域、超时、请求 ID 与访问日志
pub fn build_app(state: AppState, cors: &CorsConfig, timeout: Duration) -> Router {
    api_routes()
        .with_state(state)
        .layer(cors_layer(cors))
        .layer(middleware::from_fn_with_state(timeout, request_timeout))
        .layer(middleware::from_fn(http_tracing))
        .layer(middleware::from_fn(request_id))
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.allows_any() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .origins()
        .into_iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "忽略非法的 CORS 来源");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::error("NOT_FOUND", "路由不存在")),
    )
}
