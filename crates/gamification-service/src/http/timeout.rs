//! 请求超时中间件
//!
//! 超时的请求以 503 + 统一错误响应结束，与持久层临时故障的返回一致

use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::error::ScoringError;

pub async fn request_timeout(State(limit): State<Duration>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    match tokio::time::timeout(limit, next.run(req)).await {
        Ok(response) => response,
        Err(_) => {
            warn!(%method, path = %path, timeout = ?limit, "请求处理超时");
            ScoringError::Unavailable(format!("请求处理超过 {limit:?}")).into_response()
        }
    }
}
