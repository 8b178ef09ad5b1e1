//! 健康检查

use axum::Json;
use serde_json::{Value, json};

/// 服务名固定，供负载均衡器探测
pub const SERVICE_LABEL: &str = "gamifications";

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": SERVICE_LABEL }))
}
