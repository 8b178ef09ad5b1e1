//! HTTP 接口层
//!
//! 基于 axum 的 REST API，统一响应格式 `{success, code, message, data}`

pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;
pub mod timeout;

pub use response::ApiResponse;
pub use routes::{api_routes, build_app};
pub use state::AppState;
