//! 用户行为提交

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use validator::Validate;

use super::json_body;
use crate::error::{Result, ScoringError};
use crate::http::{response::ApiResponse, state::AppState};
use crate::service::dto::{ActionRequest, ActionResult};

/// 提交一次用户行为
///
/// POST /actions
pub async fn process_action(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ActionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<ActionResult>>)> {
    let req = json_body(payload)?;
    req.validate()?;

    // 独立任务执行：请求超时或连接断开时，已入账积分后的徽章评估仍会完成
    let service = state.action_service.clone();
    let result = tokio::spawn(async move {
        service
            .process_action(req.user_id, &req.action_type)
            .await
    })
    .await
    .map_err(|e| ScoringError::Internal(format!("行为处理任务异常: {e}")))??;

    let message = if result.badges_incomplete {
        "积分已记录，徽章稍后补发"
    } else {
        "行为已记录"
    };
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(result, message)),
    ))
}
