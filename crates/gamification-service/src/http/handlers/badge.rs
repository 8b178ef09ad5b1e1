//! 徽章目录

use axum::{Json, extract::State};

use crate::error::Result;
use crate::http::{response::ApiResponse, state::AppState};
use crate::models::Badge;

/// GET /badges
pub async fn list_badges(State(state): State<AppState>) -> Result<Json<ApiResponse<Vec<Badge>>>> {
    let badges = state.query_service.list_badges().await?;
    Ok(Json(ApiResponse::success(badges)))
}
