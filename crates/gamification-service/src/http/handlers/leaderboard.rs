//! 排行榜

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};

use super::query_params;
use crate::error::Result;
use crate::http::{response::ApiResponse, state::AppState};
use crate::service::dto::{LeaderboardEntry, LeaderboardQuery};

/// GET /leaderboard?limit=N
///
/// limit 缺省取配置默认值，超出范围时收敛到 [1, max_limit]
pub async fn get_leaderboard(
    State(state): State<AppState>,
    query: std::result::Result<Query<LeaderboardQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<LeaderboardEntry>>>> {
    let query = query_params(query)?;
    let limit = state.leaderboard.clamp(query.limit);
    let entries = state.query_service.leaderboard(limit).await?;
    Ok(Json(ApiResponse::success(entries)))
}
