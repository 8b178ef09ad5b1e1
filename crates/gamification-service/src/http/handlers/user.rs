//! 用户维度查询

use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};

use super::path_param;
use crate::error::Result;
use crate::http::{response::ApiResponse, state::AppState};
use crate::models::{EarnedBadge, Participation};
use crate::service::dto::UserScoreDto;

type UserIdPath = std::result::Result<Path<i64>, PathRejection>;

/// GET /users/{user_id}/score
pub async fn get_user_score(
    State(state): State<AppState>,
    user_id: UserIdPath,
) -> Result<Json<ApiResponse<UserScoreDto>>> {
    let score = state.query_service.get_user_score(path_param(user_id)?).await?;
    Ok(Json(ApiResponse::success(score)))
}

/// GET /users/{user_id}/badges
pub async fn list_user_badges(
    State(state): State<AppState>,
    user_id: UserIdPath,
) -> Result<Json<ApiResponse<Vec<EarnedBadge>>>> {
    let badges = state.query_service.list_user_badges(path_param(user_id)?).await?;
    Ok(Json(ApiResponse::success(badges)))
}

/// GET /users/{user_id}/challenges
pub async fn list_user_challenges(
    State(state): State<AppState>,
    user_id: UserIdPath,
) -> Result<Json<ApiResponse<Vec<Participation>>>> {
    let participations = state
        .challenge_service
        .list_user_challenges(path_param(user_id)?)
        .await?;
    Ok(Json(ApiResponse::success(participations)))
}
