//! 挑战

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use validator::Validate;

use super::{json_body, path_param, query_params};
use crate::error::Result;
use crate::http::{response::ApiResponse, state::AppState};
use crate::models::{Challenge, Participation};
use crate::service::dto::{ChallengeQuery, JoinChallengeRequest};

/// GET /challenges?activeOn=YYYY-MM-DD
pub async fn list_challenges(
    State(state): State<AppState>,
    query: std::result::Result<Query<ChallengeQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Challenge>>>> {
    let query = query_params(query)?;
    let challenges = state
        .challenge_service
        .list_challenges(query.active_on)
        .await?;
    Ok(Json(ApiResponse::success(challenges)))
}

/// POST /challenges/{challenge_id}/participations
///
/// 重复参加返回已有记录
pub async fn join_challenge(
    State(state): State<AppState>,
    challenge_id: std::result::Result<Path<i64>, PathRejection>,
    payload: std::result::Result<Json<JoinChallengeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Participation>>)> {
    let challenge_id = path_param(challenge_id)?;
    let req = json_body(payload)?;
    req.validate()?;

    let participation = state
        .challenge_service
        .join_challenge(challenge_id, req.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(participation))))
}
