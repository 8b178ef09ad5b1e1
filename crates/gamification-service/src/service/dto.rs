//! 服务层数据传输对象
//!
//! 对外 JSON 统一使用 camelCase；行为请求同时接受旧字段名

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::AwardedBadge;

/// 提交用户行为请求
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    #[serde(alias = "id_utilisateur")]
    #[validate(range(min = 1, message = "userId 必须为正整数"))]
    pub user_id: i64,

    #[serde(alias = "type_action")]
    #[validate(length(min = 1, max = 64, message = "actionType 长度必须在 1-64 之间"))]
    pub action_type: String,
}

/// 行为处理结果
///
/// `badges_incomplete` 为 `true` 表示积分已入账，但徽章评估未全部完成，
/// 缺失的徽章会在该用户下一次行为时补发
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub points_added: i64,
    pub total_points: i64,
    pub new_badges: Vec<AwardedBadge>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub badges_incomplete: bool,
}

/// 用户积分
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserScoreDto {
    pub user_id: i64,
    pub total_points: i64,
}

/// 排行榜条目
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: i64,
    pub total_points: i64,
    pub badges: Vec<AwardedBadge>,
}

/// 排行榜查询参数
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
}

/// 挑战列表查询参数
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeQuery {
    pub active_on: Option<NaiveDate>,
}

/// 参加挑战请求
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct JoinChallengeRequest {
    #[serde(alias = "id_utilisateur")]
    #[validate(range(min = 1, message = "userId 必须为正整数"))]
    pub user_id: i64,
}
