//! 用户积分实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::action::ActionType;

/// 用户累计积分
///
/// 每个用户一行，只会通过增量累加修改，数值单调不减
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserScore {
    pub user_id: i64,
    pub total_points: i64,
    pub updated_at: DateTime<Utc>,
}

/// 行为流水
///
/// 与积分累加在同一事务内写入
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    pub id: i64,
    pub user_id: i64,
    pub action_type: ActionType,
    pub points: i64,
    pub created_at: DateTime<Utc>,
}
