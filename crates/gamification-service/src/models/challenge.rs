//! 挑战与参与记录
//!
//! 与积分共用同一用户标识空间，进度不由行为驱动。

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 挑战类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChallengeType {
    /// 个人挑战
    #[default]
    Individuel,
    /// 集体挑战
    Collectif,
}

/// 参与状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipationStatus {
    /// 进行中
    #[default]
    EnCours,
    /// 已完成
    Termine,
    /// 已放弃
    Abandonne,
}

/// 挑战定义
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    pub id: i64,
    pub title: String,
    #[sqlx(default)]
    pub description: Option<String>,
    /// 目标值，大于 0
    pub goal: i32,
    /// 完成奖励积分
    pub reward_points: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub challenge_type: ChallengeType,
}

impl Challenge {
    /// 指定日期是否落在挑战期内（首尾均包含）
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// 用户参与记录
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Participation {
    pub id: i64,
    pub challenge_id: i64,
    pub user_id: i64,
    pub progress: i32,
    pub status: ParticipationStatus,
    pub updated_at: DateTime<Utc>,
}
