//! 仓储 Trait 定义
//!
//! 定义仓储接口，便于服务层依赖抽象而非具体实现，支持 mock 测试

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::Result;
use crate::models::{ActionType, Badge, Challenge, EarnedBadge, Participation, UserScore};

/// 积分仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScoreRepositoryTrait: Send + Sync {
    /// 原子地累加积分并返回累加后的总分
    ///
    /// 用户不存在时以 `delta` 创建。`action` 非空时在同一事务内写入行为流水，
    /// 失败时积分保持不变。
    async fn increment_score(
        &self,
        user_id: i64,
        delta: i64,
        action: Option<ActionType>,
    ) -> Result<i64>;

    async fn get_score(&self, user_id: i64) -> Result<Option<UserScore>>;

    /// 按总分降序、用户 ID 升序取前 `limit` 名
    async fn top_scores(&self, limit: i64) -> Result<Vec<UserScore>>;
}

/// 徽章目录仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BadgeRepositoryTrait: Send + Sync {
    /// 完整目录，按 points_required 升序
    async fn list_catalog(&self) -> Result<Vec<Badge>>;
}

/// 用户徽章仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserBadgeRepositoryTrait: Send + Sync {
    /// 用户已持有的徽章编码
    async fn list_held_codes(&self, user_id: i64) -> Result<HashSet<String>>;

    /// 授予徽章（冲突容忍）
    ///
    /// 返回 `true` 表示本次写入了新记录，`false` 表示记录已存在
    async fn award(&self, user_id: i64, badge_id: i64) -> Result<bool>;

    /// 用户的徽章详情，按 points_required 升序
    async fn list_user_badges(&self, user_id: i64) -> Result<Vec<EarnedBadge>>;

    /// 多个用户的徽章详情，按用户、points_required 升序
    async fn list_badges_for_users(&self, user_ids: &[i64]) -> Result<Vec<EarnedBadge>>;
}

/// 挑战仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChallengeRepositoryTrait: Send + Sync {
    /// 列出挑战，`active_on` 非空时只返回该日期处于挑战期内的
    async fn list_challenges(&self, active_on: Option<NaiveDate>) -> Result<Vec<Challenge>>;

    async fn get_challenge(&self, id: i64) -> Result<Option<Challenge>>;

    /// 参加挑战（幂等），已参加时返回原记录
    async fn join(&self, challenge_id: i64, user_id: i64) -> Result<Participation>;

    async fn list_user_participations(&self, user_id: i64) -> Result<Vec<Participation>>;
}
