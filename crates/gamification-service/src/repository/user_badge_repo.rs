//! 用户徽章仓储
//!
//! 授予依赖 (user_id, badge_id) 主键加 `ON CONFLICT DO NOTHING`，
//! 并发评估时重复授予被数据库吸收，不会报错也不会产生第二行。

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::UserBadgeRepositoryTrait;
use crate::error::Result;
use crate::models::EarnedBadge;

/// 用户徽章仓储
pub struct UserBadgeRepository {
    pool: PgPool,
}

impl UserBadgeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 查询操作 ====================

    /// 用户已持有的徽章编码
    pub async fn list_held_codes(&self, user_id: i64) -> Result<HashSet<String>> {
        let codes = sqlx::query_scalar::<_, String>(
            r#"
            SELECT b.code
            FROM user_badges ub
            JOIN badges b ON b.id = ub.badge_id
            WHERE ub.user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(codes.into_iter().collect())
    }

    /// 用户的徽章详情
    pub async fn list_user_badges(&self, user_id: i64) -> Result<Vec<EarnedBadge>> {
        let badges = sqlx::query_as::<_, EarnedBadge>(
            r#"
            SELECT ub.user_id, ub.badge_id, b.code, b.name, b.points_required, ub.earned_at
            FROM user_badges ub
            JOIN badges b ON b.id = ub.badge_id
            WHERE ub.user_id = $1
            ORDER BY b.points_required ASC, b.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(badges)
    }

    /// 批量查询多个用户的徽章（排行榜使用，避免逐个用户查询）
    pub async fn list_badges_for_users(&self, user_ids: &[i64]) -> Result<Vec<EarnedBadge>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let badges = sqlx::query_as::<_, EarnedBadge>(
            r#"
            SELECT ub.user_id, ub.badge_id, b.code, b.name, b.points_required, ub.earned_at
            FROM user_badges ub
            JOIN badges b ON b.id = ub.badge_id
            WHERE ub.user_id = ANY($1)
            ORDER BY ub.user_id ASC, b.points_required ASC, b.id ASC
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(badges)
    }

    // ==================== 写入操作 ====================

    /// 授予徽章，已存在时静默忽略
    pub async fn award(&self, user_id: i64, badge_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO user_badges (user_id, badge_id, earned_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id, badge_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(badge_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl UserBadgeRepositoryTrait for UserBadgeRepository {
    async fn list_held_codes(&self, user_id: i64) -> Result<HashSet<String>> {
        self.list_held_codes(user_id).await
    }

    async fn award(&self, user_id: i64, badge_id: i64) -> Result<bool> {
        self.award(user_id, badge_id).await
    }

    async fn list_user_badges(&self, user_id: i64) -> Result<Vec<EarnedBadge>> {
        self.list_user_badges(user_id).await
    }

    async fn list_badges_for_users(&self, user_ids: &[i64]) -> Result<Vec<EarnedBadge>> {
        self.list_badges_for_users(user_ids).await
    }
}
