//! 积分仓储
//!
//! 积分累加使用单条 `INSERT ... ON CONFLICT DO UPDATE ... RETURNING`，
//! 写入与读取新总分在同一条语句内完成，不存在写后再读的竞态。

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use super::traits::ScoreRepositoryTrait;
use crate::error::Result;
use crate::models::{ActionType, UserScore};

/// 积分仓储
pub struct ScoreRepository {
    pool: PgPool,
}

impl ScoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==================== 查询操作 ====================

    /// 获取用户积分
    pub async fn get_score(&self, user_id: i64) -> Result<Option<UserScore>> {
        let score = sqlx::query_as::<_, UserScore>(
            r#"
            SELECT user_id, total_points, updated_at
            FROM user_scores
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(score)
    }

    /// 排行榜前 N 名
    pub async fn top_scores(&self, limit: i64) -> Result<Vec<UserScore>> {
        let scores = sqlx::query_as::<_, UserScore>(
            r#"
            SELECT user_id, total_points, updated_at
            FROM user_scores
            ORDER BY total_points DESC, user_id ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(scores)
    }

    // ==================== 写入操作 ====================

    /// 累加积分（可选写入行为流水）
    ///
    /// 事务未提交即被丢弃时自动回滚并归还连接，任何提前返回都不会泄漏连接
    pub async fn increment_score(
        &self,
        user_id: i64,
        delta: i64,
        action: Option<ActionType>,
    ) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let total = Self::increment_in_tx(&mut tx, user_id, delta).await?;

        if let Some(action) = action {
            Self::record_action_in_tx(&mut tx, user_id, action, delta).await?;
        }

        tx.commit().await?;

        Ok(total)
    }

    // ==================== 事务操作 ====================

    /// 在事务中累加积分，返回累加后的总分
    pub async fn increment_in_tx(tx: &mut PgConnection, user_id: i64, delta: i64) -> Result<i64> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO user_scores (user_id, total_points, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (user_id) DO UPDATE
                SET total_points = user_scores.total_points + EXCLUDED.total_points,
                    updated_at = NOW()
            RETURNING total_points
            "#,
        )
        .bind(user_id)
        .bind(delta)
        .fetch_one(tx)
        .await?;

        Ok(total)
    }

    /// 在事务中写入行为流水
    pub async fn record_action_in_tx(
        tx: &mut PgConnection,
        user_id: i64,
        action: ActionType,
        points: i64,
    ) -> Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO user_actions (user_id, action_type, points, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(action)
        .bind(points)
        .fetch_one(tx)
        .await?;

        Ok(id)
    }
}

#[async_trait]
impl ScoreRepositoryTrait for ScoreRepository {
    async fn increment_score(
        &self,
        user_id: i64,
        delta: i64,
        action: Option<ActionType>,
    ) -> Result<i64> {
        self.increment_score(user_id, delta, action).await
    }

    async fn get_score(&self, user_id: i64) -> Result<Option<UserScore>> {
        self.get_score(user_id).await
    }

    async fn top_scores(&self, limit: i64) -> Result<Vec<UserScore>> {
        self.top_scores(limit).await
    }
}
