//! 挑战仓储

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use super::traits::ChallengeRepositoryTrait;
use crate::error::Result;
use crate::models::{Challenge, Participation};

/// 挑战仓储
pub struct ChallengeRepository {
    pool: PgPool,
}

impl ChallengeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 列出挑战
    pub async fn list_challenges(&self, active_on: Option<NaiveDate>) -> Result<Vec<Challenge>> {
        let challenges = sqlx::query_as::<_, Challenge>(
            r#"
            SELECT id, title, description, goal, reward_points, start_date, end_date, challenge_type
            FROM challenges
            WHERE $1::date IS NULL OR $1::date BETWEEN start_date AND end_date
            ORDER BY start_date DESC, id ASC
            "#,
        )
        .bind(active_on)
        .fetch_all(&self.pool)
        .await?;

        Ok(challenges)
    }

    /// 获取单个挑战
    pub async fn get_challenge(&self, id: i64) -> Result<Option<Challenge>> {
        let challenge = sqlx::query_as::<_, Challenge>(
            r#"
            SELECT id, title, description, goal, reward_points, start_date, end_date, challenge_type
            FROM challenges
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(challenge)
    }

    /// 参加挑战
    ///
    /// 先尝试插入，冲突时读取已有记录
    pub async fn join(&self, challenge_id: i64, user_id: i64) -> Result<Participation> {
        let inserted = sqlx::query_as::<_, Participation>(
            r#"
            INSERT INTO challenge_participations (challenge_id, user_id, progress, status, updated_at)
            VALUES ($1, $2, 0, 'EN_COURS', NOW())
            ON CONFLICT (challenge_id, user_id) DO NOTHING
            RETURNING id, challenge_id, user_id, progress, status, updated_at
            "#,
        )
        .bind(challenge_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(participation) = inserted {
            return Ok(participation);
        }

        let existing = sqlx::query_as::<_, Participation>(
            r#"
            SELECT id, challenge_id, user_id, progress, status, updated_at
            FROM challenge_participations
            WHERE challenge_id = $1 AND user_id = $2
            "#,
        )
        .bind(challenge_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(existing)
    }

    /// 用户的参与记录
    pub async fn list_user_participations(&self, user_id: i64) -> Result<Vec<Participation>> {
        let participations = sqlx::query_as::<_, Participation>(
            r#"
            SELECT id, challenge_id, user_id, progress, status, updated_at
            FROM challenge_participations
            WHERE user_id = $1
            ORDER BY updated_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(participations)
    }
}

#[async_trait]
impl ChallengeRepositoryTrait for ChallengeRepository {
    async fn list_challenges(&self, active_on: Option<NaiveDate>) -> Result<Vec<Challenge>> {
        self.list_challenges(active_on).await
    }

    async fn get_challenge(&self, id: i64) -> Result<Option<Challenge>> {
        self.get_challenge(id).await
    }

    async fn join(&self, challenge_id: i64, user_id: i64) -> Result<Participation> {
        self.join(challenge_id, user_id).await
    }

    async fn list_user_participations(&self, user_id: i64) -> Result<Vec<Participation>> {
        self.list_user_participations(user_id).await
    }
}
