//! 徽章目录仓储

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::BadgeRepositoryTrait;
use crate::error::Result;
use crate::models::Badge;

/// 徽章目录仓储（只读）
pub struct BadgeRepository {
    pool: PgPool,
}

impl BadgeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 完整目录，按门槛升序，同门槛按 ID 升序
    pub async fn list_catalog(&self) -> Result<Vec<Badge>> {
        let badges = sqlx::query_as::<_, Badge>(
            r#"
            SELECT id, code, name, description, points_required
            FROM badges
            ORDER BY points_required ASC, id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(badges)
    }
}

#[async_trait]
impl BadgeRepositoryTrait for BadgeRepository {
    async fn list_catalog(&self) -> Result<Vec<Badge>> {
        self.list_catalog().await
    }
}
