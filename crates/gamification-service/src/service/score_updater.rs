//! 积分更新
//!
//! 校验在前，写入在后：校验失败时不产生任何数据库操作

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::error::{Result, ScoringError};
use crate::models::ActionType;
use crate::repository::ScoreRepositoryTrait;

/// 积分更新器
pub struct ScoreUpdater<SR>
where
    SR: ScoreRepositoryTrait + ?Sized,
{
    score_repo: Arc<SR>,
}

impl<SR> ScoreUpdater<SR>
where
    SR: ScoreRepositoryTrait + ?Sized,
{
    pub fn new(score_repo: Arc<SR>) -> Self {
        Self { score_repo }
    }

    /// 给用户累加积分，返回新的总分
    ///
    /// 用户无记录时以 `delta` 创建。`delta` 为 0 合法，总分不变
    #[instrument(skip(self))]
    pub async fn apply_points(&self, user_id: i64, delta: i64) -> Result<i64> {
        self.apply(user_id, delta, None).await
    }

    /// 按行为累加积分，并在同一事务内写入行为流水
    #[instrument(skip(self), fields(action_type = %action))]
    pub async fn apply_action(&self, user_id: i64, action: ActionType) -> Result<i64> {
        self.apply(user_id, action.points(), Some(action)).await
    }

    async fn apply(&self, user_id: i64, delta: i64, action: Option<ActionType>) -> Result<i64> {
        if user_id <= 0 {
            return Err(ScoringError::Validation(format!(
                "用户 ID 必须为正整数: {user_id}"
            )));
        }
        if delta < 0 {
            return Err(ScoringError::NegativeDelta(delta));
        }

        let total = self
            .score_repo
            .increment_score(user_id, delta, action)
            .await
            .inspect_err(|e| warn!(user_id, delta, error = %e, "积分写入失败"))?;

        debug!(user_id, delta, total, "积分已累加");
        Ok(total)
    }
}
