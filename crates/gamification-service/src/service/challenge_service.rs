//! 挑战服务
//!
//! 挑战列表与参与登记，进度不随行为变化

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument};

use crate::error::{Result, ScoringError};
use crate::models::{Challenge, Participation};
use crate::repository::ChallengeRepositoryTrait;
use crate::service::query_service::ensure_user_id;

/// 挑战服务
pub struct ChallengeService<CR>
where
    CR: ChallengeRepositoryTrait + ?Sized,
{
    challenge_repo: Arc<CR>,
}

impl<CR> ChallengeService<CR>
where
    CR: ChallengeRepositoryTrait + ?Sized,
{
    pub fn new(challenge_repo: Arc<CR>) -> Self {
        Self { challenge_repo }
    }

    #[instrument(skip(self))]
    pub async fn list_challenges(&self, active_on: Option<NaiveDate>) -> Result<Vec<Challenge>> {
        self.challenge_repo.list_challenges(active_on).await
    }

    /// 参加挑战
    ///
    /// 重复参加返回已有记录，挑战不存在时返回 NotFound
    #[instrument(skip(self))]
    pub async fn join_challenge(&self, challenge_id: i64, user_id: i64) -> Result<Participation> {
        ensure_user_id(user_id)?;

        if self.challenge_repo.get_challenge(challenge_id).await?.is_none() {
            return Err(ScoringError::ChallengeNotFound(challenge_id));
        }

        let participation = self.challenge_repo.join(challenge_id, user_id).await?;
        info!(challenge_id, user_id, participation_id = participation.id, "已参加挑战");
        Ok(participation)
    }

    #[instrument(skip(self))]
    pub async fn list_user_challenges(&self, user_id: i64) -> Result<Vec<Participation>> {
        ensure_user_id(user_id)?;
        self.challenge_repo.list_user_participations(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::repository::MockChallengeRepositoryTrait;

    #[tokio::test]
    async fn test_join_unknown_challenge() {
        let mut repo = MockChallengeRepositoryTrait::new();
        repo.expect_get_challenge().returning(|_| Ok(None));
        repo.expect_join().never();

        let err = ChallengeService::new(Arc::new(repo))
            .join_challenge(404, 1)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_join_rejects_invalid_user() {
        let mut repo = MockChallengeRepositoryTrait::new();
        repo.expect_get_challenge().never();

        let err = ChallengeService::new(Arc::new(repo))
            .join_challenge(1, -3)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}
