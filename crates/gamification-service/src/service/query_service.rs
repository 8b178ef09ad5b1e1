//! 查询服务
//!
//! 只读视图：徽章目录、用户积分与徽章、排行榜

use std::collections::HashMap;
use std::sync::Arc;

use tracing::instrument;

use crate::error::{Result, ScoringError};
use crate::models::{AwardedBadge, Badge, EarnedBadge};
use crate::repository::{BadgeRepositoryTrait, ScoreRepositoryTrait, UserBadgeRepositoryTrait};
use crate::service::badge_evaluator::validate_catalog;
use crate::service::dto::{LeaderboardEntry, UserScoreDto};

/// 查询服务
pub struct QueryService<SR, BR, UBR>
where
    SR: ScoreRepositoryTrait + ?Sized,
    BR: BadgeRepositoryTrait + ?Sized,
    UBR: UserBadgeRepositoryTrait + ?Sized,
{
    score_repo: Arc<SR>,
    badge_repo: Arc<BR>,
    user_badge_repo: Arc<UBR>,
}

impl<SR, BR, UBR> QueryService<SR, BR, UBR>
where
    SR: ScoreRepositoryTrait + ?Sized,
    BR: BadgeRepositoryTrait + ?Sized,
    UBR: UserBadgeRepositoryTrait + ?Sized,
{
    pub fn new(score_repo: Arc<SR>, badge_repo: Arc<BR>, user_badge_repo: Arc<UBR>) -> Self {
        Self {
            score_repo,
            badge_repo,
            user_badge_repo,
        }
    }

    /// 徽章目录（按门槛升序）
    #[instrument(skip(self))]
    pub async fn list_badges(&self) -> Result<Vec<Badge>> {
        validate_catalog(self.badge_repo.list_catalog().await?)
    }

    /// 用户积分，无记录时为 0
    #[instrument(skip(self))]
    pub async fn get_user_score(&self, user_id: i64) -> Result<UserScoreDto> {
        ensure_user_id(user_id)?;
        let total_points = self
            .score_repo
            .get_score(user_id)
            .await?
            .map_or(0, |s| s.total_points);

        Ok(UserScoreDto {
            user_id,
            total_points,
        })
    }

    /// 用户已获得的徽章
    #[instrument(skip(self))]
    pub async fn list_user_badges(&self, user_id: i64) -> Result<Vec<EarnedBadge>> {
        ensure_user_id(user_id)?;
        self.user_badge_repo.list_user_badges(user_id).await
    }

    /// 排行榜
    ///
    /// 按总分降序、用户 ID 升序；徽章一次批量查询后按用户分组
    #[instrument(skip(self))]
    pub async fn leaderboard(&self, limit: i64) -> Result<Vec<LeaderboardEntry>> {
        let scores = self.score_repo.top_scores(limit).await?;
        let user_ids: Vec<i64> = scores.iter().map(|s| s.user_id).collect();

        let mut badges_by_user: HashMap<i64, Vec<AwardedBadge>> = HashMap::new();
        for badge in self.user_badge_repo.list_badges_for_users(&user_ids).await? {
            badges_by_user
                .entry(badge.user_id)
                .or_default()
                .push(AwardedBadge::from(&badge));
        }

        Ok(scores
            .into_iter()
            .enumerate()
            .map(|(index, score)| LeaderboardEntry {
                rank: index + 1,
                user_id: score.user_id,
                total_points: score.total_points,
                badges: badges_by_user.remove(&score.user_id).unwrap_or_default(),
            })
            .collect())
    }
}

pub(crate) fn ensure_user_id(user_id: i64) -> Result<()> {
    if user_id <= 0 {
        return Err(ScoringError::Validation(format!(
            "用户 ID 必须为正整数: {user_id}"
        )));
    }
    Ok(())
}
