//! 徽章评估
//!
//! 给定用户的新总分，授予所有门槛不高于总分且尚未持有的徽章。
//!
//! ## 评估流程
//!
//! 1. 读取完整目录并校验（编码唯一、门槛非负）
//! 2. 读取用户已持有的徽章
//! 3. 按门槛升序逐个授予，单个徽章失败不影响其余徽章
//!
//! 授予依赖存储层的冲突容忍写入：同一用户的并发评估最多只有一次写入成功，
//! 另一方得到"已存在"并静默跳过。重复评估同一总分不会产生新的徽章。

use std::collections::HashSet;
use std::sync::Arc;

use gamification_shared::observability::metrics;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ScoringError};
use crate::models::{AwardedBadge, Badge};
use crate::repository::{BadgeRepositoryTrait, UserBadgeRepositoryTrait};

/// 一次徽章评估的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BadgeEvaluation {
    /// 本次新授予的徽章，按门槛升序
    pub awarded: Vec<AwardedBadge>,
    /// 达到门槛但写入失败的徽章编码
    pub failed: Vec<String>,
    /// 评估未能执行（目录或持有记录读取失败）
    pub aborted: bool,
}

impl BadgeEvaluation {
    /// 评估整体未执行
    pub fn aborted() -> Self {
        Self {
            aborted: true,
            ..Self::default()
        }
    }

    /// 所有达到门槛的徽章都已处理
    pub fn is_complete(&self) -> bool {
        !self.aborted && self.failed.is_empty()
    }
}

/// 徽章评估器
pub struct BadgeEvaluator<BR, UBR>
where
    BR: BadgeRepositoryTrait + ?Sized,
    UBR: UserBadgeRepositoryTrait + ?Sized,
{
    badge_repo: Arc<BR>,
    user_badge_repo: Arc<UBR>,
}

impl<BR, UBR> BadgeEvaluator<BR, UBR>
where
    BR: BadgeRepositoryTrait + ?Sized,
    UBR: UserBadgeRepositoryTrait + ?Sized,
{
    pub fn new(badge_repo: Arc<BR>, user_badge_repo: Arc<UBR>) -> Self {
        Self {
            badge_repo,
            user_badge_repo,
        }
    }

    /// 评估并授予徽章，返回本次新授予的徽章
    ///
    /// 任一徽章写入失败时返回该错误，之前已写入的徽章保留
    pub async fn evaluate_badges(&self, user_id: i64, total_points: i64) -> Result<Vec<AwardedBadge>> {
        let evaluation = self.evaluate(user_id, total_points).await?;
        if let Some(code) = evaluation.failed.first() {
            return Err(ScoringError::Unavailable(format!("徽章 {code} 授予失败")));
        }
        Ok(evaluation.awarded)
    }

    /// 评估并授予徽章，逐个徽章隔离失败
    ///
    /// 目录或持有记录读取失败时整体返回错误，此时没有任何写入
    #[instrument(skip(self))]
    pub async fn evaluate(&self, user_id: i64, total_points: i64) -> Result<BadgeEvaluation> {
        if total_points < 0 {
            return Err(ScoringError::Validation(format!(
                "累计积分不能为负数: {total_points}"
            )));
        }

        let catalog = validate_catalog(self.badge_repo.list_catalog().await?)?;
        if catalog.is_empty() {
            return Ok(BadgeEvaluation::default());
        }

        let held = self.user_badge_repo.list_held_codes(user_id).await?;
        let mut evaluation = BadgeEvaluation::default();

        for badge in qualifying_badges(&catalog, &held, total_points) {
            match self.user_badge_repo.award(user_id, badge.id).await {
                Ok(true) => {
                    info!(user_id, code = %badge.code, total_points, "徽章已授予");
                    metrics::record_badge_award(&badge.code, "awarded");
                    evaluation.awarded.push(AwardedBadge::from(badge));
                }
                Ok(false) => {
                    debug!(user_id, code = %badge.code, "徽章已被并发授予，跳过");
                    metrics::record_badge_award(&badge.code, "duplicate");
                }
                Err(e) => {
                    warn!(user_id, code = %badge.code, error = %e, "徽章授予失败");
                    metrics::record_badge_award(&badge.code, "failed");
                    evaluation.failed.push(badge.code.clone());
                }
            }
        }

        Ok(evaluation)
    }
}

/// 校验目录并按门槛升序排列
///
/// 编码重复或门槛为负说明参考数据被破坏，不做任何授予
pub fn validate_catalog(mut catalog: Vec<Badge>) -> Result<Vec<Badge>> {
    let mut codes = HashSet::with_capacity(catalog.len());
    for badge in &catalog {
        if badge.points_required < 0 {
            return Err(ScoringError::CatalogCorrupted(format!(
                "徽章 {} 的门槛为负数: {}",
                badge.code, badge.points_required
            )));
        }
        if !codes.insert(badge.code.as_str()) {
            return Err(ScoringError::CatalogCorrupted(format!(
                "徽章编码重复: {}",
                badge.code
            )));
        }
    }

    catalog.sort_by_key(|b| (b.points_required, b.id));
    Ok(catalog)
}

/// 门槛不高于总分且未持有的徽章，保持目录顺序
pub fn qualifying_badges<'a>(
    catalog: &'a [Badge],
    held: &HashSet<String>,
    total_points: i64,
) -> Vec<&'a Badge> {
    catalog
        .iter()
        .filter(|b| b.is_unlocked_by(total_points) && !held.contains(&b.code))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::repository::{MockBadgeRepositoryTrait, MockUserBadgeRepositoryTrait};

    fn badge(id: i64, code: &str, points_required: i64) -> Badge {
        Badge {
            id,
            code: code.to_string(),
            name: code.to_lowercase(),
            description: None,
            points_required,
        }
    }

    fn catalog() -> Vec<Badge> {
        vec![
            badge(1, "DEBUTANT", 100),
            badge(2, "CONFIRME", 120),
            badge(3, "EXPERT", 500),
        ]
    }

    fn held(codes: &[&str]) -> HashSet<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    fn evaluator(
        badge_repo: MockBadgeRepositoryTrait,
        user_badge_repo: MockUserBadgeRepositoryTrait,
    ) -> BadgeEvaluator<MockBadgeRepositoryTrait, MockUserBadgeRepositoryTrait> {
        BadgeEvaluator::new(Arc::new(badge_repo), Arc::new(user_badge_repo))
    }

    #[test]
    fn test_qualifying_badges_excludes_held_and_locked() {
        let catalog = catalog();
        let codes: Vec<&str> = qualifying_badges(&catalog, &held(&["DEBUTANT"]), 120)
            .into_iter()
            .map(|b| b.code.as_str())
            .collect();
        assert_eq!(codes, vec!["CONFIRME"]);
    }

    #[test]
    fn test_qualifying_badges_boundary() {
        let catalog = catalog();
        assert!(qualifying_badges(&catalog, &held(&[]), 99).is_empty());
        assert_eq!(qualifying_badges(&catalog, &held(&[]), 100).len(), 1);
    }

    #[test]
    fn test_validate_catalog_sorts() {
        let sorted = validate_catalog(vec![badge(3, "EXPERT", 500), badge(1, "DEBUTANT", 100)]).unwrap();
        assert_eq!(sorted[0].code, "DEBUTANT");
    }

    #[test]
    fn test_validate_catalog_rejects_duplicates() {
        let err = validate_catalog(vec![badge(1, "DEBUTANT", 100), badge(2, "DEBUTANT", 200)])
            .unwrap_err();
        assert!(matches!(err, ScoringError::CatalogCorrupted(_)));
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_validate_catalog_rejects_negative_threshold() {
        let err = validate_catalog(vec![badge(1, "DEBUTANT", -1)]).unwrap_err();
        assert!(matches!(err, ScoringError::CatalogCorrupted(_)));
    }

    #[tokio::test]
    async fn test_awards_newly_reached_badge_only() {
        let mut badge_repo = MockBadgeRepositoryTrait::new();
        badge_repo.expect_list_catalog().returning(|| Ok(catalog()));

        let mut user_badge_repo = MockUserBadgeRepositoryTrait::new();
        user_badge_repo
            .expect_list_held_codes()
            .returning(|_| Ok(held(&["DEBUTANT"])));
        user_badge_repo
            .expect_award()
            .withf(|user_id, badge_id| *user_id == 1 && *badge_id == 2)
            .times(1)
            .returning(|_, _| Ok(true));

        let awarded = evaluator(badge_repo, user_badge_repo)
            .evaluate_badges(1, 120)
            .await
            .unwrap();
        assert_eq!(awarded, vec![AwardedBadge { code: "CONFIRME".into(), name: "confirme".into() }]);
    }

    #[tokio::test]
    async fn test_multiple_thresholds_in_ascending_order() {
        let mut badge_repo = MockBadgeRepositoryTrait::new();
        badge_repo.expect_list_catalog().returning(|| Ok(catalog()));

        let mut user_badge_repo = MockUserBadgeRepositoryTrait::new();
        user_badge_repo.expect_list_held_codes().returning(|_| Ok(held(&[])));
        user_badge_repo.expect_award().times(3).returning(|_, _| Ok(true));

        let codes: Vec<String> = evaluator(badge_repo, user_badge_repo)
            .evaluate_badges(1, 600)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.code)
            .collect();
        assert_eq!(codes, vec!["DEBUTANT", "CONFIRME", "EXPERT"]);
    }

    #[tokio::test]
    async fn test_concurrent_duplicate_is_skipped() {
        let mut badge_repo = MockBadgeRepositoryTrait::new();
        badge_repo.expect_list_catalog().returning(|| Ok(catalog()));

        let mut user_badge_repo = MockUserBadgeRepositoryTrait::new();
        user_badge_repo.expect_list_held_codes().returning(|_| Ok(held(&[])));
        user_badge_repo.expect_award().returning(|_, _| Ok(false));

        let evaluation = evaluator(badge_repo, user_badge_repo)
            .evaluate(1, 100)
            .await
            .unwrap();
        assert!(evaluation.awarded.is_empty());
        assert!(evaluation.is_complete());
    }

    #[tokio::test]
    async fn test_single_failure_does_not_block_others() {
        let mut badge_repo = MockBadgeRepositoryTrait::new();
        badge_repo.expect_list_catalog().returning(|| Ok(catalog()));

        let mut user_badge_repo = MockUserBadgeRepositoryTrait::new();
        user_badge_repo.expect_list_held_codes().returning(|_| Ok(held(&[])));
        user_badge_repo.expect_award().returning(|_, badge_id| {
            if badge_id == 1 {
                Err(ScoringError::Database(sqlx::Error::PoolTimedOut))
            } else {
                Ok(true)
            }
        });

        let evaluator = evaluator(badge_repo, user_badge_repo);
        let evaluation = evaluator.evaluate(1, 120).await.unwrap();
        assert_eq!(evaluation.failed, vec!["DEBUTANT".to_string()]);
        assert_eq!(evaluation.awarded.len(), 1);
        assert!(!evaluation.is_complete());

        assert!(evaluator.evaluate_badges(1, 120).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_catalog_skips_user_lookup() {
        let mut badge_repo = MockBadgeRepositoryTrait::new();
        badge_repo.expect_list_catalog().returning(|| Ok(vec![]));

        let mut user_badge_repo = MockUserBadgeRepositoryTrait::new();
        user_badge_repo.expect_list_held_codes().never();

        let awarded = evaluator(badge_repo, user_badge_repo)
            .evaluate_badges(1, 10_000)
            .await
            .unwrap();
        assert!(awarded.is_empty());
    }

    #[tokio::test]
    async fn test_corrupted_catalog_awards_nothing() {
        let mut badge_repo = MockBadgeRepositoryTrait::new();
        badge_repo
            .expect_list_catalog()
            .returning(|| Ok(vec![badge(1, "DEBUTANT", 100), badge(2, "DEBUTANT", 100)]));

        let mut user_badge_repo = MockUserBadgeRepositoryTrait::new();
        user_badge_repo.expect_award().never();

        let err = evaluator(badge_repo, user_badge_repo)
            .evaluate_badges(1, 500)
            .await
            .unwrap_err();
        assert!(matches!(err, ScoringError::CatalogCorrupted(_)));
    }
}
