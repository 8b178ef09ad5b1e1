//! 用户行为处理
//!
//! 一次行为依次经过：校验 -> 计算积分 -> 累加积分 -> 评估徽章。
//!
//! ## 失败语义
//!
//! - 校验失败：不产生任何写入
//! - 积分写入失败：整体失败，不进行徽章评估，可安全重试
//! - 徽章评估失败：积分已提交且不回滚，响应中 `badgesIncomplete = true`，
//!   缺失的徽章在下一次行为时由评估器补发

use std::sync::Arc;
use std::time::Instant;

use gamification_shared::observability::metrics;
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ScoringError};
use crate::models::ActionType;
use crate::repository::{BadgeRepositoryTrait, ScoreRepositoryTrait, UserBadgeRepositoryTrait};
use crate::service::badge_evaluator::{BadgeEvaluation, BadgeEvaluator};
use crate::service::dto::ActionResult;
use crate::service::score_updater::ScoreUpdater;

/// 行为处理阶段
///
/// 只能按声明顺序前进，任一阶段失败进入 `Rejected`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStage {
    Received,
    Validated,
    PointsCalculated,
    ScoreUpdated,
    BadgesEvaluated,
    Completed,
    Rejected,
}

impl ActionStage {
    /// 下一个阶段，终态返回 `None`
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Received => Some(Self::Validated),
            Self::Validated => Some(Self::PointsCalculated),
            Self::PointsCalculated => Some(Self::ScoreUpdated),
            Self::ScoreUpdated => Some(Self::BadgesEvaluated),
            Self::BadgesEvaluated => Some(Self::Completed),
            Self::Completed | Self::Rejected => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.next().is_none()
    }

    /// 积分是否已经提交
    pub fn score_committed(self) -> bool {
        matches!(
            self,
            Self::ScoreUpdated | Self::BadgesEvaluated | Self::Completed
        )
    }
}

/// 单次请求的阶段跟踪
#[derive(Debug)]
struct StageTracker {
    user_id: i64,
    stage: ActionStage,
}

impl StageTracker {
    fn new(user_id: i64) -> Self {
        Self {
            user_id,
            stage: ActionStage::Received,
        }
    }

    fn advance(&mut self, to: ActionStage) {
        debug_assert_eq!(self.stage.next(), Some(to), "非法的阶段跳转");
        debug!(user_id = self.user_id, from = ?self.stage, to = ?to, "行为处理阶段推进");
        self.stage = to;
    }

    fn reject(&mut self, error: &ScoringError) {
        debug!(user_id = self.user_id, at = ?self.stage, error = %error, "行为处理终止");
        self.stage = ActionStage::Rejected;
    }
}

/// 用户行为服务
pub struct ActionService<SR, BR, UBR>
where
    SR: ScoreRepositoryTrait + ?Sized,
    BR: BadgeRepositoryTrait + ?Sized,
    UBR: UserBadgeRepositoryTrait + ?Sized,
{
    score_updater: ScoreUpdater<SR>,
    badge_evaluator: BadgeEvaluator<BR, UBR>,
}

impl<SR, BR, UBR> ActionService<SR, BR, UBR>
where
    SR: ScoreRepositoryTrait + ?Sized,
    BR: BadgeRepositoryTrait + ?Sized,
    UBR: UserBadgeRepositoryTrait + ?Sized,
{
    pub fn new(score_repo: Arc<SR>, badge_repo: Arc<BR>, user_badge_repo: Arc<UBR>) -> Self {
        Self {
            score_updater: ScoreUpdater::new(score_repo),
            badge_evaluator: BadgeEvaluator::new(badge_repo, user_badge_repo),
        }
    }

    /// 处理一次用户行为
    ///
    /// 返回本次加分、新总分与新授予的徽章
    #[instrument(skip(self))]
    pub async fn process_action(&self, user_id: i64, action_type: &str) -> Result<ActionResult> {
        let started = Instant::now();
        let mut tracker = StageTracker::new(user_id);

        let result = self.run(user_id, action_type, &mut tracker).await;

        // 未知类型统一归为 unknown，避免指标标签基数失控
        let label = action_type
            .parse::<ActionType>()
            .map(ActionType::as_str)
            .unwrap_or("unknown");
        let outcome = match &result {
            Ok(r) if r.badges_incomplete => "partial",
            Ok(_) => "completed",
            Err(e) if e.is_invalid_input() => "rejected",
            Err(_) => "failed",
        };
        metrics::record_action(label, outcome, started.elapsed().as_secs_f64());

        result
    }

    async fn run(
        &self,
        user_id: i64,
        action_type: &str,
        tracker: &mut StageTracker,
    ) -> Result<ActionResult> {
        let action = match validate(user_id, action_type) {
            Ok(action) => action,
            Err(e) => {
                tracker.reject(&e);
                return Err(e);
            }
        };
        tracker.advance(ActionStage::Validated);

        let points = action.points();
        tracker.advance(ActionStage::PointsCalculated);

        let total_points = match self.score_updater.apply_action(user_id, action).await {
            Ok(total) => total,
            Err(e) => {
                tracker.reject(&e);
                return Err(e);
            }
        };
        tracker.advance(ActionStage::ScoreUpdated);
        metrics::record_points_awarded(action.as_str(), points.unsigned_abs());

        let evaluation = match self.badge_evaluator.evaluate(user_id, total_points).await {
            Ok(evaluation) => evaluation,
            Err(e) => {
                // 积分已提交，不回滚
                warn!(user_id, total_points, error = %e, "徽章评估失败，积分已入账");
                BadgeEvaluation::aborted()
            }
        };
        tracker.advance(ActionStage::BadgesEvaluated);

        let badges_incomplete = !evaluation.is_complete();
        let result = ActionResult {
            points_added: points,
            total_points,
            new_badges: evaluation.awarded,
            badges_incomplete,
        };
        tracker.advance(ActionStage::Completed);

        info!(
            user_id,
            action_type = %action,
            points,
            total_points,
            new_badges = result.new_badges.len(),
            badges_incomplete,
            "行为处理完成"
        );

        Ok(result)
    }
}

fn validate(user_id: i64, action_type: &str) -> Result<ActionType> {
    if user_id <= 0 {
        return Err(ScoringError::Validation(format!(
            "用户 ID 必须为正整数: {user_id}"
        )));
    }
    action_type.parse()
}
