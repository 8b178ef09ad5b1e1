//! 应用状态定义
//!
//! 服务以 trait 对象持有仓储，PostgreSQL 与内存实现共用同一套路由

use std::sync::Arc;

use gamification_shared::config::LeaderboardConfig;
use sqlx::PgPool;

use crate::repository::{
    BadgeRepository, BadgeRepositoryTrait, ChallengeRepository, ChallengeRepositoryTrait,
    InMemoryStore, ScoreRepository, ScoreRepositoryTrait, UserBadgeRepository,
    UserBadgeRepositoryTrait,
};
use crate::service::{ActionService, ChallengeService, QueryService};

pub type DynActionService =
    ActionService<dyn ScoreRepositoryTrait, dyn BadgeRepositoryTrait, dyn UserBadgeRepositoryTrait>;
pub type DynQueryService =
    QueryService<dyn ScoreRepositoryTrait, dyn BadgeRepositoryTrait, dyn UserBadgeRepositoryTrait>;
pub type DynChallengeService = ChallengeService<dyn ChallengeRepositoryTrait>;

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    pub action_service: Arc<DynActionService>,
    pub query_service: Arc<DynQueryService>,
    pub challenge_service: Arc<DynChallengeService>,
    pub leaderboard: LeaderboardConfig,
}

impl AppState {
    /// 由任意仓储实现组装
    pub fn new(
        score_repo: Arc<dyn ScoreRepositoryTrait>,
        badge_repo: Arc<dyn BadgeRepositoryTrait>,
        user_badge_repo: Arc<dyn UserBadgeRepositoryTrait>,
        challenge_repo: Arc<dyn ChallengeRepositoryTrait>,
        leaderboard: LeaderboardConfig,
    ) -> Self {
        Self {
            action_service: Arc::new(ActionService::new(
                score_repo.clone(),
                badge_repo.clone(),
                user_badge_repo.clone(),
            )),
            query_service: Arc::new(QueryService::new(score_repo, badge_repo, user_badge_repo)),
            challenge_service: Arc::new(ChallengeService::new(challenge_repo)),
            leaderboard,
        }
    }

    /// PostgreSQL 仓储
    pub fn postgres(pool: PgPool, leaderboard: LeaderboardConfig) -> Self {
        Self::new(
            Arc::new(ScoreRepository::new(pool.clone())),
            Arc::new(BadgeRepository::new(pool.clone())),
            Arc::new(UserBadgeRepository::new(pool.clone())),
            Arc::new(ChallengeRepository::new(pool)),
            leaderboard,
        )
    }

    /// 内存仓储（测试与本地演示）
    pub fn in_memory(store: Arc<InMemoryStore>, leaderboard: LeaderboardConfig) -> Self {
        Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            leaderboard,
        )
    }
}
