//! 集成测试公共夹具

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use gamification::models::{Badge, Challenge, ChallengeType};
use gamification::repository::InMemoryStore;
use gamification::service::{ActionService, BadgeEvaluator, ScoreUpdater};

pub type MemoryActionService = ActionService<InMemoryStore, InMemoryStore, InMemoryStore>;

pub fn badge(id: i64, code: &str, name: &str, points_required: i64) -> Badge {
    Badge {
        id,
        code: code.to_string(),
        name: name.to_string(),
        description: None,
        points_required,
    }
}

/// 与迁移种子一致的目录
pub fn seed_catalog() -> Vec<Badge> {
    vec![
        badge(1, "DEBUTANT", "Débutant", 100),
        badge(2, "CONFIRME", "Confirmé", 250),
        badge(3, "EXPERT", "Expert", 500),
        badge(4, "LEGENDE", "Légende", 1000),
    ]
}

pub fn challenge(id: i64, title: &str, start: (i32, u32, u32), end: (i32, u32, u32)) -> Challenge {
    Challenge {
        id,
        title: title.to_string(),
        description: None,
        goal: 5,
        reward_points: 50,
        start_date: NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
        end_date: NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        challenge_type: ChallengeType::Individuel,
    }
}

pub fn store_with(catalog: Vec<Badge>) -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::new().with_catalog(catalog))
}

pub fn action_service(store: &Arc<InMemoryStore>) -> MemoryActionService {
    ActionService::new(store.clone(), store.clone(), store.clone())
}

pub fn score_updater(store: &Arc<InMemoryStore>) -> ScoreUpdater<InMemoryStore> {
    ScoreUpdater::new(store.clone())
}

pub fn badge_evaluator(store: &Arc<InMemoryStore>) -> BadgeEvaluator<InMemoryStore, InMemoryStore> {
    BadgeEvaluator::new(store.clone(), store.clone())
}

pub fn codes(badges: &[gamification::models::AwardedBadge]) -> Vec<&str> {
    badges.iter().map(|b| b.code.as_str()).collect()
}
