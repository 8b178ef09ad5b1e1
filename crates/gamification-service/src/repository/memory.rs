//! 内存存储
//!
//! 使用 DashMap 实现的仓储，适用于测试、本地开发和无数据库演示。
//!
//! 与 PostgreSQL 实现遵守相同的并发语义：
//! - 积分累加在单个分片锁内完成读改写，并发增量不会丢失
//! - 徽章授予以 (user_id, badge_id) 为键，重复写入返回 `false`
//!
//! 另外提供故障注入开关，用于验证持久层失败时的行为。

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::{Mutex, RwLock};

use super::traits::{
    BadgeRepositoryTrait, ChallengeRepositoryTrait, ScoreRepositoryTrait,
    UserBadgeRepositoryTrait,
};
use crate::error::{Result, ScoringError};
use crate::models::{
    ActionRecord, ActionType, Badge, Challenge, EarnedBadge, Participation, ParticipationStatus,
    UserScore,
};

/// 故障注入开关
#[derive(Debug, Default)]
struct Faults {
    score_writes: AtomicBool,
    catalog_reads: AtomicBool,
    badge_awards: Mutex<HashSet<i64>>,
    score_write_delay: Mutex<Option<Duration>>,
}

/// 内存仓储
///
/// 同时实现全部仓储 trait，可用 `Arc` 共享给各个服务
#[derive(Debug, Default)]
pub struct InMemoryStore {
    scores: DashMap<i64, UserScore>,
    actions: Mutex<Vec<ActionRecord>>,
    catalog: RwLock<Vec<Badge>>,
    user_badges: DashMap<(i64, i64), DateTime<Utc>>,
    challenges: RwLock<Vec<Challenge>>,
    participations: DashMap<(i64, i64), Participation>,
    next_id: AtomicI64,
    faults: Faults,
}

impl InMemoryStore {
    /// 创建空存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建共享实例
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// 使用给定徽章目录
    pub fn with_catalog(self, catalog: Vec<Badge>) -> Self {
        *self.catalog.write() = catalog;
        self
    }

    /// 使用给定挑战列表
    pub fn with_challenges(self, challenges: Vec<Challenge>) -> Self {
        *self.challenges.write() = challenges;
        self
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    // ==================== 初始数据 ====================

    /// 直接设置用户积分（不写流水）
    pub fn seed_score(&self, user_id: i64, total_points: i64) {
        self.scores.insert(
            user_id,
            UserScore {
                user_id,
                total_points,
                updated_at: Utc::now(),
            },
        );
    }

    /// 直接授予徽章（按编码）
    ///
    /// 编码不在目录中时返回 `false`
    pub fn seed_user_badge(&self, user_id: i64, code: &str) -> bool {
        let Some(badge_id) = self.badge_id_by_code(code) else {
            return false;
        };
        self.user_badges.insert((user_id, badge_id), Utc::now());
        true
    }

    // ==================== 状态检查 ====================

    /// 用户当前积分，无记录时为 `None`
    pub fn score_of(&self, user_id: i64) -> Option<i64> {
        self.scores.get(&user_id).map(|s| s.total_points)
    }

    /// 用户的行为流水
    pub fn actions_of(&self, user_id: i64) -> Vec<ActionRecord> {
        self.actions
            .lock()
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect()
    }

    /// 用户持有的徽章行数
    pub fn badge_rows_of(&self, user_id: i64) -> usize {
        self.user_badges
            .iter()
            .filter(|entry| entry.key().0 == user_id)
            .count()
    }

    /// 积分记录总数
    pub fn score_rows(&self) -> usize {
        self.scores.len()
    }

    // ==================== 故障注入 ====================

    /// 积分写入失败（模拟持久层不可达）
    pub fn fail_score_writes(&self, enabled: bool) {
        self.faults.score_writes.store(enabled, Ordering::SeqCst);
    }

    /// 积分写入前等待给定时长，模拟持久层卡顿
    pub fn delay_score_writes(&self, delay: Option<Duration>) {
        *self.faults.score_write_delay.lock() = delay;
    }

    /// 徽章目录读取失败
    pub fn fail_catalog_reads(&self, enabled: bool) {
        self.faults.catalog_reads.store(enabled, Ordering::SeqCst);
    }

    /// 指定徽章的授予失败
    pub fn fail_badge_award(&self, code: &str, enabled: bool) {
        let Some(badge_id) = self.badge_id_by_code(code) else {
            return;
        };
        let mut failing = self.faults.badge_awards.lock();
        if enabled {
            failing.insert(badge_id);
        } else {
            failing.remove(&badge_id);
        }
    }

    fn badge_id_by_code(&self, code: &str) -> Option<i64> {
        self.catalog
            .read()
            .iter()
            .find(|b| b.code == code)
            .map(|b| b.id)
    }

    fn earned_badge(&self, user_id: i64, badge_id: i64, earned_at: DateTime<Utc>) -> Option<EarnedBadge> {
        self.catalog
            .read()
            .iter()
            .find(|b| b.id == badge_id)
            .map(|b| EarnedBadge {
                user_id,
                badge_id,
                code: b.code.clone(),
                name: b.name.clone(),
                points_required: b.points_required,
                earned_at,
            })
    }
}

fn unavailable(what: &str) -> ScoringError {
    ScoringError::Unavailable(format!("内存存储故障注入: {what}"))
}

#[async_trait]
impl ScoreRepositoryTrait for InMemoryStore {
    async fn increment_score(
        &self,
        user_id: i64,
        delta: i64,
        action: Option<ActionType>,
    ) -> Result<i64> {
        if self.faults.score_writes.load(Ordering::SeqCst) {
            return Err(unavailable("score write"));
        }
        let delay = *self.faults.score_write_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let now = Utc::now();
        // 分片写锁覆盖读改写与流水写入
        let mut entry = self.scores.entry(user_id).or_insert_with(|| UserScore {
            user_id,
            total_points: 0,
            updated_at: now,
        });
        // 与 PostgreSQL 的 bigint 溢出（SQLSTATE 22003）一致，拒绝写入
        entry.total_points = entry.total_points.checked_add(delta).ok_or_else(|| {
            ScoringError::Internal(format!("用户 {user_id} 积分溢出"))
        })?;
        entry.updated_at = now;
        let total = entry.total_points;

        if let Some(action_type) = action {
            self.actions.lock().push(ActionRecord {
                id: self.next_id(),
                user_id,
                action_type,
                points: delta,
                created_at: now,
            });
        }

        Ok(total)
    }

    async fn get_score(&self, user_id: i64) -> Result<Option<UserScore>> {
        Ok(self.scores.get(&user_id).map(|s| s.clone()))
    }

    async fn top_scores(&self, limit: i64) -> Result<Vec<UserScore>> {
        let mut scores: Vec<UserScore> = self.scores.iter().map(|e| e.value().clone()).collect();
        scores.sort_by(|a, b| {
            b.total_points
                .cmp(&a.total_points)
                .then(a.user_id.cmp(&b.user_id))
        });
        scores.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(scores)
    }
}

#[async_trait]
impl BadgeRepositoryTrait for InMemoryStore {
    async fn list_catalog(&self) -> Result<Vec<Badge>> {
        if self.faults.catalog_reads.load(Ordering::SeqCst) {
            return Err(unavailable("catalog read"));
        }

        let mut catalog = self.catalog.read().clone();
        catalog.sort_by_key(|b| (b.points_required, b.id));
        Ok(catalog)
    }
}

#[async_trait]
impl UserBadgeRepositoryTrait for InMemoryStore {
    async fn list_held_codes(&self, user_id: i64) -> Result<HashSet<String>> {
        let held: HashSet<i64> = self
            .user_badges
            .iter()
            .filter(|entry| entry.key().0 == user_id)
            .map(|entry| entry.key().1)
            .collect();

        Ok(self
            .catalog
            .read()
            .iter()
            .filter(|b| held.contains(&b.id))
            .map(|b| b.code.clone())
            .collect())
    }

    async fn award(&self, user_id: i64, badge_id: i64) -> Result<bool> {
        if self.faults.badge_awards.lock().contains(&badge_id) {
            return Err(unavailable("badge award"));
        }

        match self.user_badges.entry((user_id, badge_id)) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(Utc::now());
                Ok(true)
            }
        }
    }

    async fn list_user_badges(&self, user_id: i64) -> Result<Vec<EarnedBadge>> {
        self.list_badges_for_users(&[user_id]).await
    }

    async fn list_badges_for_users(&self, user_ids: &[i64]) -> Result<Vec<EarnedBadge>> {
        let rows: Vec<(i64, i64, DateTime<Utc>)> = self
            .user_badges
            .iter()
            .filter(|entry| user_ids.contains(&entry.key().0))
            .map(|entry| (entry.key().0, entry.key().1, *entry.value()))
            .collect();

        let mut badges: Vec<EarnedBadge> = rows
            .into_iter()
            .filter_map(|(user_id, badge_id, earned_at)| self.earned_badge(user_id, badge_id, earned_at))
            .collect();
        badges.sort_by_key(|b| (b.user_id, b.points_required, b.badge_id));
        Ok(badges)
    }
}

#[async_trait]
impl ChallengeRepositoryTrait for InMemoryStore {
    async fn list_challenges(&self, active_on: Option<NaiveDate>) -> Result<Vec<Challenge>> {
        let mut challenges: Vec<Challenge> = self
            .challenges
            .read()
            .iter()
            .filter(|c| active_on.is_none_or(|date| c.is_active_on(date)))
            .cloned()
            .collect();
        challenges.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(a.id.cmp(&b.id)));
        Ok(challenges)
    }

    async fn get_challenge(&self, id: i64) -> Result<Option<Challenge>> {
        Ok(self.challenges.read().iter().find(|c| c.id == id).cloned())
    }

    async fn join(&self, challenge_id: i64, user_id: i64) -> Result<Participation> {
        let participation = self
            .participations
            .entry((challenge_id, user_id))
            .or_insert_with(|| Participation {
                id: self.next_id(),
                challenge_id,
                user_id,
                progress: 0,
                status: ParticipationStatus::EnCours,
                updated_at: Utc::now(),
            });
        Ok(participation.clone())
    }

    async fn list_user_participations(&self, user_id: i64) -> Result<Vec<Participation>> {
        let mut participations: Vec<Participation> = self
            .participations
            .iter()
            .filter(|entry| entry.key().1 == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        participations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(participations)
    }
}
