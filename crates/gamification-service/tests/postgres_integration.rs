//! PostgreSQL 集成测试
//!
//! 验证 upsert 累加与冲突容忍授予在真实数据库上的并发语义。
//!
//! ## 运行方式
//!
//! ```bash
//! DATABASE_URL=postgres://... cargo test --test postgres_integration -- --ignored
//! ```

use std::sync::Arc;

use futures::future::join_all;
use gamification::repository::{
    ChallengeRepository, ScoreRepository, UserBadgeRepository, UserBadgeRepositoryTrait,
};
use gamification::{AppState, MIGRATOR};
use gamification_shared::config::LeaderboardConfig;
use gamification_shared::database::Database;
use gamification_shared::test_utils::{test_database_config, test_user_id};
use sqlx::PgPool;

// ==================== 辅助函数 ====================

async fn setup() -> PgPool {
    let db = Database::connect(&test_database_config())
        .await
        .expect("数据库连接失败");
    db.run_migrations(&MIGRATOR).await.expect("迁移失败");
    db.pool().clone()
}

async fn badge_id(pool: &PgPool, code: &str) -> i64 {
    sqlx::query_scalar("SELECT id FROM badges WHERE code = $1")
        .bind(code)
        .fetch_one(pool)
        .await
        .expect("种子徽章缺失")
}

// ==================== 测试 ====================

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_concurrent_increments_on_postgres() {
    const N: i64 = 50;
    let pool = setup().await;
    let repo = Arc::new(ScoreRepository::new(pool.clone()));
    let user_id = test_user_id();

    let handles: Vec<_> = (0..N)
        .map(|_| {
            let repo = repo.clone();
            tokio::spawn(async move { repo.increment_score(user_id, 1, None).await })
        })
        .collect();

    for joined in join_all(handles).await {
        joined.unwrap().unwrap();
    }

    let score = repo.get_score(user_id).await.unwrap().unwrap();
    assert_eq!(score.total_points, N);
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_award_is_conflict_tolerant_on_postgres() {
    let pool = setup().await;
    let repo = UserBadgeRepository::new(pool.clone());
    let user_id = test_user_id();
    let debutant = badge_id(&pool, "DEBUTANT").await;

    assert!(repo.award(user_id, debutant).await.unwrap());
    assert!(!repo.award(user_id, debutant).await.unwrap());

    let held = UserBadgeRepositoryTrait::list_held_codes(&repo, user_id)
        .await
        .unwrap();
    assert_eq!(held.len(), 1);
    assert!(held.contains("DEBUTANT"));
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_process_action_end_to_end() {
    let pool = setup().await;
    let state = AppState::postgres(pool.clone(), LeaderboardConfig::default());
    let user_id = test_user_id();

    let first = state
        .action_service
        .process_action(user_id, "signalement")
        .await
        .unwrap();
    assert_eq!(first.points_added, 10);
    assert_eq!(first.total_points, 10);
    assert!(first.new_badges.is_empty());

    let repo = ScoreRepository::new(pool.clone());
    repo.increment_score(user_id, 85, None).await.unwrap();

    let second = state
        .action_service
        .process_action(user_id, "validation")
        .await
        .unwrap();
    assert_eq!(second.total_points, 100);
    assert_eq!(second.new_badges.len(), 1);
    assert_eq!(second.new_badges[0].code, "DEBUTANT");

    let actions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_actions WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(actions, 2);
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_unknown_action_writes_nothing_on_postgres() {
    let pool = setup().await;
    let state = AppState::postgres(pool.clone(), LeaderboardConfig::default());
    let user_id = test_user_id();

    assert!(
        state
            .action_service
            .process_action(user_id, "inconnu")
            .await
            .is_err()
    );

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_scores WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 0);
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_concurrent_actions_award_once_on_postgres() {
    let pool = setup().await;
    let state = AppState::postgres(pool.clone(), LeaderboardConfig::default());
    let user_id = test_user_id();

    let handles: Vec<_> = (0..12)
        .map(|_| {
            let service = state.action_service.clone();
            tokio::spawn(async move { service.process_action(user_id, "signalement").await })
        })
        .collect();

    let awarded: usize = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .flat_map(|r| r.new_badges)
        .filter(|b| b.code == "DEBUTANT")
        .count();
    assert_eq!(awarded, 1);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_badges WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
#[ignore = "需要 PostgreSQL"]
async fn test_join_challenge_idempotent_on_postgres() {
    let pool = setup().await;
    let challenge_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO challenges (title, goal, reward_points, start_date, end_date, challenge_type)
        VALUES ('IntegTest', 3, 30, CURRENT_DATE, CURRENT_DATE + 7, 'INDIVIDUEL')
        RETURNING id
        "#,
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    let repo = ChallengeRepository::new(pool.clone());
    let user_id = test_user_id();

    let first = repo.join(challenge_id, user_id).await.unwrap();
    let second = repo.join(challenge_id, user_id).await.unwrap();
    assert_eq!(first.id, second.id);

    let listed = repo.list_user_participations(user_id).await.unwrap();
    assert_eq!(listed.len(), 1);
}
