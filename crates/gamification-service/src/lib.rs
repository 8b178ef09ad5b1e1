//! 积分与徽章服务
//!
//! 记录用户行为，按行为类型累加积分，并在累计积分跨过门槛时授予徽章。
//!
//! ## 核心功能
//!
//! - **积分计算**：封闭的行为类型表（signalement / validation / collecte）
//! - **积分累加**：单条 upsert 原子累加，并发请求不会丢失增量
//! - **徽章评估**：授予所有达到门槛且未持有的徽章，重复评估幂等
//! - **查询**：徽章目录、用户积分与徽章、排行榜
//! - **挑战**：挑战列表与参与登记
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `repository`: 仓储层（PostgreSQL 与内存实现）
//! - `service`: 业务服务层
//! - `http`: REST 接口

pub mod error;
pub mod http;
pub mod models;
pub mod repository;
pub mod service;

pub use error::{ErrorKind, Result, ScoringError};
pub use http::{AppState, build_app};
pub use models::*;
pub use repository::{
    BadgeRepository, ChallengeRepository, InMemoryStore, ScoreRepository, UserBadgeRepository,
};
pub use service::{
    ActionResult, ActionService, ActionStage, BadgeEvaluation, BadgeEvaluator, ChallengeService,
    PointCalculator, QueryService, ScoreUpdater, dto,
};

/// 服务名，用于配置加载与日志标识
pub const SERVICE_NAME: &str = "gamification-service";

/// 内嵌的数据库迁移
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
