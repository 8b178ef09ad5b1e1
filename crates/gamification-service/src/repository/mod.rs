//! 数据库仓储层
//!
//! 提供所有实体的数据访问接口，封装 SQL 操作细节。
//!
//! ## 设计原则
//!
//! - 仓储只负责数据持久化，不包含业务逻辑
//! - 使用 SQLx 进行 PostgreSQL 访问，连接池由调用方注入
//! - 积分累加是唯一的同步点：单条 upsert 在数据库内串行化并发写者
//! - 定义 trait 接口以支持 mock 测试与内存实现

mod badge_repo;
mod challenge_repo;
pub mod memory;
mod score_repo;
mod traits;
mod user_badge_repo;

pub use badge_repo::BadgeRepository;
pub use challenge_repo::ChallengeRepository;
pub use memory::InMemoryStore;
pub use score_repo::ScoreRepository;
pub use traits::*;
pub use user_badge_repo::UserBadgeRepository;
