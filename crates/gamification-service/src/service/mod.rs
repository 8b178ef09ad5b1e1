//! 业务服务层
//!
//! - [`PointCalculator`]：行为类型到积分的映射
//! - [`ScoreUpdater`]：校验并原子累加积分
//! - [`BadgeEvaluator`]：按新总分授予达到门槛且未持有的徽章
//! - [`ActionService`]：串联以上三步处理一次用户行为
//! - [`QueryService`] / [`ChallengeService`]：只读查询与挑战参与

pub mod action_service;
pub mod badge_evaluator;
pub mod challenge_service;
pub mod dto;
pub mod points;
pub mod query_service;
pub mod score_updater;

pub use action_service::{ActionService, ActionStage};
pub use badge_evaluator::{BadgeEvaluation, BadgeEvaluator};
pub use challenge_service::ChallengeService;
pub use dto::*;
pub use points::PointCalculator;
pub use query_service::QueryService;
pub use score_updater::ScoreUpdater;
