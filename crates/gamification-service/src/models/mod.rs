//! 积分服务领域模型
//!
//! 包含行为类型、用户积分、徽章、挑战等核心实体定义

pub mod action;
pub mod badge;
pub mod challenge;
pub mod score;

pub use action::ActionType;
pub use badge::{AwardedBadge, Badge, EarnedBadge, UserBadge};
pub use challenge::{Challenge, ChallengeType, Participation, ParticipationStatus};
pub use score::{ActionRecord, UserScore};
