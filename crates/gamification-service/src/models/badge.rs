//! 徽章相关实体定义
//!
//! 徽章目录为只读参考数据，按 points_required 全序排列；
//! 用户徽章每个 (user_id, badge_id) 至多一行。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 徽章定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: i64,
    /// 业务唯一编码，如 DEBUTANT
    pub code: String,
    pub name: String,
    #[sqlx(default)]
    pub description: Option<String>,
    /// 解锁所需的累计积分（含边界）
    pub points_required: i64,
}

impl Badge {
    /// 给定累计积分是否达到解锁门槛
    pub fn is_unlocked_by(&self, total_points: i64) -> bool {
        total_points >= self.points_required
    }
}

/// 用户已获得的徽章
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserBadge {
    pub user_id: i64,
    pub badge_id: i64,
    pub earned_at: DateTime<Utc>,
}

/// 用户徽章详情（关联徽章定义）
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EarnedBadge {
    pub user_id: i64,
    pub badge_id: i64,
    pub code: String,
    pub name: String,
    pub points_required: i64,
    pub earned_at: DateTime<Utc>,
}

/// 本次新授予的徽章
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardedBadge {
    pub code: String,
    pub name: String,
}

impl From<&Badge> for AwardedBadge {
    fn from(badge: &Badge) -> Self {
        Self {
            code: badge.code.clone(),
            name: badge.name.clone(),
        }
    }
}

impl From<&EarnedBadge> for AwardedBadge {
    fn from(badge: &EarnedBadge) -> Self {
        Self {
            code: badge.code.clone(),
            name: badge.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn badge(points_required: i64) -> Badge {
        Badge {
            id: 1,
            code: "DEBUTANT".to_string(),
            name: "Débutant".to_string(),
            description: None,
            points_required,
        }
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let b = badge(100);
        assert!(!b.is_unlocked_by(99));
        assert!(b.is_unlocked_by(100));
        assert!(b.is_unlocked_by(101));
    }

    #[test]
    fn test_zero_threshold() {
        assert!(badge(0).is_unlocked_by(0));
    }

    #[test]
    fn test_badge_serializes_camel_case() {
        let value = serde_json::to_value(badge(100)).unwrap();
        assert_eq!(value["pointsRequired"], 100);
        assert_eq!(value["code"], "DEBUTANT");
    }
}
