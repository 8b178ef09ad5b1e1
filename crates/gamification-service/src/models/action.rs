//! 行为类型
//!
//! 封闭枚举，每种行为对应固定分值，运行期不可修改。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScoringError;

/// 用户行为类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum ActionType {
    /// 上报问题
    Signalement,
    /// 确认他人的上报
    Validation,
    /// 参与收集活动
    Collecte,
}

impl ActionType {
    /// 所有行为类型
    pub const ALL: [ActionType; 3] = [Self::Signalement, Self::Validation, Self::Collecte];

    /// 该行为对应的积分
    pub const fn points(self) -> i64 {
        match self {
            Self::Signalement => 10,
            Self::Validation => 5,
            Self::Collecte => 20,
        }
    }

    /// 对外使用的名称
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Signalement => "signalement",
            Self::Validation => "validation",
            Self::Collecte => "collecte",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = ScoringError;

    /// 精确匹配（区分大小写，不裁剪空白）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ScoringError::UnknownActionType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_names() {
        for action in ActionType::ALL {
            assert_eq!(action.as_str().parse::<ActionType>().unwrap(), action);
        }
    }

    #[test]
    fn test_parse_is_exact() {
        assert!("Signalement".parse::<ActionType>().is_err());
        assert!(" signalement".parse::<ActionType>().is_err());
        assert!("".parse::<ActionType>().is_err());
    }

    #[test]
    fn test_serde_uses_lowercase() {
        let json = serde_json::to_string(&ActionType::Collecte).unwrap();
        assert_eq!(json, "\"collecte\"");
    }
}
