//! 积分计算
//!
//! 纯函数，不访问任何外部状态

use crate::error::Result;
use crate::models::ActionType;

/// 积分计算器
pub struct PointCalculator;

impl PointCalculator {
    /// 返回行为对应的积分
    ///
    /// 未知行为返回 [`ScoringError::UnknownActionType`](crate::error::ScoringError::UnknownActionType)，
    /// 永远不会返回 0 分作为兜底
    pub fn points_for(action_type: &str) -> Result<i64> {
        Ok(action_type.parse::<ActionType>()?.points())
    }

    /// 完整的积分表
    pub fn table() -> impl Iterator<Item = (ActionType, i64)> {
        ActionType::ALL.into_iter().map(|a| (a, a.points()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_known_actions() {
        assert_eq!(PointCalculator::points_for("signalement").unwrap(), 10);
        assert_eq!(PointCalculator::points_for("validation").unwrap(), 5);
        assert_eq!(PointCalculator::points_for("collecte").unwrap(), 20);
    }

    #[test]
    fn test_unknown_action_is_invalid_input() {
        let err = PointCalculator::points_for("inconnu").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.error_code(), "UNKNOWN_ACTION_TYPE");
    }

    #[test]
    fn test_table_values_are_positive() {
        let table: Vec<_> = PointCalculator::table().collect();
        assert_eq!(table.len(), 3);
        assert!(table.iter().all(|(_, points)| *points > 0));
    }
}
