//! HTTP 处理器
//!
//! 提取器失败统一转换为 400 信封响应，不使用 axum 默认的纯文本拒绝

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Json, Path, Query};

use crate::error::{Result, ScoringError};

pub mod action;
pub mod badge;
pub mod challenge;
pub mod health;
pub mod leaderboard;
pub mod user;

pub(crate) fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| ScoringError::Validation(e.body_text()))
}

pub(crate) fn path_param<T>(param: std::result::Result<Path<T>, PathRejection>) -> Result<T> {
    param
        .map(|Path(value)| value)
        .map_err(|e| ScoringError::Validation(e.body_text()))
}

pub(crate) fn query_params<T>(query: std::result::Result<Query<T>, QueryRejection>) -> Result<T> {
    query
        .map(|Query(value)| value)
        .map_err(|e| ScoringError::Validation(e.body_text()))
}
