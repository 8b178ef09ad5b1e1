//! 积分服务错误类型
//!
//! 所有错误按 [`ErrorKind`] 归为四类：输入非法、资源不存在、临时故障、内部错误。
//! 临时故障可由调用方整体重试，积分写入是原子的，不会产生部分累加。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::response::ApiResponse;

/// 错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 调用方输入错误，不应自动重试
    InvalidInput,
    /// 查询的资源不存在
    NotFound,
    /// 持久层不可达或超时，可安全重试
    Transient,
    /// 不变量被破坏等意外情况，需要人工介入
    Internal,
}

/// 积分服务错误类型
#[derive(Debug, Error)]
pub enum ScoringError {
    // === 输入错误 ===
    #[error("未知的行为类型: {0}")]
    UnknownActionType(String),

    #[error("积分增量不能为负数: {0}")]
    NegativeDelta(i64),

    #[error("参数校验失败: {0}")]
    Validation(String),

    // === 资源错误 ===
    #[error("挑战不存在: {0}")]
    ChallengeNotFound(i64),

    // === 系统错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("持久层不可用: {0}")]
    Unavailable(String),

    #[error("徽章目录数据异常: {0}")]
    CatalogCorrupted(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 积分服务 Result 类型别名
pub type Result<T> = std::result::Result<T, ScoringError>;

impl ScoringError {
    /// 错误分类
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownActionType(_) | Self::NegativeDelta(_) | Self::Validation(_) => {
                ErrorKind::InvalidInput
            }
            Self::ChallengeNotFound(_) => ErrorKind::NotFound,
            Self::Database(e) if is_transient_sqlx(e) => ErrorKind::Transient,
            Self::Unavailable(_) => ErrorKind::Transient,
            Self::Database(_) | Self::CatalogCorrupted(_) | Self::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// 检查是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }

    /// 检查是否为调用方输入错误
    pub fn is_invalid_input(&self) -> bool {
        self.kind() == ErrorKind::InvalidInput
    }

    /// 获取错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownActionType(_) => "UNKNOWN_ACTION_TYPE",
            Self::NegativeDelta(_) => "NEGATIVE_DELTA",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ChallengeNotFound(_) => "CHALLENGE_NOT_FOUND",
            Self::Database(_) if self.is_retryable() => "PERSISTENCE_UNAVAILABLE",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Unavailable(_) => "PERSISTENCE_UNAVAILABLE",
            Self::CatalogCorrupted(_) => "BADGE_CATALOG_CORRUPTED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Transient => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 判断 sqlx 错误是否属于临时故障
fn is_transient_sqlx(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::WorkerCrashed => true,
        sqlx::Error::Database(db) => db
            .code()
            .is_some_and(|code| is_transient_sqlstate(code.as_ref())),
        _ => false,
    }
}

/// 可重试的 SQLSTATE
///
/// 08xxx 连接异常，40001 序列化失败，40P01 死锁，57014 语句超时，57P0x 数据库关闭/重启
fn is_transient_sqlstate(code: &str) -> bool {
    code.starts_with("08") || matches!(code, "40001" | "40P01" | "57014" | "57P01" | "57P02" | "57P03")
}

impl IntoResponse for ScoringError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 服务端错误只返回通用提示，详细信息仅记录日志
        let message = match self.kind() {
            ErrorKind::Transient => {
                tracing::warn!(error = %self, "持久层暂不可用");
                "服务暂不可用，请稍后重试".to_string()
            }
            ErrorKind::Internal => {
                tracing::error!(error = %self, "内部错误");
                "服务内部错误".to_string()
            }
            ErrorKind::InvalidInput | ErrorKind::NotFound => self.to_string(),
        };

        (
            status,
            axum::Json(ApiResponse::error(self.error_code(), message)),
        )
            .into_response()
    }
}

impl From<validator::ValidationErrors> for ScoringError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}
