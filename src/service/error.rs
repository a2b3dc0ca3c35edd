//! 远端调用失败
//!
//! 传输失败（网络、非 2xx）与响应格式错误统一折叠为 RequestFailed，控制器不区分具体原因。

use thiserror::Error;

use crate::service::Operation;

/// 失败的底层原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// 任一远端操作的统一失败结果
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} request failed: {cause}")]
pub struct RequestFailed {
    pub operation: Operation,
    #[source]
    pub cause: FailureCause,
}

impl RequestFailed {
    pub fn new(operation: Operation, cause: FailureCause) -> Self {
        Self { operation, cause }
    }

    pub fn transport(operation: Operation, message: impl Into<String>) -> Self {
        Self::new(operation, FailureCause::Transport(message.into()))
    }

    pub fn status(operation: Operation, status: u16, body: impl Into<String>) -> Self {
        Self::new(
            operation,
            FailureCause::Status {
                status,
                body: body.into(),
            },
        )
    }

    pub fn malformed(operation: Operation, message: impl Into<String>) -> Self {
        Self::new(operation, FailureCause::Malformed(message.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_operation_and_cause() {
        let err = RequestFailed::status(Operation::Predict, 502, "bad gateway");
        assert_eq!(err.to_string(), "predict request failed: HTTP 502: bad gateway");
        assert!(matches!(err.cause, FailureCause::Status { status: 502, .. }));
    }

    #[test]
    fn test_malformed_keeps_operation() {
        let err = RequestFailed::malformed(Operation::FollowUp, "missing field `final`");
        assert!(matches!(err.cause, FailureCause::Malformed(_)));
        assert!(err.to_string().starts_with("follow-up request failed"));
    }
}
