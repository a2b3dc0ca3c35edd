//! 用户事件被拒绝的原因
//!
//! 远端失败不会出现在这里：控制器把 RequestFailed 就地转成一条 Transcript 消息。

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Empty input")]
    EmptyInput,

    #[error("Interview has not started")]
    NotStarted,

    #[error("Interview already in progress")]
    AlreadyStarted,

    /// 出结果链路尚未结束
    #[error("Busy, previous answer still being processed")]
    Busy,

    #[error("Interview finished, start a new session")]
    SessionFinished,
}
