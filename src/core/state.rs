//! 状态定义：对话阶段 Stage 与 SessionView 投影
//!
//! UI 只持有轻量的 SessionView（阶段、记录、是否忙、提示）；完整状态由 DialogueController 持有并投影。

use serde::Serialize;

use crate::memory::{ConversationState, Message};

/// 对话阶段
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Stage {
    /// 尚未成功开始问诊（或开始失败）
    Init,
    /// 逐题问答
    Asking,
    /// 出结果链路（predict -> log-feedback -> follow-up-init）执行中
    AwaitingPredict,
    /// 置信度追问
    FollowUpAsking,
    /// 追问结束并已重置，需重新 start
    FollowUpDone,
}

/// UI 看到的「投影」状态
#[derive(Clone, Debug, Serialize)]
pub struct SessionView {
    pub stage: Stage,
    pub history: Vec<Message>,
    pub question_index: u64,
    pub follow_up_active: bool,
    pub diagnosis: Option<String>,
    pub input_locked: bool,
    /// 最近一次被拒绝的输入原因
    pub notice: Option<String>,
}

impl Default for SessionView {
    fn default() -> Self {
        Self {
            stage: Stage::Init,
            history: Vec::new(),
            question_index: 0,
            follow_up_active: false,
            diagnosis: None,
            input_locked: false,
            notice: None,
        }
    }
}

impl SessionView {
    pub fn project(state: &ConversationState, input_locked: bool, notice: Option<String>) -> Self {
        Self {
            stage: state.stage(),
            history: state.transcript().messages().to_vec(),
            question_index: state.question_index(),
            follow_up_active: state.follow_up_active(),
            diagnosis: state.diagnosis().map(String::from),
            input_locked,
            notice,
        }
    }
}
