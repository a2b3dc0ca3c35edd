//! 脚本化问诊服务（用于测试与离线演示，无需后端）
//!
//! 每个接口按 FIFO 消费预先写入的响应，并按调用顺序记录请求，便于断言调用序列。
//! 脚本耗尽时返回格式错误；log-feedback 耗尽时视为成功。

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::service::{
    FailureCause, FollowUpRequest, FollowUpResponse, InterviewService, LogFeedbackRequest,
    Operation, PredictRequest, PredictResponse, RequestFailed, StartInterviewRequest,
    StartInterviewResponse, SubmitAnswerRequest, SubmitAnswerResponse,
};

/// 一次被记录的远端调用
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedCall {
    StartInterview(StartInterviewRequest),
    SubmitAnswer(SubmitAnswerRequest),
    Predict(PredictRequest),
    LogFeedback(LogFeedbackRequest),
    FollowUp(FollowUpRequest),
}

impl RecordedCall {
    pub fn operation(&self) -> Operation {
        match self {
            RecordedCall::StartInterview(_) => Operation::StartInterview,
            RecordedCall::SubmitAnswer(_) => Operation::SubmitAnswer,
            RecordedCall::Predict(_) => Operation::Predict,
            RecordedCall::LogFeedback(_) => Operation::LogFeedback,
            RecordedCall::FollowUp(_) => Operation::FollowUp,
        }
    }
}

#[derive(Default)]
struct Script {
    start: VecDeque<Result<StartInterviewResponse, FailureCause>>,
    submit: VecDeque<Result<SubmitAnswerResponse, FailureCause>>,
    predict: VecDeque<Result<PredictResponse, FailureCause>>,
    log_feedback: VecDeque<Result<(), FailureCause>>,
    follow_up: VecDeque<Result<FollowUpResponse, FailureCause>>,
    calls: Vec<RecordedCall>,
}

/// 脚本化服务：通过 &self 写入脚本，可在交给控制器（Arc）之后继续追加
#[derive(Default)]
pub struct ScriptedService {
    inner: Mutex<Script>,
}

fn next<T>(
    queue: &mut VecDeque<Result<T, FailureCause>>,
    op: Operation,
) -> Result<T, RequestFailed> {
    match queue.pop_front() {
        Some(r) => r.map_err(|cause| RequestFailed::new(op, cause)),
        None => Err(RequestFailed::malformed(op, "no scripted response")),
    }
}

impl ScriptedService {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push_start(&self, r: Result<StartInterviewResponse, FailureCause>) -> &Self {
        self.script().start.push_back(r);
        self
    }

    pub fn push_submit(&self, r: Result<SubmitAnswerResponse, FailureCause>) -> &Self {
        self.script().submit.push_back(r);
        self
    }

    pub fn push_predict(&self, r: Result<PredictResponse, FailureCause>) -> &Self {
        self.script().predict.push_back(r);
        self
    }

    pub fn push_log_feedback(&self, r: Result<(), FailureCause>) -> &Self {
        self.script().log_feedback.push_back(r);
        self
    }

    pub fn push_follow_up(&self, r: Result<FollowUpResponse, FailureCause>) -> &Self {
        self.script().follow_up.push_back(r);
        self
    }

    /// 至今为止的全部调用（按发生顺序）
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.script().calls.clone()
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.script().calls.iter().map(RecordedCall::operation).collect()
    }
}

#[async_trait]
impl InterviewService for ScriptedService {
    async fn start_interview(
        &self,
        req: StartInterviewRequest,
    ) -> Result<StartInterviewResponse, RequestFailed> {
        let mut s = self.script();
        s.calls.push(RecordedCall::StartInterview(req));
        next(&mut s.start, Operation::StartInterview)
    }

    async fn submit_answer(
        &self,
        req: SubmitAnswerRequest,
    ) -> Result<SubmitAnswerResponse, RequestFailed> {
        let mut s = self.script();
        s.calls.push(RecordedCall::SubmitAnswer(req));
        next(&mut s.submit, Operation::SubmitAnswer)
    }

    async fn predict(&self, req: PredictRequest) -> Result<PredictResponse, RequestFailed> {
        let mut s = self.script();
        s.calls.push(RecordedCall::Predict(req));
        next(&mut s.predict, Operation::Predict)
    }

    async fn log_feedback(&self, req: LogFeedbackRequest) -> Result<(), RequestFailed> {
        let mut s = self.script();
        s.calls.push(RecordedCall::LogFeedback(req));
        match s.log_feedback.pop_front() {
            Some(r) => r.map_err(|cause| RequestFailed::new(Operation::LogFeedback, cause)),
            None => Ok(()),
        }
    }

    async fn follow_up(&self, req: FollowUpRequest) -> Result<FollowUpResponse, RequestFailed> {
        let mut s = self.script();
        s.calls.push(RecordedCall::FollowUp(req));
        next(&mut s.follow_up, Operation::FollowUp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_responses_are_fifo_and_recorded() {
        let svc = ScriptedService::new();
        svc.push_start(Ok(StartInterviewResponse {
            next_question: "Q1".into(),
            question_index: 1,
            crf_keywords: None,
        }));
        svc.push_start(Err(FailureCause::Transport("down".into())));

        let first = svc.start_interview(StartInterviewRequest::default()).await.unwrap();
        assert_eq!(first.next_question, "Q1");
        let second = svc.start_interview(StartInterviewRequest::default()).await;
        assert!(matches!(
            second,
            Err(RequestFailed { cause: FailureCause::Transport(_), .. })
        ));
        assert_eq!(
            svc.operations(),
            vec![Operation::StartInterview, Operation::StartInterview]
        );
    }

    #[tokio::test]
    async fn test_exhausted_script_is_malformed() {
        let svc = ScriptedService::new();
        let err = svc
            .predict(PredictRequest {
                form: serde_json::json!({}),
                answers: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err.cause, FailureCause::Malformed(_)));
    }
}
