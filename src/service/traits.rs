//! 远端问诊服务抽象
//!
//! 每个远端接口对应一个方法；实现方不做重试，失败一律返回 RequestFailed。

use async_trait::async_trait;

use crate::service::{
    FollowUpRequest, FollowUpResponse, LogFeedbackRequest, PredictRequest, PredictResponse,
    RequestFailed, StartInterviewRequest, StartInterviewResponse, SubmitAnswerRequest,
    SubmitAnswerResponse,
};

#[async_trait]
pub trait InterviewService: Send + Sync {
    /// 开始问诊，拿到第一个问题
    async fn start_interview(
        &self,
        req: StartInterviewRequest,
    ) -> Result<StartInterviewResponse, RequestFailed>;

    async fn submit_answer(
        &self,
        req: SubmitAnswerRequest,
    ) -> Result<SubmitAnswerResponse, RequestFailed>;

    async fn predict(&self, req: PredictRequest) -> Result<PredictResponse, RequestFailed>;

    /// 反馈日志，响应体被忽略
    async fn log_feedback(&self, req: LogFeedbackRequest) -> Result<(), RequestFailed>;

    /// 置信度追问（首轮与后续轮共用）
    async fn follow_up(&self, req: FollowUpRequest) -> Result<FollowUpResponse, RequestFailed>;
}
