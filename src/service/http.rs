//! HTTP 后端客户端
//!
//! 所有接口都是 POST + JSON，附带 Bearer 凭据（每次请求重新从 CredentialStore 读取）。
//! 网络错误与非 2xx 归为传输失败，响应体无法解析为期望结构归为格式错误；不做任何重试。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{EndpointsSection, ServiceSection};
use crate::service::{
    CredentialStore, FollowUpRequest, FollowUpResponse, InterviewService, LogFeedbackRequest,
    Operation, PredictRequest, PredictResponse, RequestFailed, StartInterviewRequest,
    StartInterviewResponse, SubmitAnswerRequest, SubmitAnswerResponse,
};

/// 基于 reqwest 的 InterviewService 实现
pub struct HttpInterviewService {
    client: Client,
    base_url: String,
    endpoints: EndpointsSection,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpInterviewService {
    pub fn new(cfg: &ServiceSection, credentials: Arc<dyn CredentialStore>) -> Self {
        let mut builder = Client::builder();
        if let Some(secs) = cfg.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().unwrap_or_default();
        Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            endpoints: cfg.endpoints.clone(),
            credentials,
        }
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// 发送请求并返回 2xx 响应体原文
    async fn send<Req: Serialize + ?Sized>(
        &self,
        op: Operation,
        path: &str,
        body: &Req,
    ) -> Result<String, RequestFailed> {
        let url = self.url(path);
        tracing::debug!(operation = %op, url = %url, "POST");

        let mut req = self.client.post(&url).json(body);
        match self.credentials.bearer_token() {
            Some(token) => req = req.bearer_auth(token),
            None => tracing::warn!(operation = %op, "no bearer credential available"),
        }

        let resp = req
            .send()
            .await
            .map_err(|e| RequestFailed::transport(op, e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| RequestFailed::transport(op, format!("read body: {}", e)))?;

        if !status.is_success() {
            return Err(RequestFailed::status(op, status.as_u16(), text));
        }
        Ok(text)
    }

    async fn post_json<Req, Resp>(
        &self,
        op: Operation,
        path: &str,
        body: &Req,
    ) -> Result<Resp, RequestFailed>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let text = self.send(op, path, body).await?;
        serde_json::from_str(&text).map_err(|e| RequestFailed::malformed(op, e.to_string()))
    }
}

#[async_trait]
impl InterviewService for HttpInterviewService {
    async fn start_interview(
        &self,
        req: StartInterviewRequest,
    ) -> Result<StartInterviewResponse, RequestFailed> {
        self.post_json(Operation::StartInterview, &self.endpoints.chat, &req)
            .await
    }

    async fn submit_answer(
        &self,
        req: SubmitAnswerRequest,
    ) -> Result<SubmitAnswerResponse, RequestFailed> {
        self.post_json(Operation::SubmitAnswer, &self.endpoints.chat, &req)
            .await
    }

    async fn predict(&self, req: PredictRequest) -> Result<PredictResponse, RequestFailed> {
        self.post_json(Operation::Predict, &self.endpoints.predict, &req)
            .await
    }

    async fn log_feedback(&self, req: LogFeedbackRequest) -> Result<(), RequestFailed> {
        self.send(Operation::LogFeedback, &self.endpoints.log_feedback, &req)
            .await
            .map(|_| ())
    }

    async fn follow_up(&self, req: FollowUpRequest) -> Result<FollowUpResponse, RequestFailed> {
        self.post_json(Operation::FollowUp, &self.endpoints.followup, &req)
            .await
    }
}
