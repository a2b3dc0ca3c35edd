//! 远端问诊服务：接口抽象、请求/响应记录、HTTP 实现、脚本化实现、凭据

pub mod credential;
pub mod error;
pub mod http;
pub mod mock;
pub mod traits;
pub mod types;

pub use credential::{CredentialStore, EnvCredential, StaticCredential};
pub use error::{FailureCause, RequestFailed};
pub use http::HttpInterviewService;
pub use mock::{RecordedCall, ScriptedService};
pub use traits::InterviewService;
pub use types::{
    FollowUpRequest, FollowUpResponse, LogFeedbackRequest, Operation, PredictRequest,
    PredictResponse, StartInterviewRequest, StartInterviewResponse, SubmitAnswerRequest,
    SubmitAnswerResponse,
};
