//! 远端接口的请求/响应记录
//!
//! 字段名与后端 JSON 一一对应。置信度用 serde_json::Number 原样透传，
//! 追问轨迹（gpt_responses）的元素结构由后端决定，这里当作不透明的 JSON 值。

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// 五个远端操作
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    StartInterview,
    SubmitAnswer,
    Predict,
    LogFeedback,
    FollowUp,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::StartInterview => "start-interview",
            Operation::SubmitAnswer => "submit-answer",
            Operation::Predict => "predict",
            Operation::LogFeedback => "log-feedback",
            Operation::FollowUp => "follow-up",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StartInterviewRequest {
    pub message: String,
    pub question_index: u64,
    pub followup_count: u32,
    pub answers: Vec<String>,
}

impl Default for StartInterviewRequest {
    fn default() -> Self {
        Self {
            message: String::new(),
            question_index: 0,
            followup_count: 0,
            answers: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StartInterviewResponse {
    pub next_question: String,
    pub question_index: u64,
    #[serde(default)]
    pub crf_keywords: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    pub message: String,
    pub question_index: u64,
    pub answers: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmitAnswerResponse {
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub next_question: Option<String>,
    pub question_index: u64,
    /// 后端在未出结果时不带此字段
    #[serde(default)]
    pub show_result: bool,
    #[serde(default)]
    pub crf_keywords: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub form: Value,
    pub answers: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: String,
    pub confidence: Number,
    pub advice: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogFeedbackRequest {
    pub form: Value,
    pub answers: Vec<String>,
    pub diagnosis: String,
    pub confidence: Number,
    pub symptoms: Vec<String>,
}

/// 追问请求；首轮（follow-up-init）gpt_response 为空串、gpt_responses 为空
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FollowUpRequest {
    pub gpt_response: String,
    pub gpt_responses: Vec<Value>,
    pub base_confidence: Number,
    pub diagnosis: String,
    pub symptoms: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FollowUpResponse {
    #[serde(rename = "final", default)]
    pub is_final: bool,
    #[serde(default)]
    pub updated_confidence: Option<Number>,
    #[serde(default)]
    pub next_gpt_question: Option<String>,
    #[serde(default)]
    pub gpt_responses: Option<Vec<Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_start_request_wire_shape() {
        let body = serde_json::to_value(StartInterviewRequest::default()).unwrap();
        assert_eq!(
            body,
            json!({"message": "", "question_index": 0, "followup_count": 0, "answers": []})
        );
    }

    #[test]
    fn test_submit_response_without_show_result() {
        let resp: SubmitAnswerResponse = serde_json::from_value(json!({
            "reply": null,
            "next_question": "Since when?",
            "question_index": 2,
            "followup_count": 0,
            "answers": ["tired"]
        }))
        .unwrap();
        assert!(!resp.show_result);
        assert_eq!(resp.next_question.as_deref(), Some("Since when?"));
        assert_eq!(resp.question_index, 2);
        assert!(resp.crf_keywords.is_none());
    }

    #[test]
    fn test_follow_up_response_final_keyword() {
        let resp: FollowUpResponse =
            serde_json::from_value(json!({"final": true, "updated_confidence": 80})).unwrap();
        assert!(resp.is_final);
        assert_eq!(resp.updated_confidence, Some(Number::from(80)));
        assert!(resp.next_gpt_question.is_none());
    }

    #[test]
    fn test_confidence_passes_through_unchanged() {
        let resp: PredictResponse = serde_json::from_value(json!({
            "prediction": "OCD",
            "confidence": 87.5,
            "advice": "See a specialist"
        }))
        .unwrap();
        let echoed = serde_json::to_value(&resp.confidence).unwrap();
        assert_eq!(echoed, json!(87.5));
        assert_eq!(resp.confidence.to_string(), "87.5");
    }

    #[test]
    fn test_predict_response_missing_field_is_error() {
        let err = serde_json::from_value::<PredictResponse>(json!({"prediction": "OCD"}));
        assert!(err.is_err());
    }
}
