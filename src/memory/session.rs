//! 会话状态存储：问答进度、已收集回答、症状关键词、追问轨迹、诊断结果
//!
//! 所有变更都是同步且完整的（不存在部分写入失败）；reset() 恢复除 Transcript 以外的全部字段。

use std::collections::BTreeSet;

use serde_json::{Number, Value};

use crate::core::Stage;
use crate::memory::{Message, Transcript};

/// predict 一次性产出的三元组：诊断、基础置信度、建议
///
/// 三者要么同时存在，要么同时缺失，因此作为一个整体存为 Option。
#[derive(Clone, Debug, PartialEq)]
pub struct DiagnosisResult {
    pub diagnosis: String,
    /// 百分比数值，原样透传，不做任何运算
    pub confidence: Number,
    pub advice: String,
}

/// 单个会话的全部可变状态，由 DialogueController 独占
#[derive(Clone, Debug)]
pub struct ConversationState {
    stage: Stage,
    transcript: Transcript,
    question_index: u64,
    collected_answers: Vec<String>,
    extracted_keywords: BTreeSet<String>,
    follow_up_responses: Vec<Value>,
    result: Option<DiagnosisResult>,
    follow_up_active: bool,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self {
            stage: Stage::Init,
            transcript: Transcript::new(),
            question_index: 0,
            collected_answers: Vec::new(),
            extracted_keywords: BTreeSet::new(),
            follow_up_responses: Vec::new(),
            result: None,
            follow_up_active: false,
        }
    }
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn question_index(&self) -> u64 {
        self.question_index
    }

    pub fn collected_answers(&self) -> &[String] {
        &self.collected_answers
    }

    pub fn extracted_keywords(&self) -> &BTreeSet<String> {
        &self.extracted_keywords
    }

    pub fn follow_up_responses(&self) -> &[Value] {
        &self.follow_up_responses
    }

    pub fn follow_up_active(&self) -> bool {
        self.follow_up_active
    }

    pub fn result(&self) -> Option<&DiagnosisResult> {
        self.result.as_ref()
    }

    pub fn diagnosis(&self) -> Option<&str> {
        self.result.as_ref().map(|r| r.diagnosis.as_str())
    }

    pub fn base_confidence(&self) -> Option<&Number> {
        self.result.as_ref().map(|r| &r.confidence)
    }

    pub fn advice(&self) -> Option<&str> {
        self.result.as_ref().map(|r| r.advice.as_str())
    }

    pub(crate) fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }

    pub fn append(&mut self, msg: Message) {
        self.transcript.push(msg);
    }

    pub fn record_answer(&mut self, text: impl Into<String>) {
        self.collected_answers.push(text.into());
    }

    pub fn set_question_index(&mut self, index: u64) {
        self.question_index = index;
    }

    /// 整体替换（不是合并）
    pub fn set_keywords<I, S>(&mut self, keywords: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extracted_keywords = keywords.into_iter().map(Into::into).collect();
    }

    pub fn set_diagnosis_result(
        &mut self,
        diagnosis: impl Into<String>,
        confidence: Number,
        advice: impl Into<String>,
    ) {
        self.result = Some(DiagnosisResult {
            diagnosis: diagnosis.into(),
            confidence,
            advice: advice.into(),
        });
    }

    pub fn begin_follow_up(&mut self) {
        self.follow_up_active = true;
    }

    pub fn update_follow_up_responses(&mut self, responses: Vec<Value>) {
        self.follow_up_responses = responses;
    }

    /// 恢复初始值；Transcript 保留
    pub fn reset(&mut self) {
        self.stage = Stage::Init;
        self.question_index = 0;
        self.collected_answers.clear();
        self.extracted_keywords.clear();
        self.follow_up_responses.clear();
        self.result = None;
        self.follow_up_active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_keywords_replaces() {
        let mut state = ConversationState::new();
        state.set_keywords(["a", "b"]);
        state.set_keywords(["c"]);
        let kw: Vec<&str> = state.extracted_keywords().iter().map(String::as_str).collect();
        assert_eq!(kw, vec!["c"]);
    }

    #[test]
    fn test_diagnosis_fields_set_together() {
        let mut state = ConversationState::new();
        assert!(state.diagnosis().is_none());
        assert!(state.base_confidence().is_none());
        assert!(state.advice().is_none());

        state.set_diagnosis_result("Mild anxiety", Number::from(72), "Seek counseling");
        assert_eq!(state.diagnosis(), Some("Mild anxiety"));
        assert_eq!(state.base_confidence(), Some(&Number::from(72)));
        assert_eq!(state.advice(), Some("Seek counseling"));
    }

    #[test]
    fn test_reset_keeps_transcript() {
        let mut state = ConversationState::new();
        state.append(Message::bot("q1"));
        state.append(Message::user("a1"));
        state.set_question_index(3);
        state.record_answer("a1");
        state.set_keywords(["fatigue"]);
        state.set_diagnosis_result("Anxiety", Number::from(60), "Rest");
        state.begin_follow_up();
        state.update_follow_up_responses(vec![Value::String("yes".into())]);
        state.set_stage(Stage::FollowUpAsking);

        state.reset();

        assert_eq!(state.transcript().len(), 2);
        assert_eq!(state.stage(), Stage::Init);
        assert_eq!(state.question_index(), 0);
        assert!(state.collected_answers().is_empty());
        assert!(state.extracted_keywords().is_empty());
        assert!(state.follow_up_responses().is_empty());
        assert!(state.result().is_none());
        assert!(!state.follow_up_active());
    }
}
