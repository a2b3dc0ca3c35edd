//! 对话控制器：问诊状态机
//!
//! Init --start--> Asking --(show_result)--> AwaitingPredict --> FollowUpAsking --(final)--> FollowUpDone
//!
//! 每个用户事件在一次 `&mut self` 调用内跑完它的全部远端调用（严格串行，不重试、不超时），
//! 结束后才接受下一个事件。任何 RequestFailed 都就地转成一条提示消息，会话状态保持失败前的样子。

use std::sync::Arc;

use serde_json::{Number, Value};
use uuid::Uuid;

use crate::core::{InputError, Stage};
use crate::memory::{ConversationState, DiagnosisResult, Message, NullSink, TranscriptSink};
use crate::service::{
    FollowUpRequest, InterviewService, LogFeedbackRequest, Operation, PredictRequest,
    RequestFailed, StartInterviewRequest, SubmitAnswerRequest,
};

pub const WELCOME: &str = "🧠 Welcome to your personal mental health assistant!";
pub const WELCOME_DETAIL: &str = "Let's begin with a few quick questions to understand you better.";
pub const FOLLOW_UP_INTRO: &str = "🧪 Starting GPT-based follow-ups to fine-tune confidence...";
pub const START_FAILED: &str = "⚠️ Could not start the interview. Please restart the session.";
pub const ANSWER_FAILED: &str = "Something went wrong. Please try again.";
pub const FOLLOW_UP_FAILED: &str = "⚠️ GPT follow-up failed.";

/// 问诊对话控制器，独占一个 ConversationState
pub struct DialogueController {
    session_id: Uuid,
    service: Arc<dyn InterviewService>,
    /// 会话开始前收集的表单，原样透传
    form: Value,
    state: ConversationState,
    sink: Box<dyn TranscriptSink>,
}

impl DialogueController {
    pub fn new(service: Arc<dyn InterviewService>, form: Value) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            service,
            form,
            state: ConversationState::new(),
            sink: Box::new(NullSink),
        }
    }

    pub fn with_sink(mut self, sink: impl TranscriptSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn stage(&self) -> Stage {
        self.state.stage()
    }

    /// 追加到 Transcript 并推给 sink
    fn say(&mut self, msg: Message) {
        self.sink.deliver(&msg);
        self.state.append(msg);
    }

    fn symptoms(&self) -> Vec<String> {
        self.state.extracted_keywords().iter().cloned().collect()
    }

    /// 开始（或在上一轮结束后重新开始）问诊
    ///
    /// 开始失败时停留在 Init，只追加一条提示；不自动重试。
    pub async fn start(&mut self) -> Result<(), InputError> {
        match self.state.stage() {
            Stage::Init | Stage::FollowUpDone => {}
            Stage::AwaitingPredict => return Err(InputError::Busy),
            Stage::Asking | Stage::FollowUpAsking => return Err(InputError::AlreadyStarted),
        }
        self.state.set_stage(Stage::Init);

        self.say(Message::bot(WELCOME));
        self.say(Message::bot(WELCOME_DETAIL));

        match self
            .service
            .start_interview(StartInterviewRequest::default())
            .await
        {
            Ok(resp) => {
                self.state.set_question_index(resp.question_index);
                if let Some(keywords) = resp.crf_keywords {
                    self.state.set_keywords(keywords);
                }
                self.say(Message::bot(resp.next_question));
                self.state.set_stage(Stage::Asking);
                tracing::info!(
                    session = %self.session_id,
                    question_index = resp.question_index,
                    "interview started"
                );
            }
            Err(e) => {
                tracing::warn!(session = %self.session_id, error = %e, "interview start failed");
                self.say(Message::bot(START_FAILED));
            }
        }
        Ok(())
    }

    /// 处理一条用户输入：按当前阶段路由到问答分支或追问分支
    pub async fn handle_input(&mut self, input: &str) -> Result<(), InputError> {
        if input.trim().is_empty() {
            return Err(InputError::EmptyInput);
        }
        match self.state.stage() {
            Stage::Init => Err(InputError::NotStarted),
            Stage::AwaitingPredict => Err(InputError::Busy),
            Stage::FollowUpDone => Err(InputError::SessionFinished),
            Stage::Asking => {
                debug_assert!(!self.state.follow_up_active());
                self.handle_answer(input).await;
                Ok(())
            }
            Stage::FollowUpAsking => {
                debug_assert!(self.state.follow_up_active());
                self.handle_follow_up(input).await;
                Ok(())
            }
        }
    }

    async fn handle_answer(&mut self, input: &str) {
        self.say(Message::user(input));

        let req = SubmitAnswerRequest {
            message: input.to_string(),
            question_index: self.state.question_index(),
            answers: self.state.collected_answers().to_vec(),
        };
        let resp = match self.service.submit_answer(req).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(session = %self.session_id, error = %e, "answer not accepted");
                self.say(Message::bot(ANSWER_FAILED));
                return;
            }
        };

        self.state.record_answer(input);
        if let Some(keywords) = resp.crf_keywords {
            self.state.set_keywords(keywords);
        }
        if let Some(reply) = resp.reply.as_deref() {
            tracing::debug!(session = %self.session_id, reply, "server reply (not displayed)");
        }
        if let Some(question) = resp.next_question {
            self.say(Message::bot(question));
            self.state.set_question_index(resp.question_index);
        }

        if resp.show_result {
            self.state.set_stage(Stage::AwaitingPredict);
            if let Err(e) = self.run_result_chain().await {
                tracing::warn!(session = %self.session_id, error = %e, "result chain aborted");
                self.state.set_stage(Stage::Asking);
                self.say(Message::bot(ANSWER_FAILED));
            }
        }
    }

    /// predict -> log-feedback -> follow-up-init，严格串行
    ///
    /// 诊断结果只在 follow-up-init 成功后才写入状态，失败时不留下半截诊断。
    async fn run_result_chain(&mut self) -> Result<(), RequestFailed> {
        let answers = self.state.collected_answers().to_vec();
        let symptoms = self.symptoms();

        let predicted = self
            .service
            .predict(PredictRequest {
                form: self.form.clone(),
                answers: answers.clone(),
            })
            .await?;
        tracing::info!(
            session = %self.session_id,
            diagnosis = %predicted.prediction,
            confidence = %predicted.confidence,
            "prediction received"
        );

        let feedback = LogFeedbackRequest {
            form: self.form.clone(),
            answers,
            diagnosis: predicted.prediction.clone(),
            confidence: predicted.confidence.clone(),
            symptoms: symptoms.clone(),
        };
        if let Err(e) = self.service.log_feedback(feedback).await {
            tracing::warn!(session = %self.session_id, error = %e, "feedback log dropped");
        }

        let init = self
            .service
            .follow_up(FollowUpRequest {
                gpt_response: String::new(),
                gpt_responses: Vec::new(),
                base_confidence: predicted.confidence.clone(),
                diagnosis: predicted.prediction.clone(),
                symptoms,
            })
            .await?;
        let question = init.next_gpt_question.ok_or_else(|| {
            RequestFailed::malformed(Operation::FollowUp, "missing next_gpt_question")
        })?;

        self.state.set_diagnosis_result(
            predicted.prediction.clone(),
            predicted.confidence,
            predicted.advice,
        );
        self.state.begin_follow_up();
        self.say(Message::bot(format!("💡 Initial Diagnosis: {}", predicted.prediction)));
        self.say(Message::bot(FOLLOW_UP_INTRO));
        self.say(Message::bot(question));
        self.state.set_stage(Stage::FollowUpAsking);
        tracing::info!(session = %self.session_id, "follow-up loop entered");
        Ok(())
    }

    async fn handle_follow_up(&mut self, input: &str) {
        self.say(Message::user(input));

        let Some(result) = self.state.result().cloned() else {
            tracing::warn!(session = %self.session_id, "follow-up without diagnosis");
            self.say(Message::bot(FOLLOW_UP_FAILED));
            return;
        };

        let req = FollowUpRequest {
            gpt_response: input.to_string(),
            gpt_responses: self.state.follow_up_responses().to_vec(),
            base_confidence: result.confidence.clone(),
            diagnosis: result.diagnosis.clone(),
            symptoms: self.symptoms(),
        };

        match self.service.follow_up(req).await {
            Ok(resp) if resp.is_final => self.finish(resp.updated_confidence, result),
            Ok(resp) => match resp.next_gpt_question {
                Some(question) => {
                    if let Some(responses) = resp.gpt_responses {
                        self.state.update_follow_up_responses(responses);
                    }
                    self.say(Message::bot(question));
                }
                None => {
                    tracing::warn!(
                        session = %self.session_id,
                        "follow-up response has neither final nor next question"
                    );
                    self.say(Message::bot(FOLLOW_UP_FAILED));
                }
            },
            Err(e) => {
                tracing::warn!(session = %self.session_id, error = %e, "follow-up failed");
                self.say(Message::bot(FOLLOW_UP_FAILED));
            }
        }
    }

    /// 展示调整后的置信度与建议，然后整体重置
    fn finish(&mut self, updated: Option<Number>, result: DiagnosisResult) {
        let confidence = updated.unwrap_or(result.confidence);
        self.say(Message::bot(format!("✅ Adjusted Confidence Score: {}%", confidence)));
        self.say(Message::bot(format!("📌 Recommendation: {}", result.advice)));

        self.state.reset();
        self.state.set_stage(Stage::FollowUpDone);
        tracing::info!(session = %self.session_id, %confidence, "interview finished, session reset");
    }
}
