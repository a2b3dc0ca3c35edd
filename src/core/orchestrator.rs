//! 问诊编排器：主控循环
//!
//! 负责：加载配置、创建 HTTP 服务与控制器、建立 cmd/state/transcript 三通道，
//! 并在后台任务中逐条消费用户命令（Start/Submit/Quit）。命令通道即事件队列：
//! 一条命令的远端调用链全部结束后才会取下一条，因此会话状态的写入天然串行。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::config::{load_config, load_form, AppConfig};
use crate::core::{DialogueController, SessionView};
use crate::memory::Message;
use crate::service::{EnvCredential, HttpInterviewService};

/// 从 UI 发往编排器的用户命令
#[derive(Debug, Clone)]
pub enum Command {
    /// 开始（或重新开始）问诊
    Start,
    /// 提交用户输入
    Submit(String),
    /// 退出
    Quit,
}

impl Command {
    /// 把一行终端输入解析成命令；只有斜杠前缀的词才是控制命令，其余一律当作回答
    pub fn from_line(line: &str) -> Self {
        match line.trim().to_lowercase().as_str() {
            "/quit" | "/exit" => Command::Quit,
            "/restart" => Command::Start,
            _ => Command::Submit(line.to_string()),
        }
    }
}

/// 在后台任务中运行控制器；返回命令发送端、状态接收端与任务句柄
pub fn spawn_controller(
    mut controller: DialogueController,
) -> (
    mpsc::UnboundedSender<Command>,
    watch::Receiver<SessionView>,
    JoinHandle<()>,
) {
    let (cmd_tx, mut cmd_rx) = mpsc::unbounded_channel::<Command>();
    let (state_tx, state_rx) = watch::channel(SessionView::default());

    let handle = tokio::spawn(async move {
        while let Some(cmd) = cmd_rx.recv().await {
            let outcome = match cmd {
                Command::Start => {
                    let _ = state_tx.send(SessionView::project(controller.state(), true, None));
                    controller.start().await
                }
                Command::Submit(input) => {
                    let _ = state_tx.send(SessionView::project(controller.state(), true, None));
                    controller.handle_input(&input).await
                }
                Command::Quit => break,
            };

            let notice = outcome.err().map(|e| {
                tracing::debug!(session = %controller.session_id(), error = %e, "input rejected");
                e.to_string()
            });
            let _ = state_tx.send(SessionView::project(controller.state(), false, notice));
        }
        tracing::info!(session = %controller.session_id(), "controller loop stopped");
    });

    (cmd_tx, state_rx, handle)
}

/// 创建问诊运行时：返回命令发送端、状态接收端、Transcript 接收端与控制器任务句柄
///
/// 控制器任务在收到 Quit 或命令发送端全部关闭后，处理完已排队的命令才退出；
/// 退出时 Transcript 发送端随控制器一起释放，接收端随之结束。
pub fn create_interview(
    config_path: Option<PathBuf>,
) -> anyhow::Result<(
    mpsc::UnboundedSender<Command>,
    watch::Receiver<SessionView>,
    mpsc::UnboundedReceiver<Message>,
    JoinHandle<()>,
)> {
    let cfg = match config_path {
        Some(path) => load_config(Some(path.clone()))
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => load_config(None).unwrap_or_else(|e| {
            tracing::warn!("Config load failed ({}), using defaults", e);
            AppConfig::default()
        }),
    };
    let form = load_form(&cfg)?;

    let credentials = Arc::new(EnvCredential::new(cfg.service.token_env.clone()));
    let service = Arc::new(HttpInterviewService::new(&cfg.service, credentials));
    tracing::info!(base_url = %cfg.service.base_url, "using interview backend");

    let (transcript_tx, transcript_rx) = mpsc::unbounded_channel::<Message>();
    let controller = DialogueController::new(service, form).with_sink(transcript_tx);

    let (cmd_tx, state_rx, handle) = spawn_controller(controller);
    Ok((cmd_tx, state_rx, transcript_rx, handle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Stage;
    use crate::service::{
        Operation, ScriptedService, StartInterviewResponse, SubmitAnswerResponse,
    };

    #[tokio::test]
    async fn test_commands_are_processed_in_order() {
        let svc = Arc::new(ScriptedService::new());
        svc.push_start(Ok(StartInterviewResponse {
            next_question: "How are you feeling?".into(),
            question_index: 1,
            crf_keywords: None,
        }));
        svc.push_submit(Ok(SubmitAnswerResponse {
            next_question: Some("Since when?".into()),
            question_index: 2,
            ..Default::default()
        }));

        let (transcript_tx, mut transcript_rx) = mpsc::unbounded_channel::<Message>();
        let controller =
            DialogueController::new(svc.clone(), serde_json::json!({})).with_sink(transcript_tx);
        let (cmd_tx, state_rx, handle) = spawn_controller(controller);

        cmd_tx.send(Command::Start).unwrap();
        cmd_tx.send(Command::Submit("tired".into())).unwrap();
        cmd_tx.send(Command::Quit).unwrap();
        handle.await.unwrap();

        let view = state_rx.borrow().clone();
        assert_eq!(view.stage, Stage::Asking);
        assert_eq!(view.question_index, 2);
        assert!(!view.input_locked);
        assert_eq!(view.history.len(), 5);

        let mut delivered = Vec::new();
        while let Ok(msg) = transcript_rx.try_recv() {
            delivered.push(msg);
        }
        assert_eq!(delivered, view.history);
    }

    #[tokio::test]
    async fn test_rejected_input_sets_notice() {
        let svc = Arc::new(ScriptedService::new());
        let controller = DialogueController::new(svc, serde_json::json!({}));
        let (cmd_tx, state_rx, handle) = spawn_controller(controller);

        cmd_tx.send(Command::Submit("hello".into())).unwrap();
        cmd_tx.send(Command::Quit).unwrap();
        handle.await.unwrap();

        let view = state_rx.borrow().clone();
        assert_eq!(view.notice.as_deref(), Some("Interview has not started"));
        assert_eq!(view.stage, Stage::Init);
    }

    #[tokio::test]
    async fn test_pending_commands_drained_after_sender_dropped() {
        let svc = Arc::new(ScriptedService::new());
        svc.push_start(Ok(StartInterviewResponse {
            next_question: "How are you feeling?".into(),
            question_index: 1,
            crf_keywords: None,
        }));
        svc.push_submit(Ok(SubmitAnswerResponse {
            next_question: Some("Since when?".into()),
            question_index: 2,
            ..Default::default()
        }));

        let (transcript_tx, mut transcript_rx) = mpsc::unbounded_channel::<Message>();
        let controller =
            DialogueController::new(svc.clone(), serde_json::json!({})).with_sink(transcript_tx);
        let (cmd_tx, state_rx, handle) = spawn_controller(controller);

        // 不发 Quit，直接关闭发送端：排队中的命令仍需全部处理
        cmd_tx.send(Command::Start).unwrap();
        cmd_tx.send(Command::Submit("tired".into())).unwrap();
        drop(cmd_tx);
        handle.await.unwrap();

        assert_eq!(
            svc.operations(),
            vec![Operation::StartInterview, Operation::SubmitAnswer]
        );
        assert_eq!(state_rx.borrow().question_index, 2);

        // 控制器退出后 Transcript 通道关闭，接收端能读完最后一条
        let mut delivered = Vec::new();
        while let Some(msg) = transcript_rx.recv().await {
            delivered.push(msg.text);
        }
        assert_eq!(delivered.last().map(String::as_str), Some("Since when?"));
    }

    #[tokio::test]
    async fn test_commands_queued_before_quit_are_processed() {
        let svc = Arc::new(ScriptedService::new());
        svc.push_start(Ok(StartInterviewResponse {
            next_question: "How are you feeling?".into(),
            question_index: 1,
            crf_keywords: None,
        }));
        let controller = DialogueController::new(svc.clone(), serde_json::json!({}));
        let (cmd_tx, _state_rx, handle) = spawn_controller(controller);

        cmd_tx.send(Command::Start).unwrap();
        cmd_tx.send(Command::Submit("tired".into())).unwrap();
        cmd_tx.send(Command::Quit).unwrap();
        let _ = cmd_tx.send(Command::Submit("after quit".into()));
        handle.await.unwrap();

        assert_eq!(
            svc.operations(),
            vec![Operation::StartInterview, Operation::SubmitAnswer]
        );
    }

    #[test]
    fn test_from_line_only_slash_words_are_commands() {
        assert!(matches!(Command::from_line("/quit"), Command::Quit));
        assert!(matches!(Command::from_line(" /EXIT "), Command::Quit));
        assert!(matches!(Command::from_line("/restart"), Command::Start));
        assert!(matches!(Command::from_line("exit"), Command::Submit(s) if s == "exit"));
        assert!(matches!(Command::from_line("quit"), Command::Submit(s) if s == "quit"));
        assert!(matches!(
            Command::from_line("I want to quit my job"),
            Command::Submit(_)
        ));
    }
}
