//! Mindcheck - 心理健康问诊对话客户端
//!
//! 入口：初始化日志、创建问诊运行时，逐行读取 stdin 作为回答，对话记录打印到 stdout。

use anyhow::Context;
use mindcheck::core::{create_interview, Command, Stage};
use mindcheck::memory::Sender;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mindcheck::observability::init();

    let config_path = std::env::args().nth(1).map(std::path::PathBuf::from);
    let (cmd_tx, mut state_rx, mut transcript_rx, controller) =
        create_interview(config_path).context("Failed to create interview runtime")?;

    // 只打印 bot 消息，用户输入已由终端回显
    let printer = tokio::spawn(async move {
        while let Some(msg) = transcript_rx.recv().await {
            if msg.sender == Sender::Bot {
                println!("{}", msg.text);
            }
        }
    });

    tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            let view = state_rx.borrow_and_update().clone();
            if view.input_locked {
                continue;
            }
            if let Some(notice) = view.notice {
                eprintln!("({})", notice);
            } else if view.stage == Stage::FollowUpDone {
                eprintln!("(type /restart to begin a new interview, /quit to exit)");
            }
        }
    });

    cmd_tx
        .send(Command::Start)
        .context("Controller stopped before start")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                let cmd = Command::from_line(&line);
                if matches!(cmd, Command::Quit) || cmd_tx.send(cmd).is_err() {
                    break;
                }
            }
            // Ctrl-C 不等待进行中的远端调用
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }

    // 已排队的输入全部处理完、对话记录全部打印后再退出
    let _ = cmd_tx.send(Command::Quit);
    controller.await.context("Controller task failed")?;
    printer.await.context("Transcript printer failed")?;
    Ok(())
}
