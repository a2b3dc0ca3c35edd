//! Transcript 输出端（外部展示层的边界）
//!
//! 控制器每追加一条消息就按顺序推给 sink；sink 只消费，不回写控制器。

use tokio::sync::mpsc;

use crate::memory::Message;

/// 消费有序消息流的展示端
pub trait TranscriptSink: Send {
    fn deliver(&mut self, msg: &Message);
}

/// 丢弃所有消息（无界面运行、测试）
#[derive(Debug, Default)]
pub struct NullSink;

impl TranscriptSink for NullSink {
    fn deliver(&mut self, _msg: &Message) {}
}

/// 通过 mpsc 通道转发给 UI 任务；接收端已关闭时静默丢弃
impl TranscriptSink for mpsc::UnboundedSender<Message> {
    fn deliver(&mut self, msg: &Message) {
        if self.send(msg.clone()).is_err() {
            tracing::debug!("transcript receiver dropped");
        }
    }
}
