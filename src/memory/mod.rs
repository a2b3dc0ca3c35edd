//! 会话记忆：对话记录（Transcript）、会话状态存储、展示端 sink

pub mod conversation;
pub mod session;
pub mod sink;

pub use conversation::{Message, Sender, Transcript};
pub use session::{ConversationState, DiagnosisResult};
pub use sink::{NullSink, TranscriptSink};
