//! 核心编排层：对话状态机、阶段与状态投影、输入错误、后台主控循环

pub mod controller;
pub mod error;
pub mod orchestrator;
pub mod state;

pub use controller::DialogueController;
pub use error::InputError;
pub use orchestrator::{create_interview, spawn_controller, Command};
pub use state::{SessionView, Stage};
