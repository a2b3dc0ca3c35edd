//! Mindcheck - 心理健康问诊对话客户端
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 对话状态机、阶段投影、后台主控循环
//! - **memory**: 对话记录、会话状态存储、展示端 sink
//! - **observability**: 日志初始化
//! - **service**: 远端问诊服务抽象与实现（HTTP / 脚本化）

pub mod config;
pub mod core;
pub mod memory;
pub mod observability;
pub mod service;

pub use crate::core::{DialogueController, InputError, Stage};
pub use crate::service::{InterviewService, RequestFailed};
