//! 问诊后端与表单配置
//!
//! 环境变量用双下划线表示嵌套，如 `MINDCHECK__SERVICE__BASE_URL=http://10.0.0.2:5000`。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceSection,
    #[serde(default)]
    pub interview: InterviewSection,
}

/// [service] 段：后端地址、超时、凭据来源
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 单次请求超时（秒）；不设置则无限等待
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// 保存 Bearer 凭据的环境变量名
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default)]
    pub endpoints: EndpointsSection,
}

impl Default for ServiceSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: None,
            token_env: default_token_env(),
            endpoints: EndpointsSection::default(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_token_env() -> String {
    "MINDCHECK_TOKEN".to_string()
}

/// [service.endpoints] 段：start-interview 与 submit-answer 共用 chat
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointsSection {
    #[serde(default = "default_chat_path")]
    pub chat: String,
    #[serde(default = "default_predict_path")]
    pub predict: String,
    #[serde(default = "default_log_feedback_path")]
    pub log_feedback: String,
    #[serde(default = "default_followup_path")]
    pub followup: String,
}

impl Default for EndpointsSection {
    fn default() -> Self {
        Self {
            chat: default_chat_path(),
            predict: default_predict_path(),
            log_feedback: default_log_feedback_path(),
            followup: default_followup_path(),
        }
    }
}

fn default_chat_path() -> String {
    "/chat".to_string()
}

fn default_predict_path() -> String {
    "/predict".to_string()
}

fn default_log_feedback_path() -> String {
    "/log_feedback".to_string()
}

fn default_followup_path() -> String {
    "/gpt_followup".to_string()
}

/// [interview] 段
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterviewSection {
    /// 会话开始前收集的表单（JSON 文件），原样传给 predict / log-feedback
    pub form_path: Option<PathBuf>,
}

/// 未指定配置文件时读取的位置（相对工作目录）
pub const DEFAULT_CONFIG_FILE: &str = "config/default.toml";

/// 加载配置：一个 TOML 文件，再叠加 `MINDCHECK__*` 环境变量
///
/// 显式传入的文件必须存在且可解析；未传入时读 [`DEFAULT_CONFIG_FILE`]，缺失则全用内置默认值。
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let file = match config_path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::from(PathBuf::from(DEFAULT_CONFIG_FILE)).required(false),
    };

    config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix("MINDCHECK")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

/// 读取表单 JSON；未配置路径时为空对象
pub fn load_form(cfg: &AppConfig) -> anyhow::Result<serde_json::Value> {
    use anyhow::Context;

    match &cfg.interview.form_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read form file {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Form file {} is not valid JSON", path.display()))
        }
        None => Ok(serde_json::Value::Object(Default::default())),
    }
}
