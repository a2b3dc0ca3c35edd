//! Bearer 凭据来源
//!
//! 凭据由外部存储提供，这里只当作不透明字符串；每次请求都重新读取。

/// 外部凭据存储
pub trait CredentialStore: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// 从环境变量读取（默认 MINDCHECK_TOKEN）
#[derive(Debug, Clone)]
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialStore for EnvCredential {
    fn bearer_token(&self) -> Option<String> {
        std::env::var(&self.var).ok().filter(|t| !t.trim().is_empty())
    }
}

/// 固定凭据
#[derive(Debug, Clone)]
pub struct StaticCredential(pub String);

impl CredentialStore for StaticCredential {
    fn bearer_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}
