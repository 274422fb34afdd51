//! LLM接入层 - 研究流程只依赖 [`LanguageModel`] 这一接口

use async_trait::async_trait;

pub mod client;

pub use client::LLMClient;

/// LLM调用错误
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("LLM transport error: {0}")]
    Transport(String),

    #[error("LLM request timed out after {0} seconds")]
    Timeout(u64),

    #[error("LLM returned no content")]
    EmptyResponse,

    #[error("LLM configuration error: {0}")]
    Configuration(String),
}

/// 单轮补全接口
///
/// 返回空内容视为失败（[`LlmError::EmptyResponse`]），调用方不做重试。
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String, LlmError>;
}
