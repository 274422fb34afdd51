//! LLM客户端 - 提供统一的LLM服务接口

use async_trait::async_trait;
use std::time::Duration;

use crate::config::LLMConfig;
use crate::llm::{LanguageModel, LlmError};

mod providers;
pub mod utils;

use providers::{Backend, CallSettings};

/// LLM客户端 - 基于rig的provider实现 [`LanguageModel`]
#[derive(Clone)]
pub struct LLMClient {
    config: LLMConfig,
    backend: Backend,
}

impl LLMClient {
    /// 创建新的LLM客户端
    pub fn new(config: &LLMConfig) -> Result<Self, LlmError> {
        let backend = Backend::new(config)?;
        Ok(Self {
            backend,
            config: config.clone(),
        })
    }
}

#[async_trait]
impl LanguageModel for LLMClient {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String, LlmError> {
        let agent = self.backend.agent(
            &self.config.model,
            CallSettings {
                system_prompt,
                max_tokens: u64::from(max_tokens),
                temperature,
            },
        );

        let timeout = Duration::from_secs(self.config.timeout_seconds);
        let response = tokio::time::timeout(timeout, agent.ask(user_prompt))
            .await
            .map_err(|_| LlmError::Timeout(self.config.timeout_seconds))?
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let content = response.trim();
        if content.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        tracing::debug!(
            model = %self.config.model,
            chars = content.chars().count(),
            "LLM调用完成"
        );
        Ok(content.to_string())
    }
}
