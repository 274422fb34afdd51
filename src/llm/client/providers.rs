//! rig provider的封装，按配置选择具体后端

use anyhow::Result;
use rig::{agent::Agent, client::CompletionClient, completion::Prompt};

use crate::config::{LLMConfig, LLMProvider};
use crate::llm::LlmError;

use rig::providers::{anthropic, deepseek, moonshot, ollama, openai, openrouter};

/// 统一的采样参数，每次调用都会重新构建Agent
macro_rules! with_sampling {
    ($builder:expr, $call:expr) => {
        $builder
            .preamble($call.system_prompt)
            .max_tokens($call.max_tokens)
            .temperature($call.temperature)
            .build()
    };
}

/// 单次调用的参数
pub struct CallSettings<'a> {
    pub system_prompt: &'a str,
    pub max_tokens: u64,
    pub temperature: f64,
}

/// 已配置好的后端客户端
#[derive(Clone)]
pub enum Backend {
    OpenAI(openai::Client),
    Moonshot(moonshot::Client),
    DeepSeek(deepseek::Client),
    OpenRouter(openrouter::Client),
    Anthropic(anthropic::Client),
    Ollama(ollama::Client),
}

impl Backend {
    /// 根据配置创建后端，除Ollama外都需要API KEY
    pub fn new(config: &LLMConfig) -> Result<Self, LlmError> {
        let key = config.api_key.trim();
        if key.is_empty() && config.provider != LLMProvider::Ollama {
            return Err(LlmError::Configuration(format!(
                "{} requires an API key",
                config.provider
            )));
        }
        if config.model.trim().is_empty() {
            return Err(LlmError::Configuration("model name is empty".to_string()));
        }
        let base_url = config.api_base_url.as_str();

        let backend = match config.provider {
            LLMProvider::OpenAI => {
                Backend::OpenAI(openai::Client::builder(key).base_url(base_url).build())
            }
            LLMProvider::Moonshot => {
                Backend::Moonshot(moonshot::Client::builder(key).base_url(base_url).build())
            }
            LLMProvider::DeepSeek => {
                Backend::DeepSeek(deepseek::Client::builder(key).base_url(base_url).build())
            }
            // OpenRouter与Anthropic使用官方地址
            LLMProvider::OpenRouter => Backend::OpenRouter(openrouter::Client::builder(key).build()),
            LLMProvider::Anthropic => {
                let client = anthropic::ClientBuilder::new(key)
                    .build()
                    .map_err(|e| LlmError::Configuration(e.to_string()))?;
                Backend::Anthropic(client)
            }
            LLMProvider::Ollama => Backend::Ollama(ollama::Client::builder().build()),
        };
        Ok(backend)
    }

    pub fn agent(&self, model: &str, call: CallSettings<'_>) -> BackendAgent {
        match self {
            Backend::OpenAI(client) => BackendAgent::OpenAI(with_sampling!(
                client
                    .completion_model(model)
                    .completions_api()
                    .into_agent_builder(),
                call
            )),
            Backend::Moonshot(client) => {
                BackendAgent::Moonshot(with_sampling!(client.agent(model), call))
            }
            Backend::DeepSeek(client) => {
                BackendAgent::DeepSeek(with_sampling!(client.agent(model), call))
            }
            Backend::OpenRouter(client) => {
                BackendAgent::OpenRouter(with_sampling!(client.agent(model), call))
            }
            Backend::Anthropic(client) => {
                BackendAgent::Anthropic(with_sampling!(client.agent(model), call))
            }
            Backend::Ollama(client) => {
                BackendAgent::Ollama(with_sampling!(client.agent(model), call))
            }
        }
    }
}

pub enum BackendAgent {
    OpenAI(Agent<openai::CompletionModel>),
    Moonshot(Agent<moonshot::CompletionModel>),
    DeepSeek(Agent<deepseek::CompletionModel>),
    OpenRouter(Agent<openrouter::CompletionModel>),
    Anthropic(Agent<anthropic::completion::CompletionModel>),
    Ollama(Agent<ollama::CompletionModel<reqwest::Client>>),
}

impl BackendAgent {
    /// 单轮对话，不使用工具
    pub async fn ask(&self, user_prompt: &str) -> Result<String> {
        let answer = match self {
            BackendAgent::OpenAI(agent) => agent.prompt(user_prompt).await?,
            BackendAgent::Moonshot(agent) => agent.prompt(user_prompt).await?,
            BackendAgent::DeepSeek(agent) => agent.prompt(user_prompt).await?,
            BackendAgent::OpenRouter(agent) => agent.prompt(user_prompt).await?,
            BackendAgent::Anthropic(agent) => agent.prompt(user_prompt).await?,
            BackendAgent::Ollama(agent) => agent.prompt(user_prompt).await?,
        };
        Ok(answer)
    }
}
