use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

/// LLM Provider类型
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub enum LLMProvider {
    #[serde(rename = "openai")]
    #[default]
    OpenAI,
    #[serde(rename = "moonshot")]
    Moonshot,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "openrouter")]
    OpenRouter,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "ollama")]
    Ollama,
}

impl std::fmt::Display for LLMProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LLMProvider::OpenAI => write!(f, "openai"),
            LLMProvider::Moonshot => write!(f, "moonshot"),
            LLMProvider::DeepSeek => write!(f, "deepseek"),
            LLMProvider::OpenRouter => write!(f, "openrouter"),
            LLMProvider::Anthropic => write!(f, "anthropic"),
            LLMProvider::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for LLMProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(LLMProvider::OpenAI),
            "moonshot" => Ok(LLMProvider::Moonshot),
            "deepseek" => Ok(LLMProvider::DeepSeek),
            "openrouter" => Ok(LLMProvider::OpenRouter),
            "anthropic" => Ok(LLMProvider::Anthropic),
            "ollama" => Ok(LLMProvider::Ollama),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

/// 应用程序配置，启动时构建一次，之后以引用传递给各个组件
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    /// LLM模型配置
    pub llm: LLMConfig,

    /// PokeAPI配置
    pub pokeapi: PokeApiConfig,

    /// 网页检索配置
    pub web: WebConfig,

    /// 研究流程配置
    pub research: ResearchConfig,

    /// 日志级别（RUST_LOG未设置时生效）
    pub log_level: String,

    /// 是否启用详细日志
    pub verbose: bool,
}

/// LLM模型配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    /// LLM Provider类型
    pub provider: LLMProvider,

    /// LLM API KEY
    pub api_key: String,

    /// LLM API基地址
    pub api_base_url: String,

    /// 使用的模型
    pub model: String,

    /// 报告生成阶段的最大tokens
    pub max_tokens_per_response: u32,

    /// 单次调用超时时间（秒）
    pub timeout_seconds: u64,
}

/// PokeAPI配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PokeApiConfig {
    /// API基地址
    pub base_url: String,

    /// 请求超时时间（秒）
    pub timeout_seconds: u64,

    /// 按类别搜索时最多拉取的完整记录数
    pub max_search_results: usize,
}

/// 网页检索配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct WebConfig {
    /// 是否启用网页抓取
    pub enabled: bool,

    /// 合并后保留的最大结果数
    pub max_results: usize,

    /// 请求超时时间（秒）
    pub timeout_seconds: u64,

    /// 单条结果正文的最大字符数
    pub max_content_chars: usize,
}

/// 研究流程配置
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ResearchConfig {
    /// 逐个实体调研时的最大并发数，1表示严格顺序执行
    pub max_parallels: usize,

    /// 预期的最大研究步骤数，超出时仅记录警告
    pub max_research_steps: usize,
}

impl Config {
    /// 从文件加载配置
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let mut file =
            File::open(path).context(format!("Failed to open config file: {:?}", path))?;
        let mut content = String::new();
        file.read_to_string(&mut content)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// 校验配置，在启动时调用一次
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key.trim().is_empty() && self.llm.provider != LLMProvider::Ollama {
            bail!(
                "LLM API key is not configured, set POKEDEX_LLM_API_KEY or OPENAI_API_KEY, or pass --llm-api-key"
            );
        }
        if self.llm.model.trim().is_empty() {
            bail!("LLM model name must not be empty");
        }
        if self.llm.timeout_seconds == 0
            || self.pokeapi.timeout_seconds == 0
            || self.web.timeout_seconds == 0
        {
            bail!("timeouts must be greater than zero");
        }
        if self.research.max_parallels == 0 {
            bail!("research.max_parallels must be at least 1");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm: LLMConfig::default(),
            pokeapi: PokeApiConfig::default(),
            web: WebConfig::default(),
            research: ResearchConfig::default(),
            log_level: String::from("info"),
            verbose: false,
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        let api_key = std::env::var("POKEDEX_LLM_API_KEY")
            .or_else(|_| std::env::var("OPENAI_API_KEY"))
            .unwrap_or_default();

        Self {
            provider: LLMProvider::default(),
            api_key,
            api_base_url: String::from("https://api.openai.com/v1"),
            model: String::from("gpt-4-turbo-preview"),
            max_tokens_per_response: 4000,
            timeout_seconds: 60,
        }
    }
}

impl Default for PokeApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("https://pokeapi.co/api/v2"),
            timeout_seconds: 15,
            max_search_results: 10,
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_results: 5,
            timeout_seconds: 15,
            max_content_chars: 2000,
        }
    }
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_parallels: 1,
            max_research_steps: 5,
        }
    }
}
