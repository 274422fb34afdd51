use crate::config::{Config, LLMProvider};
use crate::workflow::ResearchOptions;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pokedex Research - 结合LLM推理、PokeAPI与社区网站的宝可梦深度研究助手
#[derive(Parser, Debug)]
#[command(name = "pokedex-research")]
#[command(
    about = "A research assistant that answers Pokemon questions by combining LLM reasoning with PokeAPI data and community web sources."
)]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// 配置文件路径（`-c` 留给 research 的 --compare）
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// LLM Provider (openai, moonshot, deepseek, openrouter, anthropic, ollama)
    #[arg(long, global = true)]
    pub llm_provider: Option<String>,

    /// LLM API KEY
    #[arg(long, global = true)]
    pub llm_api_key: Option<String>,

    /// LLM API基地址
    #[arg(long, global = true)]
    pub llm_api_base_url: Option<String>,

    /// 模型名称
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// 并行研究的宝可梦数量
    #[arg(long, global = true)]
    pub max_parallels: Option<usize>,

    /// 日志级别 (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// 禁用网页检索
    #[arg(long, global = true)]
    pub no_web: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// 对单个问题进行深度研究
    Research {
        /// 研究问题
        query: String,

        /// 同时输出模型直接回答以便对比
        #[arg(short, long)]
        compare: bool,

        /// 输出详细发现
        #[arg(short, long)]
        verbose: bool,

        /// 将markdown报告保存到指定路径
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// 交互模式，连续提问
    Interactive,
    /// 运行预置的演示问题
    Demo,
}

impl Command {
    /// 研究命令的输出选项，其它命令使用默认值
    pub fn research_options(&self) -> ResearchOptions {
        match self {
            Command::Research {
                compare,
                verbose,
                output,
                ..
            } => ResearchOptions {
                compare: *compare,
                verbose: *verbose,
                output: output.clone(),
            },
            _ => ResearchOptions::default(),
        }
    }
}

impl Args {
    /// 将CLI参数转换为配置
    pub fn to_config(&self) -> Result<Config> {
        let mut config = if let Some(config_path) = &self.config {
            // 显式指定的配置文件必须可读
            Config::from_file(config_path)
                .with_context(|| format!("无法读取配置文件 {:?}", config_path))?
        } else {
            let default_config_path = std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("pokedex.toml");

            if default_config_path.exists() {
                Config::from_file(&default_config_path).with_context(|| {
                    format!("无法读取默认配置文件 {:?}", default_config_path)
                })?
            } else {
                Config::default()
            }
        };

        // 覆盖LLM配置
        if let Some(provider_str) = &self.llm_provider {
            if let Ok(provider) = provider_str.parse::<LLMProvider>() {
                config.llm.provider = provider;
            } else {
                eprintln!(
                    "⚠️ 警告: 未知的provider: {}，使用默认provider",
                    provider_str
                );
            }
        }
        if let Some(llm_api_base_url) = &self.llm_api_base_url {
            config.llm.api_base_url = llm_api_base_url.clone();
        }
        if let Some(llm_api_key) = &self.llm_api_key {
            config.llm.api_key = llm_api_key.clone();
        }
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(max_parallels) = self.max_parallels {
            config.research.max_parallels = max_parallels;
        }

        if self.no_web {
            config.web.enabled = false;
        }
        if let Some(log_level) = &self.log_level {
            config.log_level = log_level.clone();
        }
        if let Command::Research { verbose: true, .. } = self.command {
            config.verbose = true;
        }

        Ok(config)
    }
}
