use anyhow::{Context, Result};
use std::sync::Arc;

use crate::config::Config;
use crate::llm::{LLMClient, LanguageModel};
use crate::sources::{PokeApiClient, StructuredSource, UnstructuredSource, WebResearcher};

/// 研究流程依赖的外部协作者，所有阶段共享
#[derive(Clone)]
pub struct ResearchServices {
    /// LLM调用器
    pub llm: Arc<dyn LanguageModel>,
    /// 结构化数据源
    pub structured: Arc<dyn StructuredSource>,
    /// 非结构化数据源
    pub unstructured: Arc<dyn UnstructuredSource>,
    /// 配置
    pub config: Config,
}

impl ResearchServices {
    pub fn new(
        config: Config,
        llm: Arc<dyn LanguageModel>,
        structured: Arc<dyn StructuredSource>,
        unstructured: Arc<dyn UnstructuredSource>,
    ) -> Self {
        Self {
            llm,
            structured,
            unstructured,
            config,
        }
    }

    /// 按配置创建真实的LLM与数据源客户端
    pub fn from_config(config: &Config) -> Result<Self> {
        let llm = LLMClient::new(&config.llm).context("Failed to create LLM client")?;
        let structured =
            PokeApiClient::new(&config.pokeapi).context("Failed to create PokeAPI client")?;
        let unstructured =
            WebResearcher::new(&config.web).context("Failed to create web researcher")?;

        Ok(Self::new(
            config.clone(),
            Arc::new(llm),
            Arc::new(structured),
            Arc::new(unstructured),
        ))
    }
}
