use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Display;
use uuid::Uuid;

use crate::llm::LlmError;
use crate::sources::SourceError;

/// 研究步骤类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResearchStepType {
    Clarification,
    PokeapiQuery,
    WebSearch,
    Analysis,
}

impl Display for ResearchStepType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            ResearchStepType::Clarification => "CLARIFICATION",
            ResearchStepType::PokeapiQuery => "POKEAPI_QUERY",
            ResearchStepType::WebSearch => "WEB_SEARCH",
            ResearchStepType::Analysis => "ANALYSIS",
        };
        write!(f, "{}", str)
    }
}

/// 一次研究操作的审计记录，写入上下文后不再修改
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResearchStep {
    pub step_type: ResearchStepType,
    pub description: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_data: Option<Value>,
    #[serde(default)]
    pub sources: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl ResearchStep {
    pub fn succeeded(
        step_type: ResearchStepType,
        description: impl Into<String>,
        output_data: Value,
    ) -> Self {
        Self {
            step_type,
            description: description.into(),
            success: true,
            error_message: None,
            output_data: Some(output_data),
            sources: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn failed(
        step_type: ResearchStepType,
        description: impl Into<String>,
        error: impl Display,
    ) -> Self {
        Self {
            step_type,
            description: description.into(),
            success: false,
            error_message: Some(error.to_string()),
            output_data: None,
            sources: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }
}

/// 最终研究报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchReport {
    pub research_id: Uuid,
    pub query: String,
    pub executive_summary: String,
    pub detailed_findings: Map<String, Value>,
    pub recommendations: Vec<String>,
    pub sources: Vec<String>,
    pub research_steps: Vec<ResearchStep>,
    /// 取值范围 [0.0, 1.0]
    pub confidence_score: f64,
    pub limitations: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// 目标澄清阶段要求模型输出的结构
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClarifiedIntent {
    pub goals: Vec<String>,
    pub pokemon_to_research: Vec<String>,
    #[serde(default)]
    pub research_focus: String,
    #[serde(default)]
    pub constraints: Vec<String>,
}

/// 分析阶段要求模型输出的结构
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisOutcome {
    #[serde(default)]
    pub key_findings: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub considerations: Vec<String>,
    #[serde(default)]
    pub limitations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
}

impl AnalysisOutcome {
    /// 将置信度限制在 [0.0, 1.0]，非有限值视为缺失
    pub fn normalized(mut self) -> Self {
        self.confidence_score = self
            .confidence_score
            .filter(|score| score.is_finite())
            .map(|score| score.clamp(0.0, 1.0));
        self
    }
}

/// 研究流程内部的错误
#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("malformed LLM response: {0}")]
    MalformedResponse(String),

    #[error("no data found for {0}")]
    NotFound(String),

    #[error("failed to serialize research data: {0}")]
    Serialization(#[from] serde_json::Error),
}
