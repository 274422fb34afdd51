use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::llm::LlmError;
use crate::research::context::{DataKeys, ResearchContext};
use crate::research::prompts::{REPORT_SYSTEM_PROMPT, report_user_prompt};
use crate::research::services::ResearchServices;
use crate::research::types::{ResearchReport, ResearchStep};

const REPORT_TEMPERATURE: f64 = 0.4;

/// 执行摘要的最大字符数，超出部分以省略号代替
pub const EXECUTIVE_SUMMARY_MAX_CHARS: usize = 500;
const ELLIPSIS: &str = "...";

pub const DEFAULT_CONFIDENCE: f64 = 0.7;

/// 报告生成 - 流程的最后一道防线，任何失败都只会得到降级报告
pub struct ReportAssembler;

impl ReportAssembler {
    pub async fn assemble(
        services: &ResearchServices,
        context: &ResearchContext,
        research_id: Uuid,
    ) -> ResearchReport {
        match Self::generate_narrative(services, context).await {
            Ok(narrative) => Self::build_report(context, research_id, &narrative),
            Err(e) => {
                tracing::error!("Error generating report: {}", e);
                Self::degraded_report(context, research_id)
            }
        }
    }

    async fn generate_narrative(
        services: &ResearchServices,
        context: &ResearchContext,
    ) -> Result<String, LlmError> {
        let empty = Value::Object(Map::new());
        let analysis = context.get(DataKeys::ANALYSIS).unwrap_or(&empty);
        let prompt = report_user_prompt(
            context.original_query(),
            analysis,
            context.research_steps().len(),
        );

        services
            .llm
            .complete(
                REPORT_SYSTEM_PROMPT,
                &prompt,
                services.config.llm.max_tokens_per_response,
                REPORT_TEMPERATURE,
            )
            .await
    }

    /// 由叙述文本与上下文构造完整报告
    pub fn build_report(
        context: &ResearchContext,
        research_id: Uuid,
        narrative: &str,
    ) -> ResearchReport {
        let analysis = context.get(DataKeys::ANALYSIS);

        ResearchReport {
            research_id,
            query: context.original_query().to_string(),
            executive_summary: summarize(narrative),
            detailed_findings: context.collected_data().clone(),
            recommendations: string_list(analysis, "recommendations"),
            sources: collect_sources(context.research_steps()),
            research_steps: context.research_steps().to_vec(),
            confidence_score: confidence_from(analysis),
            limitations: string_list(analysis, "limitations"),
            generated_at: Utc::now(),
        }
    }

    pub fn degraded_report(context: &ResearchContext, research_id: Uuid) -> ResearchReport {
        ResearchReport {
            research_id,
            query: context.original_query().to_string(),
            executive_summary: "Error generating report".to_string(),
            detailed_findings: context.collected_data().clone(),
            recommendations: Vec::new(),
            sources: Vec::new(),
            research_steps: context.research_steps().to_vec(),
            confidence_score: 0.0,
            limitations: vec!["Failed to generate complete report".to_string()],
            generated_at: Utc::now(),
        }
    }
}

/// 按字符截断叙述文本
pub fn summarize(narrative: &str) -> String {
    if narrative.chars().count() <= EXECUTIVE_SUMMARY_MAX_CHARS {
        return narrative.to_string();
    }

    let mut summary: String = narrative.chars().take(EXECUTIVE_SUMMARY_MAX_CHARS).collect();
    summary.push_str(ELLIPSIS);
    summary
}

/// 汇总所有步骤的来源，去重并保留首次出现的顺序
pub fn collect_sources(steps: &[ResearchStep]) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for source in steps.iter().flat_map(|step| step.sources.iter()) {
        if !sources.contains(source) {
            sources.push(source.clone());
        }
    }
    sources
}

fn confidence_from(analysis: Option<&Value>) -> f64 {
    analysis
        .and_then(|a| a.get("confidence_score"))
        .and_then(Value::as_f64)
        .filter(|score| score.is_finite())
        .map(|score| score.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_CONFIDENCE)
}

fn string_list(analysis: Option<&Value>, key: &str) -> Vec<String> {
    analysis
        .and_then(|a| a.get(key))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
