use async_trait::async_trait;

use crate::llm::client::utils::extract_json_payload;
use crate::research::context::{DataKeys, ResearchContext};
use crate::research::prompts::{ANALYSIS_SYSTEM_PROMPT, analysis_user_prompt};
use crate::research::services::ResearchServices;
use crate::research::stage::ResearchStage;
use crate::research::types::{AnalysisOutcome, ResearchError, ResearchStep, ResearchStepType};

const ANALYSIS_MAX_TOKENS: u32 = 1000;
const ANALYSIS_TEMPERATURE: f64 = 0.3;

/// 综合分析 - 基于全部已收集数据与研究目标给出结论
#[derive(Default)]
pub struct AnalysisStage;

impl AnalysisStage {
    async fn analyze(
        &self,
        services: &ResearchServices,
        context: &ResearchContext,
    ) -> Result<AnalysisOutcome, ResearchError> {
        let prompt = analysis_user_prompt(
            context.original_query(),
            context.clarified_goals(),
            context.collected_data(),
        );

        let content = services
            .llm
            .complete(
                ANALYSIS_SYSTEM_PROMPT,
                &prompt,
                ANALYSIS_MAX_TOKENS,
                ANALYSIS_TEMPERATURE,
            )
            .await?;

        parse_analysis(&content)
    }
}

/// 解析分析阶段的模型输出，置信度限制在 [0.0, 1.0]
pub fn parse_analysis(content: &str) -> Result<AnalysisOutcome, ResearchError> {
    let outcome: AnalysisOutcome = serde_json::from_str(extract_json_payload(content))
        .map_err(|e| ResearchError::MalformedResponse(e.to_string()))?;
    Ok(outcome.normalized())
}

#[async_trait]
impl ResearchStage for AnalysisStage {
    fn name(&self) -> &'static str {
        "FindingsAnalysis"
    }

    async fn execute(&self, services: &ResearchServices, context: &mut ResearchContext) {
        let result = self
            .analyze(services, context)
            .await
            .and_then(|outcome| serde_json::to_value(outcome).map_err(ResearchError::from));

        match result {
            Ok(analysis) => {
                context.store(DataKeys::ANALYSIS, analysis.clone());
                context.record_step(ResearchStep::succeeded(
                    ResearchStepType::Analysis,
                    "Analysed all research findings and generated insights",
                    analysis,
                ));
            }
            Err(e) => {
                tracing::error!("Error in analysis: {}", e);
                context.record_step(ResearchStep::failed(
                    ResearchStepType::Analysis,
                    "Failed to analyse research findings",
                    e,
                ));
            }
        }
    }
}
