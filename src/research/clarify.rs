use async_trait::async_trait;
use serde_json::Value;

use crate::llm::client::utils::extract_json_payload;
use crate::research::context::{DataKeys, ResearchContext};
use crate::research::prompts::CLARIFICATION_SYSTEM_PROMPT;
use crate::research::services::ResearchServices;
use crate::research::stage::ResearchStage;
use crate::research::types::{ClarifiedIntent, ResearchError, ResearchStep, ResearchStepType};

const CLARIFICATION_MAX_TOKENS: u32 = 500;
const CLARIFICATION_TEMPERATURE: f64 = 0.3;

/// 目标澄清 - 从用户问题中提取研究目标与待研究的宝可梦
#[derive(Default)]
pub struct ClarifyStage;

impl ClarifyStage {
    /// 返回模型输出的原始JSON对象及其校验后的结构
    async fn clarify(
        &self,
        services: &ResearchServices,
        query: &str,
    ) -> Result<(Value, ClarifiedIntent), ResearchError> {
        let content = services
            .llm
            .complete(
                CLARIFICATION_SYSTEM_PROMPT,
                query,
                CLARIFICATION_MAX_TOKENS,
                CLARIFICATION_TEMPERATURE,
            )
            .await?;

        parse_clarification(&content)
    }
}

/// 解析澄清阶段的模型输出
pub fn parse_clarification(content: &str) -> Result<(Value, ClarifiedIntent), ResearchError> {
    let raw: Value = serde_json::from_str(extract_json_payload(content))
        .map_err(|e| ResearchError::MalformedResponse(e.to_string()))?;
    let intent: ClarifiedIntent = serde_json::from_value(raw.clone())
        .map_err(|e| ResearchError::MalformedResponse(e.to_string()))?;
    Ok((raw, intent))
}

#[async_trait]
impl ResearchStage for ClarifyStage {
    fn name(&self) -> &'static str {
        "GoalClarification"
    }

    async fn execute(&self, services: &ResearchServices, context: &mut ResearchContext) {
        let query = context.original_query().to_string();

        match self.clarify(services, &query).await {
            Ok((raw, intent)) => {
                tracing::info!(
                    goals = intent.goals.len(),
                    pokemon = ?intent.pokemon_to_research,
                    "研究目标已澄清"
                );

                context.set_clarified_goals(intent.goals);
                context.store(
                    DataKeys::POKEMON_TO_RESEARCH,
                    Value::from(intent.pokemon_to_research),
                );
                context.store(DataKeys::RESEARCH_FOCUS, Value::from(intent.research_focus));
                context.store(DataKeys::CONSTRAINTS, Value::from(intent.constraints));

                context.record_step(ResearchStep::succeeded(
                    ResearchStepType::Clarification,
                    "Clarified research goals and identified key areas to investigate",
                    raw,
                ));
            }
            Err(e) => {
                tracing::error!("Error in goal clarification: {}", e);
                context.record_step(ResearchStep::failed(
                    ResearchStepType::Clarification,
                    "Failed to clarify goals",
                    e,
                ));
            }
        }
    }
}
