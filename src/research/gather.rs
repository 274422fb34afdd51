use async_trait::async_trait;
use serde_json::{Value, json};

use crate::research::auxiliary::AuxiliaryMode;
use crate::research::context::{DataKeys, ResearchContext};
use crate::research::services::ResearchServices;
use crate::research::stage::ResearchStage;
use crate::research::types::{ResearchError, ResearchStep, ResearchStepType};
use crate::utils::threads::do_parallel_with_limit;

/// 单只宝可梦的数据检索结果，按固定顺序写回上下文
struct EntityFindings {
    structured: (String, ResearchStep, Option<Value>),
    web: (String, ResearchStep, Option<Value>),
}

/// 数据收集 - 对每只待研究的宝可梦查询结构化与网页数据，再按问题关键词做辅助研究
#[derive(Default)]
pub struct GatherStage;

impl GatherStage {
    async fn research_entity(services: &ResearchServices, name: String) -> EntityFindings {
        // 并行度为1时严格串行，结构化查询完成后才访问网页
        let (structured, web) = if services.config.research.max_parallels > 1 {
            tokio::join!(
                Self::structured_lookup(services, &name),
                Self::web_lookup(services, &name)
            )
        } else {
            let structured = Self::structured_lookup(services, &name).await;
            (structured, Self::web_lookup(services, &name).await)
        };

        let structured = match structured {
            Ok(record) => (
                DataKeys::pokemon(&name),
                ResearchStep::succeeded(
                    ResearchStepType::PokeapiQuery,
                    format!("Retrieved comprehensive data for {} from PokeAPI", name),
                    json!({ "pokemon_data": record.clone() }),
                )
                .with_sources(vec![services.structured.resource_url(&name)]),
                Some(record),
            ),
            Err(e) => {
                tracing::warn!("PokeAPI lookup failed for {}: {}", name, e);
                (
                    DataKeys::pokemon(&name),
                    ResearchStep::failed(
                        ResearchStepType::PokeapiQuery,
                        format!("Failed to retrieve data for {}", name),
                        e,
                    ),
                    None,
                )
            }
        };

        let web = match web {
            Ok((data, sources)) => (
                DataKeys::web_data(&name),
                ResearchStep::succeeded(
                    ResearchStepType::WebSearch,
                    format!("Gathered additional information about {} from web sources", name),
                    data.clone(),
                )
                .with_sources(sources),
                Some(data),
            ),
            Err(e) => {
                tracing::warn!("Web research failed for {}: {}", name, e);
                (
                    DataKeys::web_data(&name),
                    ResearchStep::failed(
                        ResearchStepType::WebSearch,
                        format!("Failed to gather web data for {}", name),
                        e,
                    ),
                    None,
                )
            }
        };

        EntityFindings { structured, web }
    }

    /// 基础记录缺失视为失败；描述与进化链缺失时留空
    async fn structured_lookup(
        services: &ResearchServices,
        name: &str,
    ) -> Result<Value, ResearchError> {
        let mut record = services
            .structured
            .get_by_name(name)
            .await?
            .ok_or_else(|| ResearchError::NotFound(name.to_string()))?;

        record.description = services.structured.get_description(name).await?;
        record.evolution_chain = services
            .structured
            .get_evolution_chain(name)
            .await?
            .unwrap_or_default();

        Ok(serde_json::to_value(record)?)
    }

    /// 返回网页数据与其来源地址
    async fn web_lookup(
        services: &ResearchServices,
        name: &str,
    ) -> Result<(Value, Vec<String>), ResearchError> {
        let web_results = services.unstructured.search(name).await?;
        let training_tips = services.unstructured.training_tips(name).await?;
        let competitive_info = services.unstructured.competitive_info(name).await?;
        let location_info = services.unstructured.location_info(name).await?;

        let sources = web_results.iter().map(|r| r.url.clone()).collect();
        let data = json!({
            "web_results": web_results,
            "training_tips": training_tips,
            "competitive_info": competitive_info,
            "location_info": location_info,
        });

        Ok((data, sources))
    }

    async fn run_auxiliary(services: &ResearchServices, context: &mut ResearchContext) {
        let query = context.original_query().to_string();
        let Some(mode) = AuxiliaryMode::route(&query) else {
            tracing::debug!("问题未命中辅助研究关键词");
            return;
        };

        println!("   🔎 辅助研究: {:?}", mode);
        match mode.research(services, &query).await {
            Ok(data) => {
                context.store(mode.data_key(), data.clone());
                context.record_step(ResearchStep::succeeded(
                    ResearchStepType::Analysis,
                    mode.success_description(),
                    data,
                ));
            }
            Err(e) => {
                tracing::error!("Error in {:?} research: {}", mode, e);
                context.record_step(ResearchStep::failed(
                    ResearchStepType::Analysis,
                    mode.failure_description(),
                    e,
                ));
            }
        }
    }
}

#[async_trait]
impl ResearchStage for GatherStage {
    fn name(&self) -> &'static str {
        "DataGathering"
    }

    async fn execute(&self, services: &ResearchServices, context: &mut ResearchContext) {
        let names = context.pokemon_to_research();
        let max_parallels = services.config.research.max_parallels;
        if names.len() > services.config.research.max_research_steps {
            tracing::warn!(
                "待研究宝可梦数量 {} 超过建议上限 {}",
                names.len(),
                services.config.research.max_research_steps
            );
        }

        let lookups = names
            .into_iter()
            .map(|name| Self::research_entity(services, name))
            .collect::<Vec<_>>();
        let findings = do_parallel_with_limit(lookups, max_parallels).await;

        for EntityFindings { structured, web } in findings {
            for (key, step, data) in [structured, web] {
                if let Some(data) = data {
                    context.store(key, data);
                }
                context.record_step(step);
            }
        }

        Self::run_auxiliary(services, context).await;
    }
}
