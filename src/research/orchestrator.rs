use tracing::Instrument;
use uuid::Uuid;

use crate::research::analysis::AnalysisStage;
use crate::research::clarify::ClarifyStage;
use crate::research::context::ResearchContext;
use crate::research::gather::GatherStage;
use crate::research::report::ReportAssembler;
use crate::research::services::ResearchServices;
use crate::research::stage::ResearchStage;
use crate::research::types::ResearchReport;

/// 多阶段研究编排器：澄清 → 收集 → 分析 → 报告
pub struct ResearchOrchestrator {
    services: ResearchServices,
}

impl ResearchOrchestrator {
    pub fn new(services: ResearchServices) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &ResearchServices {
        &self.services
    }

    /// 执行完整研究流程
    ///
    /// 流程内部的失败只会体现为失败的步骤或降级报告，不会向调用方返回错误。
    pub async fn conduct_research(&self, query: &str) -> ResearchReport {
        let research_id = Uuid::new_v4();
        let span = tracing::info_span!("research", id = %research_id);

        async {
            println!("🚀 开始研究: {}", query);
            let mut context = ResearchContext::new(query);

            self.execute_stage(&ClarifyStage, &mut context).await;
            self.execute_stage(&GatherStage, &mut context).await;
            self.execute_stage(&AnalysisStage, &mut context).await;

            println!("📝 生成研究报告...");
            let report = ReportAssembler::assemble(&self.services, &context, research_id).await;

            let failed = report.research_steps.iter().filter(|s| !s.success).count();
            println!(
                "✓ 研究完成：共 {} 个步骤，{} 个失败",
                report.research_steps.len(),
                failed
            );
            report
        }
        .instrument(span)
        .await
    }

    /// 执行单个阶段
    async fn execute_stage<S>(&self, stage: &S, context: &mut ResearchContext)
    where
        S: ResearchStage,
    {
        println!("🤖 执行 {} 阶段...", stage.name());

        let before = context.research_steps().len();
        stage.execute(&self.services, context).await;
        let added = &context.research_steps()[before..];

        if added.iter().all(|s| s.success) {
            println!("✓ {} 完成", stage.name());
        } else {
            println!(
                "⚠️ {} 完成，其中 {} 个步骤失败",
                stage.name(),
                added.iter().filter(|s| !s.success).count()
            );
        }
    }
}
