use async_trait::async_trait;

use crate::research::context::ResearchContext;
use crate::research::services::ResearchServices;

/// 研究流程中的一个阶段
///
/// 阶段内部的任何失败都转换成失败的研究步骤，不会中断流程。
#[async_trait]
pub trait ResearchStage: Send + Sync {
    /// 阶段名称，用于进度输出
    fn name(&self) -> &'static str;

    async fn execute(&self, services: &ResearchServices, context: &mut ResearchContext);
}
