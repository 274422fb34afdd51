//! 研究流程 - 将LLM推理与两类数据源串联成固定的四个阶段

pub mod analysis;
pub mod auxiliary;
pub mod clarify;
pub mod context;
pub mod gather;
pub mod orchestrator;
pub mod prompts;
pub mod report;
pub mod services;
pub mod stage;
pub mod types;

pub use context::{DataKeys, ResearchContext};
pub use orchestrator::ResearchOrchestrator;
pub use services::ResearchServices;
pub use types::{ResearchError, ResearchReport, ResearchStep, ResearchStepType};
