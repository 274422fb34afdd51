pub mod cli;
pub mod config;
pub mod llm;
pub mod report;
pub mod research;
pub mod sources;
pub mod utils;
pub mod workflow;

// Re-export commonly used types
pub use config::Config;
pub use research::{ResearchOrchestrator, ResearchReport, ResearchServices};
