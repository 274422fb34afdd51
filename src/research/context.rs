use serde_json::{Map, Value};

use crate::research::types::ResearchStep;

/// `collected_data` 中各阶段使用的键
pub struct DataKeys;

impl DataKeys {
    pub const POKEMON_TO_RESEARCH: &'static str = "pokemon_to_research";
    pub const RESEARCH_FOCUS: &'static str = "research_focus";
    pub const CONSTRAINTS: &'static str = "constraints";
    pub const ANALYSIS: &'static str = "analysis";
    pub const TEAM_RESEARCH: &'static str = "team_research";
    pub const TRAINING_RESEARCH: &'static str = "training_research";
    pub const UNIQUE_POKEMON: &'static str = "unique_pokemon";

    /// 单只宝可梦的结构化数据
    pub fn pokemon(name: &str) -> String {
        format!("pokemon_{}", name)
    }

    /// 单只宝可梦的网页数据
    pub fn web_data(name: &str) -> String {
        format!("web_data_{}", name)
    }
}

/// 单次查询的研究上下文
///
/// 由编排器独占，各阶段依次读写；`collected_data` 只增不删，
/// `research_steps` 按执行顺序追加。
#[derive(Debug, Clone)]
pub struct ResearchContext {
    original_query: String,
    clarified_goals: Vec<String>,
    collected_data: Map<String, Value>,
    research_steps: Vec<ResearchStep>,
}

impl ResearchContext {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            original_query: query.into(),
            clarified_goals: Vec::new(),
            collected_data: Map::new(),
            research_steps: Vec::new(),
        }
    }

    pub fn original_query(&self) -> &str {
        &self.original_query
    }

    pub fn clarified_goals(&self) -> &[String] {
        &self.clarified_goals
    }

    pub fn set_clarified_goals(&mut self, goals: Vec<String>) {
        self.clarified_goals = goals;
    }

    pub fn collected_data(&self) -> &Map<String, Value> {
        &self.collected_data
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.collected_data.get(key)
    }

    pub fn has_data(&self, key: &str) -> bool {
        self.collected_data.contains_key(key)
    }

    /// 写入数据
    pub fn store(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if self.collected_data.contains_key(&key) {
            tracing::debug!(key = %key, "覆盖已有研究数据");
        }
        self.collected_data.insert(key, value);
    }

    pub fn record_step(&mut self, step: ResearchStep) {
        tracing::debug!(
            step_type = %step.step_type,
            success = step.success,
            "{}",
            step.description
        );
        self.research_steps.push(step);
    }

    pub fn research_steps(&self) -> &[ResearchStep] {
        &self.research_steps
    }

    /// 澄清阶段得到的待研究宝可梦列表，缺失时为空
    pub fn pokemon_to_research(&self) -> Vec<String> {
        self.collected_data
            .get(DataKeys::POKEMON_TO_RESEARCH)
            .and_then(Value::as_array)
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}
