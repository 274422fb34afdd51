#![allow(dead_code)]

use async_trait::async_trait;
use pokedex_research::config::Config;
use pokedex_research::llm::{LanguageModel, LlmError};
use pokedex_research::research::ResearchServices;
use pokedex_research::sources::{
    CompetitiveInfo, PokemonRecord, SourceError, StructuredSource, UnstructuredSource, WebResult,
};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 按顺序返回预设回复的LLM，同时记录收到的提示词
#[derive(Default)]
pub struct ScriptedLlm {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl ScriptedLlm {
    pub fn new(responses: Vec<Result<String, LlmError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedLlm {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        _max_tokens: u32,
        _temperature: f64,
    ) -> Result<String, LlmError> {
        self.prompts
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Transport("script exhausted".to_string())))
    }
}

/// 两个数据源共享的调用记录，用于断言调用先后
pub type EventLog = Arc<Mutex<Vec<String>>>;

/// 内存中的结构化数据源
#[derive(Default)]
pub struct FakePokeApi {
    pub records: HashMap<String, PokemonRecord>,
    pub descriptions: HashMap<String, String>,
    pub chains: HashMap<String, Vec<String>>,
    pub categories: HashMap<String, Vec<PokemonRecord>>,
    pub failing: HashSet<String>,
    pub failing_categories: bool,
    pub delays_ms: HashMap<String, u64>,
    pub events: EventLog,
}

impl FakePokeApi {
    pub fn with_pokemon(mut self, name: &str, types: &[&str]) -> Self {
        self.records.insert(name.to_string(), record(name, types));
        self
    }

    pub fn with_description(mut self, name: &str, description: &str) -> Self {
        self.descriptions
            .insert(name.to_string(), description.to_string());
        self
    }

    pub fn with_chain(mut self, name: &str, chain: &[&str]) -> Self {
        self.chains.insert(
            name.to_string(),
            chain.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn with_category(mut self, category: &str, members: &[&str]) -> Self {
        self.categories.insert(
            category.to_string(),
            members.iter().map(|m| record(m, &[category])).collect(),
        );
        self
    }

    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn delayed(mut self, name: &str, delay_ms: u64) -> Self {
        self.delays_ms.insert(name.to_string(), delay_ms);
        self
    }

    pub fn failing_categories(mut self) -> Self {
        self.failing_categories = true;
        self
    }

    pub fn recording(mut self, events: &EventLog) -> Self {
        self.events = events.clone();
        self
    }
}

pub fn record(name: &str, types: &[&str]) -> PokemonRecord {
    PokemonRecord {
        id: 25,
        name: name.to_string(),
        types: types.iter().map(|t| t.to_string()).collect(),
        height: 0.4,
        weight: 6.0,
        base_experience: Some(112),
        abilities: vec!["static".to_string()],
        stats: BTreeMap::from([("speed".to_string(), 90)]),
        ..Default::default()
    }
}

#[async_trait]
impl StructuredSource for FakePokeApi {
    async fn get_by_name(&self, name: &str) -> Result<Option<PokemonRecord>, SourceError> {
        self.events.lock().unwrap().push(format!("structured start {}", name));
        if let Some(delay) = self.delays_ms.get(name) {
            tokio::time::sleep(Duration::from_millis(*delay)).await;
        }
        self.events.lock().unwrap().push(format!("structured end {}", name));
        if self.failing.contains(name) {
            return Err(SourceError::Http(format!("connection reset for {}", name)));
        }
        Ok(self.records.get(name).cloned())
    }

    async fn get_description(&self, name: &str) -> Result<Option<String>, SourceError> {
        Ok(self.descriptions.get(name).cloned())
    }

    async fn get_evolution_chain(&self, name: &str) -> Result<Option<Vec<String>>, SourceError> {
        Ok(self.chains.get(name).cloned())
    }

    async fn get_all_categories(&self) -> Result<Vec<String>, SourceError> {
        if self.failing_categories {
            return Err(SourceError::Http("category index unavailable".to_string()));
        }
        let mut categories: Vec<String> = self.categories.keys().cloned().collect();
        categories.sort();
        Ok(categories)
    }

    async fn search_by_category(&self, category: &str) -> Result<Vec<PokemonRecord>, SourceError> {
        Ok(self.categories.get(category).cloned().unwrap_or_default())
    }

    fn resource_url(&self, name: &str) -> String {
        format!("https://pokeapi.test/api/v2/pokemon/{}", name)
    }
}

/// 内存中的网页数据源
#[derive(Default)]
pub struct FakeWeb {
    pub results: HashMap<String, Vec<WebResult>>,
    pub failing: HashSet<String>,
    pub events: EventLog,
}

impl FakeWeb {
    pub fn with_results(mut self, name: &str, urls: &[&str]) -> Self {
        let results = urls
            .iter()
            .map(|url| WebResult {
                title: format!("{} page", name),
                url: url.to_string(),
                content: format!("{} is easy to train and is found near the sea.", name),
                source: "Test Wiki".to_string(),
            })
            .collect();
        self.results.insert(name.to_string(), results);
        self
    }

    pub fn failing_on(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn recording(mut self, events: &EventLog) -> Self {
        self.events = events.clone();
        self
    }

    fn check(&self, name: &str) -> Result<(), SourceError> {
        if self.failing.contains(name) {
            return Err(SourceError::Timeout);
        }
        Ok(())
    }
}

#[async_trait]
impl UnstructuredSource for FakeWeb {
    async fn search(&self, name: &str) -> Result<Vec<WebResult>, SourceError> {
        self.events.lock().unwrap().push(format!("web {}", name));
        self.check(name)?;
        Ok(self.results.get(name).cloned().unwrap_or_default())
    }

    async fn training_tips(&self, name: &str) -> Result<Vec<String>, SourceError> {
        self.check(name)?;
        Ok(vec![format!("Train {} early", name)])
    }

    async fn competitive_info(&self, name: &str) -> Result<CompetitiveInfo, SourceError> {
        self.check(name)?;
        Ok(CompetitiveInfo {
            strategies: vec![format!("Lead with {}", name)],
            ..Default::default()
        })
    }

    async fn location_info(&self, name: &str) -> Result<Vec<String>, SourceError> {
        self.check(name)?;
        Ok(vec!["Viridian Forest".to_string()])
    }
}

pub fn services(
    llm: Arc<ScriptedLlm>,
    structured: FakePokeApi,
    unstructured: FakeWeb,
) -> ResearchServices {
    services_with_config(Config::default(), llm, structured, unstructured)
}

pub fn services_with_config(
    config: Config,
    llm: Arc<ScriptedLlm>,
    structured: FakePokeApi,
    unstructured: FakeWeb,
) -> ResearchServices {
    ResearchServices::new(config, llm, Arc::new(structured), Arc::new(unstructured))
}

pub fn clarification(pokemon: &[&str]) -> Result<String, LlmError> {
    Ok(serde_json::json!({
        "goals": ["answer the question"],
        "pokemon_to_research": pokemon,
        "research_focus": "general",
        "constraints": []
    })
    .to_string())
}

pub fn analysis(confidence: f64) -> Result<String, LlmError> {
    Ok(serde_json::json!({
        "key_findings": ["Pikachu is fast"],
        "recommendations": ["Teach Thunderbolt"],
        "considerations": [],
        "limitations": ["Limited competitive data"],
        "confidence_score": confidence
    })
    .to_string())
}
