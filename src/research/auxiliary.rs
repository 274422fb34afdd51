//! 按问题关键词触发的辅助研究：队伍搭配、培养、稀有宝可梦

use serde_json::{Map, Value, json};

use crate::research::context::DataKeys;
use crate::research::services::ResearchServices;
use crate::research::types::ResearchError;

/// 属性克制表：攻击属性 -> 效果拔群的防御属性
pub const TYPE_ADVANTAGES: &[(&str, &[&str])] = &[
    ("fire", &["grass", "ice", "bug", "steel"]),
    ("water", &["fire", "ground", "rock"]),
    ("grass", &["water", "ground", "rock"]),
    ("electric", &["water", "flying"]),
    ("ice", &["grass", "ground", "flying", "dragon"]),
    ("fighting", &["normal", "ice", "rock", "steel", "dark"]),
    ("poison", &["grass", "fairy"]),
    ("ground", &["fire", "electric", "poison", "rock", "steel"]),
    ("flying", &["grass", "fighting", "bug"]),
    ("psychic", &["fighting", "poison"]),
    ("bug", &["grass", "psychic", "dark"]),
    ("rock", &["fire", "ice", "flying", "bug"]),
    ("ghost", &["psychic", "ghost"]),
    ("dragon", &["dragon"]),
    ("dark", &["psychic", "ghost"]),
    ("steel", &["ice", "rock", "fairy"]),
    ("fairy", &["fighting", "dragon", "dark"]),
];

pub const TEAM_STRATEGIES: &[&str] = &[
    "Balanced team with different types",
    "Weather-based team (rain, sun, sand, hail)",
    "Trick room team for slower Pokemon",
    "Hyper offense with fast sweepers",
    "Stall team with defensive Pokemon",
    "Volt-turn team with momentum moves",
];

/// 适合新手培养的宝可梦
pub const BEGINNER_POKEMON: &[&str] = &[
    "pikachu",
    "charmander",
    "bulbasaur",
    "squirtle",
    "pidgey",
    "rattata",
];

pub const UNIQUE_CRITERIA: &[&str] = &["legendary", "mythical", "regional", "fossil", "water", "ocean"];

/// 每个类别保留的最大结果数
pub const UNIQUE_RESULT_LIMIT: usize = 10;

const TEAM_TRIGGERS: &[&str] = &["team", "party"];
const TRAINING_TRIGGERS: &[&str] = &["train", "easy", "evolution"];
const UNIQUE_TRIGGERS: &[&str] = &["unique", "sea"];

/// 辅助研究模式，三者互斥
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxiliaryMode {
    TeamComposition,
    Training,
    UniquePokemon,
}

impl AuxiliaryMode {
    /// 按优先级匹配关键词（忽略大小写的子串匹配），没有命中时不做辅助研究
    pub fn route(query: &str) -> Option<Self> {
        let query = query.to_lowercase();
        let matches = |triggers: &[&str]| triggers.iter().any(|t| query.contains(t));

        if matches(TEAM_TRIGGERS) {
            Some(AuxiliaryMode::TeamComposition)
        } else if matches(TRAINING_TRIGGERS) {
            Some(AuxiliaryMode::Training)
        } else if matches(UNIQUE_TRIGGERS) {
            Some(AuxiliaryMode::UniquePokemon)
        } else {
            None
        }
    }

    /// 结果写入 `collected_data` 的键
    pub fn data_key(&self) -> &'static str {
        match self {
            AuxiliaryMode::TeamComposition => DataKeys::TEAM_RESEARCH,
            AuxiliaryMode::Training => DataKeys::TRAINING_RESEARCH,
            AuxiliaryMode::UniquePokemon => DataKeys::UNIQUE_POKEMON,
        }
    }

    pub fn success_description(&self) -> &'static str {
        match self {
            AuxiliaryMode::TeamComposition => {
                "Researched team composition strategies and type advantages"
            }
            AuxiliaryMode::Training => "Researched training information for early-game Pokemon",
            AuxiliaryMode::UniquePokemon => {
                "Researched unique Pokemon matching the query criteria"
            }
        }
    }

    pub fn failure_description(&self) -> &'static str {
        match self {
            AuxiliaryMode::TeamComposition => "Failed to research team composition",
            AuxiliaryMode::Training => "Failed to research training information",
            AuxiliaryMode::UniquePokemon => "Failed to research unique Pokemon",
        }
    }

    pub async fn research(
        &self,
        services: &ResearchServices,
        query: &str,
    ) -> Result<Value, ResearchError> {
        match self {
            AuxiliaryMode::TeamComposition => research_team_composition(services).await,
            AuxiliaryMode::Training => research_training(services).await,
            AuxiliaryMode::UniquePokemon => research_unique_pokemon(services, query).await,
        }
    }
}

pub fn type_advantages() -> Value {
    let table: Map<String, Value> = TYPE_ADVANTAGES
        .iter()
        .map(|(attacker, defenders)| (attacker.to_string(), Value::from(defenders.to_vec())))
        .collect();
    Value::Object(table)
}

pub fn team_strategies() -> Value {
    Value::from(TEAM_STRATEGIES.to_vec())
}

async fn research_team_composition(services: &ResearchServices) -> Result<Value, ResearchError> {
    let available_types = services.structured.get_all_categories().await?;

    Ok(json!({
        "available_types": available_types,
        "type_advantages": type_advantages(),
        "team_strategies": team_strategies(),
    }))
}

async fn research_training(services: &ResearchServices) -> Result<Value, ResearchError> {
    let mut training_data = Map::new();

    for name in BEGINNER_POKEMON {
        let Some(record) = services.structured.get_by_name(name).await? else {
            tracing::debug!(pokemon = *name, "训练研究中未找到数据");
            continue;
        };
        let evolution_chain = services.structured.get_evolution_chain(name).await?;

        training_data.insert(
            name.to_string(),
            json!({
                "base_exp": record.base_experience,
                "evolution_chain": evolution_chain,
                "stats": record.stats,
            }),
        );
    }

    Ok(Value::Object(training_data))
}

async fn research_unique_pokemon(
    services: &ResearchServices,
    query: &str,
) -> Result<Value, ResearchError> {
    let query = query.to_lowercase();
    let mut unique_pokemon = Map::new();

    for criteria in UNIQUE_CRITERIA.iter().filter(|c| query.contains(*c)) {
        let mut matches = services.structured.search_by_category(criteria).await?;
        matches.truncate(UNIQUE_RESULT_LIMIT);
        unique_pokemon.insert(criteria.to_string(), serde_json::to_value(matches)?);
    }

    Ok(Value::Object(unique_pokemon))
}
