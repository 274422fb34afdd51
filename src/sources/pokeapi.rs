//! PokeAPI客户端

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

use super::{PokemonRecord, SourceError, StructuredSource, normalize_name};
use crate::config::PokeApiConfig;

/// 记录中保留的招式数量
const MAX_MOVES: usize = 10;

#[derive(Debug, Deserialize)]
struct NamedResource {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawTypeSlot {
    #[serde(rename = "type")]
    kind: NamedResource,
}

#[derive(Debug, Deserialize)]
struct RawAbilitySlot {
    ability: NamedResource,
}

#[derive(Debug, Deserialize)]
struct RawStat {
    stat: NamedResource,
    base_stat: u32,
}

#[derive(Debug, Deserialize)]
struct RawMoveSlot {
    #[serde(rename = "move")]
    kind: NamedResource,
}

#[derive(Debug, Deserialize)]
struct RawPokemon {
    id: u32,
    name: String,
    #[serde(default)]
    types: Vec<RawTypeSlot>,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    weight: u32,
    base_experience: Option<u32>,
    #[serde(default)]
    abilities: Vec<RawAbilitySlot>,
    #[serde(default)]
    stats: Vec<RawStat>,
    #[serde(default)]
    moves: Vec<RawMoveSlot>,
    #[serde(default)]
    sprites: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawFlavorText {
    flavor_text: String,
    language: NamedResource,
}

#[derive(Debug, Deserialize)]
struct RawApiResource {
    url: String,
}

#[derive(Debug, Deserialize)]
struct RawSpecies {
    #[serde(default)]
    flavor_text_entries: Vec<RawFlavorText>,
    evolution_chain: Option<RawApiResource>,
}

#[derive(Debug, Deserialize)]
struct RawChainLink {
    species: NamedResource,
    #[serde(default)]
    evolves_to: Vec<RawChainLink>,
}

#[derive(Debug, Deserialize)]
struct RawEvolutionChain {
    chain: RawChainLink,
}

#[derive(Debug, Deserialize)]
struct RawResourceList {
    #[serde(default)]
    results: Vec<NamedResource>,
}

#[derive(Debug, Deserialize)]
struct RawTypePokemon {
    pokemon: NamedResource,
}

#[derive(Debug, Deserialize)]
struct RawTypeDetail {
    #[serde(default)]
    pokemon: Vec<RawTypePokemon>,
}

#[derive(Debug, Deserialize)]
struct RawHabitat {
    #[serde(default)]
    pokemon_species: Vec<NamedResource>,
}

impl From<RawPokemon> for PokemonRecord {
    fn from(raw: RawPokemon) -> Self {
        let sprites = raw
            .sprites
            .into_iter()
            .filter_map(|(key, value)| value.as_str().map(|url| (key, url.to_string())))
            .collect();

        Self {
            id: raw.id,
            name: raw.name,
            types: raw.types.into_iter().map(|t| t.kind.name).collect(),
            // PokeAPI以分米、百克为单位
            height: f64::from(raw.height) / 10.0,
            weight: f64::from(raw.weight) / 10.0,
            base_experience: raw.base_experience,
            abilities: raw.abilities.into_iter().map(|a| a.ability.name).collect(),
            stats: raw
                .stats
                .into_iter()
                .map(|s| (s.stat.name, s.base_stat))
                .collect(),
            moves: raw
                .moves
                .into_iter()
                .take(MAX_MOVES)
                .map(|m| m.kind.name)
                .collect(),
            sprites,
            description: None,
            evolution_chain: Vec::new(),
        }
    }
}

/// 解析 `/pokemon/{name}` 响应
pub fn parse_pokemon(value: Value) -> Result<PokemonRecord, SourceError> {
    let raw: RawPokemon =
        serde_json::from_value(value).map_err(|e| SourceError::Decode(e.to_string()))?;
    Ok(raw.into())
}

/// 取第一条英文图鉴描述，并把换页符、换行压成单个空格
pub fn parse_description(value: Value) -> Result<Option<String>, SourceError> {
    let species: RawSpecies =
        serde_json::from_value(value).map_err(|e| SourceError::Decode(e.to_string()))?;

    Ok(species
        .flavor_text_entries
        .into_iter()
        .find(|entry| entry.language.name == "en")
        .map(|entry| {
            entry
                .flavor_text
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
        }))
}

/// 深度优先展开进化链
pub fn parse_evolution_chain(value: Value) -> Result<Vec<String>, SourceError> {
    let chain: RawEvolutionChain =
        serde_json::from_value(value).map_err(|e| SourceError::Decode(e.to_string()))?;

    fn walk(link: RawChainLink, names: &mut Vec<String>) {
        if !names.contains(&link.species.name) {
            names.push(link.species.name);
        }
        for next in link.evolves_to {
            walk(next, names);
        }
    }

    let mut names = Vec::new();
    walk(chain.chain, &mut names);
    Ok(names)
}

/// PokeAPI REST客户端
#[derive(Clone)]
pub struct PokeApiClient {
    client: reqwest::Client,
    config: PokeApiConfig,
}

impl PokeApiClient {
    pub fn new(config: &PokeApiConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// GET并解析JSON，404返回None
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, SourceError> {
        tracing::debug!(url, "PokeAPI请求");
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SourceError::UnexpectedStatus(status.as_u16(), url.to_string()));
        }

        let body = response.json::<T>().await?;
        Ok(Some(body))
    }

    async fn get_species(&self, name: &str) -> Result<Option<Value>, SourceError> {
        let url = self.endpoint(&format!("pokemon-species/{}", normalize_name(name)));
        self.get_json(&url).await
    }

    /// 某个类别下的宝可梦名称：先按属性查找，再按栖息地查找
    async fn names_in_category(&self, category: &str) -> Result<Vec<String>, SourceError> {
        let category = normalize_name(category);
        let type_name = match category.as_str() {
            "ocean" | "sea" => "water",
            other => other,
        };

        let type_url = self.endpoint(&format!("type/{}", type_name));
        if let Some(detail) = self.get_json::<RawTypeDetail>(&type_url).await? {
            return Ok(detail
                .pokemon
                .into_iter()
                .map(|p| p.pokemon.name)
                .collect());
        }

        let habitat_url = self.endpoint(&format!("pokemon-habitat/{}", category));
        if let Some(habitat) = self.get_json::<RawHabitat>(&habitat_url).await? {
            return Ok(habitat
                .pokemon_species
                .into_iter()
                .map(|s| s.name)
                .collect());
        }

        Ok(Vec::new())
    }
}

#[async_trait]
impl StructuredSource for PokeApiClient {
    async fn get_by_name(&self, name: &str) -> Result<Option<PokemonRecord>, SourceError> {
        let url = self.endpoint(&format!("pokemon/{}", normalize_name(name)));
        match self.get_json::<Value>(&url).await? {
            Some(value) => parse_pokemon(value).map(Some),
            None => Ok(None),
        }
    }

    async fn get_description(&self, name: &str) -> Result<Option<String>, SourceError> {
        match self.get_species(name).await? {
            Some(species) => parse_description(species),
            None => Ok(None),
        }
    }

    async fn get_evolution_chain(&self, name: &str) -> Result<Option<Vec<String>>, SourceError> {
        let Some(species) = self.get_species(name).await? else {
            return Ok(None);
        };
        let species: RawSpecies =
            serde_json::from_value(species).map_err(|e| SourceError::Decode(e.to_string()))?;
        let Some(chain_ref) = species.evolution_chain else {
            return Ok(None);
        };

        match self.get_json::<Value>(&chain_ref.url).await? {
            Some(chain) => parse_evolution_chain(chain).map(Some),
            None => Ok(None),
        }
    }

    async fn get_all_categories(&self) -> Result<Vec<String>, SourceError> {
        let url = self.endpoint("type?limit=100");
        let list = self
            .get_json::<RawResourceList>(&url)
            .await?
            .unwrap_or(RawResourceList {
                results: Vec::new(),
            });
        Ok(list.results.into_iter().map(|r| r.name).collect())
    }

    async fn search_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<PokemonRecord>, SourceError> {
        let names = self.names_in_category(category).await?;
        let mut records = Vec::new();

        for name in names.into_iter().take(self.config.max_search_results) {
            if let Some(record) = self.get_by_name(&name).await? {
                records.push(record);
            }
        }

        tracing::debug!(category, found = records.len(), "类别搜索完成");
        Ok(records)
    }

    fn resource_url(&self, name: &str) -> String {
        self.endpoint(&format!("pokemon/{}", normalize_name(name)))
    }
}
