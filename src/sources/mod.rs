//! 数据源 - 结构化数据（PokeAPI）与非结构化数据（社区网站）
//!
//! 研究流程只通过 [`StructuredSource`] 与 [`UnstructuredSource`] 访问数据，
//! 具体的HTTP实现位于 [`pokeapi`] 与 [`web`]。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod pokeapi;
pub mod web;

pub use pokeapi::PokeApiClient;
pub use web::WebResearcher;

/// 数据源错误。"未找到"不是错误，由 `Ok(None)` 表示。
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("request timed out")]
    Timeout,

    #[error("unexpected status {0} from {1}")]
    UnexpectedStatus(u16, String),

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else if err.is_decode() {
            SourceError::Decode(err.to_string())
        } else {
            SourceError::Http(err.to_string())
        }
    }
}

/// 一只宝可梦的结构化记录
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PokemonRecord {
    pub id: u32,
    pub name: String,
    pub types: Vec<String>,
    /// 身高（米）
    pub height: f64,
    /// 体重（千克）
    pub weight: f64,
    pub base_experience: Option<u32>,
    pub abilities: Vec<String>,
    pub stats: BTreeMap<String, u32>,
    pub moves: Vec<String>,
    pub sprites: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub evolution_chain: Vec<String>,
}

/// 网页检索得到的一条结果
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WebResult {
    pub title: String,
    pub url: String,
    pub content: String,
    pub source: String,
}

/// 对战相关信息
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompetitiveInfo {
    pub movesets: Vec<String>,
    pub strategies: Vec<String>,
    pub counters: Vec<String>,
    pub teammates: Vec<String>,
}

/// 结构化数据源
#[async_trait]
pub trait StructuredSource: Send + Sync {
    async fn get_by_name(&self, name: &str) -> Result<Option<PokemonRecord>, SourceError>;

    async fn get_description(&self, name: &str) -> Result<Option<String>, SourceError>;

    async fn get_evolution_chain(&self, name: &str) -> Result<Option<Vec<String>>, SourceError>;

    async fn get_all_categories(&self) -> Result<Vec<String>, SourceError>;

    /// 按类别搜索，数量上限由调用方截取
    async fn search_by_category(&self, category: &str)
    -> Result<Vec<PokemonRecord>, SourceError>;

    /// 用于来源标注的资源地址
    fn resource_url(&self, name: &str) -> String;
}

/// 非结构化数据源
///
/// 实现方应在内部吞掉单个站点的失败并退化为空结果。
#[async_trait]
pub trait UnstructuredSource: Send + Sync {
    async fn search(&self, name: &str) -> Result<Vec<WebResult>, SourceError>;

    /// 至多5条
    async fn training_tips(&self, name: &str) -> Result<Vec<String>, SourceError>;

    async fn competitive_info(&self, name: &str) -> Result<CompetitiveInfo, SourceError>;

    /// 至多3条
    async fn location_info(&self, name: &str) -> Result<Vec<String>, SourceError>;
}

/// 统一名称格式：小写、去空白、空格转连字符
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::normalize_name;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Pikachu"), "pikachu");
        assert_eq!(normalize_name("  Mr Mime "), "mr-mime");
        assert_eq!(normalize_name("ho-oh"), "ho-oh");
    }
}
