//! 社区网站检索 - Bulbapedia、Serebii、Pokémon Database
//!
//! 任何单个站点的失败只记录日志并退化为空结果，不会向上抛出。

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONNECTION, HeaderMap, HeaderValue, USER_AGENT};
use scraper::{Html, Node, Selector};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tokio::sync::RwLock;

use super::{CompetitiveInfo, SourceError, UnstructuredSource, WebResult, normalize_name};
use crate::config::WebConfig;

static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("valid selector"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));

/// 正文中不可见的元素
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

const MAX_TRAINING_TIPS: usize = 5;
const MAX_LOCATIONS: usize = 3;
const MAX_COMPETITIVE_ITEMS: usize = 3;
const MAX_SENTENCE_CHARS: usize = 300;
const MIN_SENTENCE_CHARS: usize = 15;

const TRAINING_KEYWORDS: &[&str] = &[
    "train", "level", "evolve", "experience", "stat", "raise", "ev ", "iv ",
];
const MOVESET_KEYWORDS: &[&str] = &["moveset", "move", "learns", "tm"];
const STRATEGY_KEYWORDS: &[&str] = &["strategy", "sweeper", "use it", "role", "tank", "support"];
const COUNTER_KEYWORDS: &[&str] = &["counter", "weak to", "weakness", "resist", "threat"];
const TEAMMATE_KEYWORDS: &[&str] = &["teammate", "partner", "pair", "synergy", "alongside"];
const LOCATION_KEYWORDS: &[&str] = &[
    "found in", "route", "forest", "cave", "located", "appears in", "island", "city", "catch",
];

/// 支持的社区站点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebProvider {
    Bulbapedia,
    Serebii,
    PokemonDatabase,
}

impl WebProvider {
    pub const ALL: [WebProvider; 3] = [
        WebProvider::Bulbapedia,
        WebProvider::Serebii,
        WebProvider::PokemonDatabase,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            WebProvider::Bulbapedia => "Bulbapedia",
            WebProvider::Serebii => "Serebii",
            WebProvider::PokemonDatabase => "Pokemon Database",
        }
    }

    /// 站点上宝可梦页面的地址
    pub fn page_url(&self, name: &str) -> String {
        let name = normalize_name(name);
        match self {
            WebProvider::Bulbapedia => {
                let mut chars = name.chars();
                let title = match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                };
                format!(
                    "https://bulbapedia.bulbagarden.net/wiki/{}_(Pok%C3%A9mon)",
                    title
                )
            }
            WebProvider::Serebii => format!("https://www.serebii.net/pokedex-sv/{}/", name),
            WebProvider::PokemonDatabase => format!("https://pokemondb.net/pokedex/{}", name),
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 提取 `<body>` 中可见的文本，实体由HTML解析器解码
pub fn extract_text_content(html: &str) -> String {
    let document = Html::parse_document(html);
    let Some(body) = document.select(&BODY).next() else {
        return String::new();
    };

    let mut text = String::new();
    for node in body.descendants() {
        let Node::Text(fragment) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            matches!(ancestor.value(), Node::Element(e) if NON_CONTENT_TAGS.contains(&e.name()))
        });
        if !hidden {
            text.push_str(fragment);
            text.push(' ');
        }
    }
    collapse_whitespace(&text)
}

/// 提取页面标题
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&TITLE)
        .next()
        .map(|title| collapse_whitespace(&title.text().collect::<String>()))
        .filter(|title| !title.is_empty())
}

/// 按字符截断
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|s| {
            let len = s.chars().count();
            (MIN_SENTENCE_CHARS..=MAX_SENTENCE_CHARS).contains(&len)
        })
}

/// 从检索结果中挑出包含关键词的句子，去重后至多保留 `limit` 条
fn collect_sentences(results: &[WebResult], keywords: &[&str], limit: usize) -> Vec<String> {
    let mut picked: Vec<String> = Vec::new();
    for result in results {
        for sentence in split_sentences(&result.content) {
            if picked.len() >= limit {
                return picked;
            }
            let lower = sentence.to_lowercase();
            if keywords.iter().any(|k| lower.contains(k)) && !picked.iter().any(|p| p == sentence)
            {
                picked.push(sentence.to_string());
            }
        }
    }
    picked
}

pub fn derive_training_tips(results: &[WebResult]) -> Vec<String> {
    collect_sentences(results, TRAINING_KEYWORDS, MAX_TRAINING_TIPS)
}

pub fn derive_competitive_info(results: &[WebResult]) -> CompetitiveInfo {
    CompetitiveInfo {
        movesets: collect_sentences(results, MOVESET_KEYWORDS, MAX_COMPETITIVE_ITEMS),
        strategies: collect_sentences(results, STRATEGY_KEYWORDS, MAX_COMPETITIVE_ITEMS),
        counters: collect_sentences(results, COUNTER_KEYWORDS, MAX_COMPETITIVE_ITEMS),
        teammates: collect_sentences(results, TEAMMATE_KEYWORDS, MAX_COMPETITIVE_ITEMS),
    }
}

pub fn derive_location_info(results: &[WebResult]) -> Vec<String> {
    collect_sentences(results, LOCATION_KEYWORDS, MAX_LOCATIONS)
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36",
        ),
    );
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.insert(
        "Upgrade-Insecure-Requests",
        HeaderValue::from_static("1"),
    );
    headers
}

/// 多站点网页检索器
///
/// 同一实体的检索结果在实例内缓存，四类查询共用一次抓取。
#[derive(Clone)]
pub struct WebResearcher {
    client: reqwest::Client,
    config: WebConfig,
    cache: Arc<RwLock<HashMap<String, Vec<WebResult>>>>,
}

impl WebResearcher {
    pub fn new(config: &WebConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .default_headers(default_headers())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            config: config.clone(),
            cache: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    /// 抓取单个站点，非2xx视为没有结果
    async fn search_provider(
        &self,
        provider: WebProvider,
        name: &str,
    ) -> Result<Option<WebResult>, SourceError> {
        let url = provider.page_url(name);
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            tracing::debug!(provider = provider.display_name(), status = %response.status(), "站点无结果");
            return Ok(None);
        }

        let html = response.text().await?;
        let content = truncate_chars(&extract_text_content(&html), self.config.max_content_chars);
        if content.is_empty() {
            return Ok(None);
        }

        let title = extract_title(&html)
            .unwrap_or_else(|| format!("{} - {}", name, provider.display_name()));

        Ok(Some(WebResult {
            title,
            url,
            content,
            source: provider.display_name().to_string(),
        }))
    }

    async fn fetch_all_providers(&self, name: &str) -> Vec<WebResult> {
        let searches = WebProvider::ALL
            .iter()
            .map(|provider| async move { (*provider, self.search_provider(*provider, name).await) });

        let mut results = Vec::new();
        for (provider, outcome) in futures::future::join_all(searches).await {
            match outcome {
                Ok(Some(result)) => results.push(result),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("{} search failed for {}: {}", provider.display_name(), name, e);
                }
            }
        }
        results.truncate(self.config.max_results);
        results
    }
}

#[async_trait]
impl UnstructuredSource for WebResearcher {
    async fn search(&self, name: &str) -> Result<Vec<WebResult>, SourceError> {
        if !self.config.enabled {
            return Ok(Vec::new());
        }

        let key = normalize_name(name);
        if let Some(cached) = self.cache.read().await.get(&key) {
            return Ok(cached.clone());
        }

        let results = self.fetch_all_providers(name).await;
        self.cache.write().await.insert(key, results.clone());
        Ok(results)
    }

    async fn training_tips(&self, name: &str) -> Result<Vec<String>, SourceError> {
        Ok(derive_training_tips(&self.search(name).await?))
    }

    async fn competitive_info(&self, name: &str) -> Result<CompetitiveInfo, SourceError> {
        Ok(derive_competitive_info(&self.search(name).await?))
    }

    async fn location_info(&self, name: &str) -> Result<Vec<String>, SourceError> {
        Ok(derive_location_info(&self.search(name).await?))
    }
}
