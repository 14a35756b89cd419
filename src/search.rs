//! Web search collection for report context.
//!
//! Search runs once, up front, before any section is generated. Each query in
//! the catalog belongs to one market [`Sector`]; sections later pull in only
//! the sectors they cover. A failed query never stops the run: it is logged
//! and recorded, and the affected sections simply get less context.
//!
//! # Examples
//!
//! ```ignore
//! use portfolio_report::{ReportConfig, SearchClient, SearchCollector, Sector, default_queries};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ReportConfig::from_env()?;
//!     let collector = SearchCollector::new(SearchClient::new(&config)?);
//!
//!     let context = collector.collect(&default_queries("2025"), "2025").await;
//!     println!("{}", context.for_sectors(&[Sector::Energy]));
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use serde::Serialize;

use super::chat::{ChatMessage, ChatRequest};
use super::config::ReportConfig;
use super::core::{ApiClient, ClientSettings};
use super::error::Result;
use super::traits::SearchOperations;

const SEARCH_SYSTEM_PROMPT: &str = "You are a search assistant that processes search queries \
and returns factual information about current events and data.";

/// Market area a search query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sector {
    Trade,
    Shipping,
    Energy,
    Commodities,
    Financial,
}

impl Sector {
    pub const ALL: [Sector; 5] = [
        Sector::Trade,
        Sector::Shipping,
        Sector::Energy,
        Sector::Commodities,
        Sector::Financial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Sector::Trade => "trade",
            Sector::Shipping => "shipping",
            Sector::Energy => "energy",
            Sector::Commodities => "commodities",
            Sector::Financial => "financial",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub sector: Sector,
    pub text: String,
}

impl SearchQuery {
    pub fn new(sector: Sector, text: impl Into<String>) -> Self {
        Self {
            sector,
            text: text.into(),
        }
    }
}

const QUERY_CATALOG: &[(Sector, &str)] = &[
    (Sector::Trade, "current global trade metrics and trends"),
    (Sector::Trade, "global GDP growth forecast by region"),
    (Sector::Trade, "international trade volumes by commodity"),
    (Sector::Trade, "emerging markets economic outlook"),
    (Sector::Trade, "global inflation rates and impact on trade"),
    (Sector::Trade, "China trade policy and import/export volumes"),
    (Sector::Trade, "supply chain disruptions and logistics trends"),
    (Sector::Shipping, "container shipping rates and market trends"),
    (Sector::Shipping, "Baltic Dry Index latest values and forecasts"),
    (Sector::Shipping, "tanker shipping market rates and vessel utilization"),
    (Sector::Shipping, "VLCC spot rates and time charter rates"),
    (Sector::Shipping, "capesize vessel earnings and fleet growth"),
    (Sector::Shipping, "panamax and supramax market trends"),
    (Sector::Shipping, "LNG carrier market rates and orderbook"),
    (Sector::Shipping, "port congestion data and container throughput"),
    (Sector::Shipping, "shipping industry regulatory changes impact"),
    (Sector::Shipping, "IMO emission regulations shipping impact"),
    (Sector::Energy, "crude oil price forecasts and inventory levels"),
    (Sector::Energy, "natural gas market supply demand balance"),
    (Sector::Energy, "LNG market growth and trade flows"),
    (Sector::Energy, "renewable energy investment trends"),
    (Sector::Energy, "energy transition impact on shipping"),
    (Sector::Energy, "bunker fuel prices and trends"),
    (Sector::Commodities, "iron ore market prices and production data"),
    (Sector::Commodities, "copper supply demand balance and price forecasts"),
    (Sector::Commodities, "aluminum market trends and inventory levels"),
    (Sector::Commodities, "agricultural commodities trade flows"),
    (Sector::Commodities, "grain production forecasts and shipping demand"),
    (Sector::Commodities, "commodity futures market positioning"),
    (Sector::Financial, "shipping company stock performance"),
    (Sector::Financial, "global interest rates and bond market"),
    (Sector::Financial, "currency exchange rates impact on shipping"),
    (Sector::Financial, "shipping industry financing and debt levels"),
];

/// The built-in query catalog, each query suffixed with `year`.
pub fn default_queries(year: &str) -> Vec<SearchQuery> {
    QUERY_CATALOG
        .iter()
        .map(|(sector, text)| SearchQuery::new(*sector, format!("{} {}", text, year)))
        .collect()
}

/// Outcome of one query. Exactly one of `content` and `error` is set.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub query: String,
    pub sector: Sector,
    pub content: Option<String>,
    pub error: Option<String>,
}

impl SearchResult {
    pub fn is_usable(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// True when too many queries failed and the context was dropped
    pub discarded: bool,
}

/// All search results of one run, ready to be formatted into prompts.
#[derive(Debug, Clone, Default)]
pub struct SearchContext {
    results: Vec<SearchResult>,
    year: String,
    discarded: bool,
}

impl SearchContext {
    /// Wraps collected results.
    ///
    /// When more than half of the queries failed the remaining answers are
    /// treated as unreliable and the whole context is discarded.
    pub fn new(results: Vec<SearchResult>, year: impl Into<String>) -> Self {
        let failed = results.iter().filter(|r| !r.is_usable()).count();
        let discarded = failed * 2 > results.len();
        Self {
            results,
            year: year.into(),
            discarded,
        }
    }

    /// A context with no results, used when search is skipped.
    pub fn empty(year: impl Into<String>) -> Self {
        Self::new(Vec::new(), year)
    }

    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn summary(&self) -> SearchSummary {
        let successful = self.results.iter().filter(|r| r.is_usable()).count();
        SearchSummary {
            total: self.results.len(),
            successful,
            failed: self.results.len() - successful,
            discarded: self.discarded,
        }
    }

    /// Formats the usable results of the given sectors as a prompt block.
    ///
    /// Returns an empty string when there is nothing to include, so callers
    /// can skip the search message entirely.
    pub fn for_sectors(&self, sectors: &[Sector]) -> String {
        if self.discarded {
            return String::new();
        }

        let relevant: Vec<&SearchResult> = self
            .results
            .iter()
            .filter(|r| sectors.contains(&r.sector) && r.is_usable())
            .collect();

        if relevant.is_empty() {
            return String::new();
        }

        let mut text = format!("Web Search Results (current as of {}):\n", self.year);
        for (i, result) in relevant.iter().enumerate() {
            text.push_str(&format!(
                "\n---Result {}: {}---\n{}\n",
                i + 1,
                result.query,
                result.content.as_deref().unwrap_or_default().trim()
            ));
        }
        text
    }
}

/// Runs a query catalog against a search API, one query at a time.
#[derive(Debug, Clone)]
pub struct SearchCollector<S> {
    searcher: S,
}

impl<S: SearchOperations> SearchCollector<S> {
    pub fn new(searcher: S) -> Self {
        Self { searcher }
    }

    /// Executes every query and wraps the outcomes in a [`SearchContext`].
    ///
    /// Never fails: errors and empty answers are recorded per query.
    pub async fn collect(&self, queries: &[SearchQuery], year: &str) -> SearchContext {
        tracing::info!("Executing {} web searches", queries.len());
        let mut results = Vec::with_capacity(queries.len());

        for (i, query) in queries.iter().enumerate() {
            let result = match self.searcher.search(&query.text).await {
                Ok(content) if !content.trim().is_empty() => {
                    let preview: String = content.chars().take(100).collect();
                    tracing::debug!("Search {} succeeded: '{}' -> {}...", i + 1, query.text, preview);
                    SearchResult {
                        query: query.text.clone(),
                        sector: query.sector,
                        content: Some(content),
                        error: None,
                    }
                }
                Ok(_) => {
                    tracing::warn!("Search {} returned no content: '{}'", i + 1, query.text);
                    SearchResult {
                        query: query.text.clone(),
                        sector: query.sector,
                        content: None,
                        error: Some("empty response".to_string()),
                    }
                }
                Err(e) => {
                    tracing::error!("Search {} failed: '{}': {}", i + 1, query.text, e);
                    SearchResult {
                        query: query.text.clone(),
                        sector: query.sector,
                        content: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            results.push(result);
        }

        let context = SearchContext::new(results, year);
        let summary = context.summary();

        if summary.total > 0 && summary.successful == 0 {
            tracing::error!("All search queries failed to return useful content");
        } else if summary.discarded {
            tracing::warn!(
                "{} of {} searches failed; report will not include search data",
                summary.failed,
                summary.total
            );
        } else if summary.failed > 0 {
            tracing::warn!(
                "{} of {} searches failed to return useful content",
                summary.failed,
                summary.total
            );
        } else {
            tracing::info!("All {} searches returned content", summary.total);
        }

        context
    }
}

/// Search API client speaking the OpenAI-compatible chat format.
#[derive(Debug, Clone)]
pub struct SearchClient {
    api: ApiClient,
    model: String,
}

impl SearchClient {
    /// Creates a search client from the report configuration.
    ///
    /// Uses `config.base_urls.search`, `config.search_api_key` and
    /// `config.search_model`, with the shared rate limit, timeout and retry
    /// policy. A key without the usual `pplx-` prefix is accepted but logged
    /// as a warning.
    ///
    /// # Arguments
    ///
    /// * `config` - The run configuration; only the search fields are read
    ///
    /// # Errors
    ///
    /// Returns `ReportError::ConfigError` if the underlying [`ApiClient`]
    /// cannot be built (unusable key, zero rate limit).
    ///
    /// # Example
    ///
    /// ```ignore
    /// use portfolio_report::{ReportConfig, SearchClient, SearchOperations};
    ///
    /// let config = ReportConfig::from_env()?;
    /// let client = SearchClient::new(&config)?;
    /// let answer = client.search("Baltic Dry Index latest values 2025").await?;
    /// ```
    pub fn new(config: &ReportConfig) -> Result<Self> {
        if !config.search_api_key.starts_with("pplx-") {
            tracing::warn!("Search API key does not start with 'pplx-', the expected format");
        }
        tracing::debug!("Search API key: {}", config.search_key_preview());

        Ok(Self {
            api: ApiClient::new(ClientSettings::search(config))?,
            model: config.search_model.clone(),
        })
    }
}

#[async_trait]
impl SearchOperations for SearchClient {
    async fn search(&self, query: &str) -> Result<String> {
        let request = ChatRequest::new(
            &self.model,
            vec![
                ChatMessage::system(SEARCH_SYSTEM_PROMPT),
                ChatMessage::user(query),
            ],
        );
        self.api.chat(&request).await?.into_text()
    }
}
