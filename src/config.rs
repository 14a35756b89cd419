use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;

use super::error::{ReportError, Result};

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const PERPLEXITY_API_KEY: &str = "PERPLEXITY_API_KEY";

/// Configuration for one report run.
///
/// Built once at startup and handed to the clients and the pipeline; nothing
/// reads the environment after [`ReportConfig::from_env`] returns.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Bearer key for the generation API
    pub generation_api_key: String,
    /// Bearer key for the search API
    pub search_api_key: String,
    /// Model used for section generation
    pub generation_model: String,
    /// Model used for web search
    pub search_model: String,
    /// Reasoning effort sent with every generation request
    pub reasoning_effort: ReasoningEffort,
    /// Sampling temperature, omitted from requests when `None`
    pub temperature: Option<f32>,
    /// Date printed in the report title and prompts
    pub report_date: String,
    /// Firm name used in the report title and analyst persona
    pub firm_name: String,
    /// Rate limit in requests per second, per API
    pub rate_limit: u32,
    /// HTTP request timeout
    pub timeout: Duration,
    /// Re-sends allowed after an HTTP 429
    pub max_retries: u32,
    /// Base delay for the 429 backoff
    pub retry_backoff: Duration,
    /// Base URLs for the two APIs
    pub base_urls: ApiUrls,
    /// Where the report files are written
    pub output: OutputPaths,
}

/// Base URLs for the OpenAI-compatible endpoints.
#[derive(Debug, Clone)]
pub struct ApiUrls {
    /// Base URL for text generation
    pub generation: String,
    /// Base URL for web search
    pub search: String,
}

/// Fixed output locations.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub dir: PathBuf,
    pub markdown_file: String,
    pub json_file: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasoningEffort {
    Low,
    Medium,
    High,
}

impl ReasoningEffort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningEffort::Low => "low",
            ReasoningEffort::Medium => "medium",
            ReasoningEffort::High => "high",
        }
    }
}

impl Default for ApiUrls {
    fn default() -> Self {
        Self {
            generation: "https://api.openai.com/v1".to_string(),
            search: "https://api.perplexity.ai".to_string(),
        }
    }
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
            markdown_file: "comprehensive_portfolio_report.md".to_string(),
            json_file: "comprehensive_portfolio_data.json".to_string(),
        }
    }
}

impl OutputPaths {
    pub fn markdown_path(&self) -> PathBuf {
        self.dir.join(&self.markdown_file)
    }

    pub fn json_path(&self) -> PathBuf {
        self.dir.join(&self.json_file)
    }
}

impl ReportConfig {
    /// Creates a config with the given credentials and default settings.
    ///
    /// Both keys are trimmed of whitespace and surrounding quotes, which
    /// commonly survive copy-pasting into `.env` files. An empty key is
    /// rejected with [`ReportError::MissingCredential`].
    pub fn new(generation_api_key: &str, search_api_key: &str) -> Result<Self> {
        let generation_api_key = clean_key(generation_api_key)
            .ok_or(ReportError::MissingCredential(OPENAI_API_KEY))?;
        let search_api_key =
            clean_key(search_api_key).ok_or(ReportError::MissingCredential(PERPLEXITY_API_KEY))?;

        Ok(Self {
            generation_api_key,
            search_api_key,
            generation_model: "o3-mini".to_string(),
            search_model: "sonar-pro".to_string(),
            reasoning_effort: ReasoningEffort::High,
            temperature: None,
            report_date: Local::now().format("%B %-d, %Y").to_string(),
            firm_name: "Orasis Capital".to_string(),
            rate_limit: 2,
            timeout: Duration::from_secs(120),
            max_retries: 2,
            retry_backoff: Duration::from_millis(1000),
            base_urls: ApiUrls::default(),
            output: OutputPaths::default(),
        })
    }

    /// Loads `.env` (if present) and builds the config from the process environment.
    ///
    /// Both `OPENAI_API_KEY` and `PERPLEXITY_API_KEY` are required. Optional
    /// overrides: `OPENAI_BASE_URL`, `PERPLEXITY_BASE_URL`, `PORTFOLIO_MODEL`,
    /// `PORTFOLIO_SEARCH_MODEL`, `PORTFOLIO_REPORT_DATE`, `PORTFOLIO_OUTPUT_DIR`.
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(ReportError::ConfigError(format!("Failed to load .env: {}", e)));
            }
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let generation_key =
            lookup(OPENAI_API_KEY).ok_or(ReportError::MissingCredential(OPENAI_API_KEY))?;
        let search_key =
            lookup(PERPLEXITY_API_KEY).ok_or(ReportError::MissingCredential(PERPLEXITY_API_KEY))?;

        let mut config = Self::new(&generation_key, &search_key)?;

        if let Some(url) = lookup("OPENAI_BASE_URL") {
            config.base_urls.generation = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = lookup("PERPLEXITY_BASE_URL") {
            config.base_urls.search = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("PORTFOLIO_MODEL") {
            config.generation_model = model;
        }
        if let Some(model) = lookup("PORTFOLIO_SEARCH_MODEL") {
            config.search_model = model;
        }
        if let Some(date) = lookup("PORTFOLIO_REPORT_DATE") {
            config.report_date = date;
        }
        if let Some(dir) = lookup("PORTFOLIO_OUTPUT_DIR") {
            config.output.dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    pub fn with_report_date(mut self, date: impl Into<String>) -> Self {
        self.report_date = date.into();
        self
    }

    pub fn with_base_urls(mut self, base_urls: ApiUrls) -> Self {
        self.base_urls = base_urls;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output.dir = dir.into();
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Four-digit year taken from the end of the report date, used in search queries.
    pub fn report_year(&self) -> String {
        self.report_date
            .rsplit(|c: char| !c.is_ascii_digit())
            .find(|part| part.len() == 4)
            .map(str::to_string)
            .unwrap_or_else(|| Local::now().format("%Y").to_string())
    }

    /// Short preview of the search key for logs, never the full secret.
    pub fn search_key_preview(&self) -> String {
        key_preview(&self.search_api_key)
    }
}

fn clean_key(raw: &str) -> Option<String> {
    let key = raw.trim().trim_matches(|c| c == '"' || c == '\'').trim();
    (!key.is_empty()).then(|| key.to_string())
}

pub(crate) fn key_preview(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 13 {
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 5..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "[key too short]".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_missing_generation_key() {
        let err = ReportConfig::from_lookup(lookup_from(&[(PERPLEXITY_API_KEY, "pplx-abc")]))
            .unwrap_err();
        assert!(matches!(err, ReportError::MissingCredential(OPENAI_API_KEY)));
    }

    #[test]
    fn test_missing_search_key() {
        let err =
            ReportConfig::from_lookup(lookup_from(&[(OPENAI_API_KEY, "sk-abc")])).unwrap_err();
        assert!(matches!(err, ReportError::MissingCredential(PERPLEXITY_API_KEY)));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let err = ReportConfig::new("  \"\" ", "pplx-abc").unwrap_err();
        assert!(matches!(err, ReportError::MissingCredential(OPENAI_API_KEY)));
    }

    #[test]
    fn test_keys_are_unquoted() {
        let config = ReportConfig::new("'sk-test'", "\"pplx-test\"").unwrap();
        assert_eq!(config.generation_api_key, "sk-test");
        assert_eq!(config.search_api_key, "pplx-test");
    }

    #[test]
    fn test_overrides() {
        let config = ReportConfig::from_lookup(lookup_from(&[
            (OPENAI_API_KEY, "sk-abc"),
            (PERPLEXITY_API_KEY, "pplx-abc"),
            ("OPENAI_BASE_URL", "http://localhost:9000/v1/"),
            ("PORTFOLIO_MODEL", "o4-mini"),
            ("PORTFOLIO_REPORT_DATE", "April 4, 2025"),
            ("PORTFOLIO_OUTPUT_DIR", "/tmp/reports"),
        ]))
        .unwrap();

        assert_eq!(config.base_urls.generation, "http://localhost:9000/v1");
        assert_eq!(config.base_urls.search, "https://api.perplexity.ai");
        assert_eq!(config.generation_model, "o4-mini");
        assert_eq!(config.report_year(), "2025");
        assert_eq!(
            config.output.markdown_path(),
            PathBuf::from("/tmp/reports/comprehensive_portfolio_report.md")
        );
    }

    #[test]
    fn test_key_preview() {
        assert_eq!(key_preview("pplx-1234567890abcdef"), "pplx-123...bcdef");
        assert_eq!(key_preview("short"), "[key too short]");
    }
}
