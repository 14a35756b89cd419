//! # portfolio-report - LLM-written multi-asset portfolio reports
//!
//! Builds a long-form investment portfolio report in four sequential stages:
//!
//! - **Search collection** - runs a catalog of sector queries against a
//!   web-search API and keeps the answers as prompt context
//! - **Section generation** - asks a reasoning model for each of the nine
//!   report sections, in report order, with the search context relevant to it
//! - **Assembly** - joins the sections under their headers into one markdown
//!   document and parses the Executive Summary allocation table into
//!   [`PortfolioData`]
//! - **Output** - writes the markdown and JSON files and reports statistics
//!
//! A failed search query only thins the context. A failed section is recorded
//! and rendered with a placeholder body; the run fails only if every section
//! fails.
//!
//! ## Basic Usage
//!
//! ```ignore
//! use portfolio_report::{ReportConfig, ReportPipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads OPENAI_API_KEY and PERPLEXITY_API_KEY (and .env, if present)
//!     let config = ReportConfig::from_env()?;
//!     let pipeline = ReportPipeline::from_config(config)?;
//!
//!     let (outcome, written) = pipeline.run_and_write().await?;
//!     println!("{} words in {}", written.stats.word_count, written.markdown_path.display());
//!     println!("{} assets parsed", outcome.portfolio.allocations.len());
//!     Ok(())
//! }
//! ```

mod chat;
mod config;
mod core;
mod error;
mod generator;
pub mod parsing;
mod pipeline;
mod prompts;
mod report;
mod search;
mod section;
mod traits;
mod writer;

pub use chat::{ChatMessage, ChatRequest, ChatResponse, Role};
pub use config::{ApiUrls, OutputPaths, ReasoningEffort, ReportConfig};
pub use core::{ApiClient, ClientSettings, MAX_RETRY_WAIT};
pub use error::{ReportError, Result};
pub use generator::{GenerationClient, PromptVars, SectionGenerator, render_prompt};
pub use parsing::allocation::{ALLOCATION_TOLERANCE, AllocationError, PortfolioData, Position};
pub use pipeline::{PipelineOutcome, Progress, ReportPipeline, SectionFailure};
pub use report::PortfolioReport;
pub use search::{
    SearchClient, SearchCollector, SearchContext, SearchQuery, SearchResult, SearchSummary,
    Sector, default_queries,
};
pub use section::{Section, SectionBody, SectionId};
pub use traits::{GenerationOperations, SearchOperations};
pub use writer::{ReportStats, WrittenReport, word_count, write_report};

/// Current crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
