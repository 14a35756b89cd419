//! End-to-end report run.
//!
//! ```text
//! search (all queries) ──► section 1 ──► section 2 ──► … ──► section 9
//!                                                             │
//!                          write files ◄── parse allocations ◄┘
//! ```
//!
//! Everything runs one call at a time. Search failures only reduce context,
//! section failures are recorded and rendered as placeholders, and the run
//! is an error only when no section could be generated at all.

use std::time::{Duration, Instant};

use super::config::ReportConfig;
use super::error::{ReportError, Result};
use super::generator::{GenerationClient, PromptVars, SectionGenerator};
use super::parsing::allocation::PortfolioData;
use super::report::PortfolioReport;
use super::search::{SearchClient, SearchCollector, SearchQuery, SearchSummary, default_queries};
use super::section::{SectionBody, SectionId};
use super::traits::{GenerationOperations, SearchOperations};
use super::writer::{WrittenReport, write_report};

/// Stage events passed to the progress callback.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    SearchStarted { queries: usize },
    SearchFinished(SearchSummary),
    SectionStarted { id: SectionId },
    SectionFinished { id: SectionId, ok: bool },
    Assembled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionFailure {
    pub id: SectionId,
    pub error: String,
}

/// Everything a run produced, before anything is written.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub report: PortfolioReport,
    pub portfolio: PortfolioData,
    pub search: SearchSummary,
    pub failures: Vec<SectionFailure>,
    pub runtime: Duration,
}

impl PipelineOutcome {
    pub fn markdown(&self) -> String {
        self.report.to_markdown()
    }
}

type ProgressFn = Box<dyn Fn(&Progress) + Send + Sync>;

pub struct ReportPipeline<S, G> {
    config: ReportConfig,
    collector: SearchCollector<S>,
    generator: SectionGenerator<G>,
    queries: Vec<SearchQuery>,
    progress: Option<ProgressFn>,
}

impl ReportPipeline<SearchClient, GenerationClient> {
    /// Pipeline backed by the real HTTP clients.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::ConfigError` if either client cannot be built.
    pub fn from_config(config: ReportConfig) -> Result<Self> {
        let searcher = SearchClient::new(&config)?;
        let generator = GenerationClient::new(&config)?;
        Ok(Self::new(config, searcher, generator))
    }
}

impl<S: SearchOperations, G: GenerationOperations> ReportPipeline<S, G> {
    pub fn new(config: ReportConfig, searcher: S, generator: G) -> Self {
        let vars = PromptVars::from_config(&config);
        let queries = default_queries(&vars.year);
        Self {
            collector: SearchCollector::new(searcher),
            generator: SectionGenerator::new(generator, vars),
            queries,
            config,
            progress: None,
        }
    }

    /// Replaces the default query catalog.
    pub fn with_queries(mut self, queries: Vec<SearchQuery>) -> Self {
        self.queries = queries;
        self
    }

    /// Registers a callback invoked at each stage boundary.
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Progress) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    fn emit(&self, event: Progress) {
        if let Some(callback) = &self.progress {
            callback(&event);
        }
    }

    /// Runs search, generation and assembly.
    ///
    /// Executes every query first, then generates the nine sections one at a
    /// time in report order, then parses the Executive Summary allocation
    /// table. Progress events are emitted at each stage boundary. Nothing is
    /// written to disk; see [`ReportPipeline::run_and_write`].
    ///
    /// # Errors
    ///
    /// `ReportError::AllSectionsFailed` when not a single section was generated.
    /// Search failures, individual section failures and an unparseable
    /// allocation table are not errors; they show up in the outcome.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use portfolio_report::{ReportConfig, ReportPipeline};
    ///
    /// let pipeline = ReportPipeline::from_config(ReportConfig::from_env()?)?;
    /// let outcome = pipeline.run().await?;
    /// for failure in &outcome.failures {
    ///     eprintln!("{} failed: {}", failure.id.title(), failure.error);
    /// }
    /// println!("{}", outcome.markdown());
    /// ```
    pub async fn run(&self) -> Result<PipelineOutcome> {
        let started = Instant::now();
        let year = self.generator.vars().year.clone();

        self.emit(Progress::SearchStarted {
            queries: self.queries.len(),
        });
        let context = self.collector.collect(&self.queries, &year).await;
        let search = context.summary();
        self.emit(Progress::SearchFinished(search));

        let mut report = PortfolioReport::new(&self.config.firm_name, &self.config.report_date);
        let mut failures = Vec::new();

        for id in SectionId::ALL {
            self.emit(Progress::SectionStarted { id });
            let search_text = context.for_sectors(id.sectors());

            match self.generator.generate(id, &search_text).await {
                Ok(text) => {
                    report.set_body(id, SectionBody::Generated(text));
                    self.emit(Progress::SectionFinished { id, ok: true });
                }
                Err(e) => {
                    tracing::error!("Error generating section {}: {}", id.title(), e);
                    report.set_body(id, SectionBody::Failed(e.to_string()));
                    failures.push(SectionFailure {
                        id,
                        error: e.to_string(),
                    });
                    self.emit(Progress::SectionFinished { id, ok: false });
                }
            }
        }

        if failures.len() == SectionId::ALL.len() {
            return Err(ReportError::AllSectionsFailed(failures.len()));
        }
        if !failures.is_empty() {
            tracing::warn!(
                "{} of {} sections failed and were replaced with placeholders",
                failures.len(),
                SectionId::ALL.len()
            );
        }

        let portfolio = report.portfolio_data();
        self.emit(Progress::Assembled);

        Ok(PipelineOutcome {
            report,
            portfolio,
            search,
            failures,
            runtime: started.elapsed(),
        })
    }

    /// Runs the pipeline and writes both output files.
    ///
    /// # Errors
    ///
    /// Everything [`ReportPipeline::run`] returns, plus `ReportError::FileError`
    /// when the output directory or either file cannot be written.
    pub async fn run_and_write(&self) -> Result<(PipelineOutcome, WrittenReport)> {
        let outcome = self.run().await?;
        let written = write_report(
            &self.config.output,
            &outcome.report,
            &outcome.portfolio,
            outcome.runtime,
        )?;
        Ok((outcome, written))
    }
}
