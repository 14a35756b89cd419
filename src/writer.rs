use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use super::config::OutputPaths;
use super::error::Result;
use super::parsing::allocation::PortfolioData;
use super::report::PortfolioReport;

/// Summary numbers printed after a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReportStats {
    pub word_count: usize,
    pub section_count: usize,
    pub failed_sections: usize,
    pub asset_count: usize,
    pub runtime: Duration,
}

impl ReportStats {
    pub fn new(markdown: &str, report: &PortfolioReport, data: &PortfolioData, runtime: Duration) -> Self {
        Self {
            word_count: word_count(markdown),
            section_count: report.sections.len(),
            failed_sections: report.failed_sections().len(),
            asset_count: data.allocations.len(),
            runtime,
        }
    }
}

/// Where the files went, plus the stats of what was written.
#[derive(Debug, Clone)]
pub struct WrittenReport {
    pub markdown_path: PathBuf,
    pub json_path: PathBuf,
    pub stats: ReportStats,
}

/// Whitespace-separated word count.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Writes the markdown report and the portfolio JSON.
///
/// Creates the output directory first. Any I/O failure is returned as
/// `ReportError::FileError` and ends the run.
pub fn write_report(
    paths: &OutputPaths,
    report: &PortfolioReport,
    data: &PortfolioData,
    runtime: Duration,
) -> Result<WrittenReport> {
    fs::create_dir_all(&paths.dir)?;

    let markdown = report.to_markdown();
    let markdown_path = paths.markdown_path();
    fs::write(&markdown_path, &markdown)?;

    let json_path = paths.json_path();
    fs::write(&json_path, serde_json::to_string_pretty(data)?)?;

    tracing::info!(
        "Wrote {} and {}",
        markdown_path.display(),
        json_path.display()
    );

    Ok(WrittenReport {
        markdown_path,
        json_path,
        stats: ReportStats::new(&markdown, report, data, runtime),
    })
}
