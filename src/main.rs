use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use portfolio_report::{
    PipelineOutcome, Progress, ReportConfig, ReportPipeline, SectionId, WrittenReport,
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Generates the multi-asset portfolio report into ./output.
///
/// Requires OPENAI_API_KEY and PERPLEXITY_API_KEY in the environment or a .env file.
#[derive(Debug, Parser)]
#[command(name = "portfolio-report", version, about)]
struct Args {}

#[tokio::main]
async fn main() {
    let _args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    if let Err(e) = run().await {
        eprintln!("{} {:#}", style("ERROR:").red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = ReportConfig::from_env().context("failed to load configuration")?;

    println!(
        "{} {}",
        style("Portfolio report for").bold(),
        style(&config.report_date).cyan().bold()
    );
    println!(
        "{} {} {}",
        style("Models:").bold(),
        style(&config.generation_model).magenta(),
        style(format!("(search: {})", config.search_model)).dim()
    );

    let bar = ProgressBar::new(SectionId::ALL.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .context("invalid progress template")?
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
            .progress_chars("=> "),
    );
    bar.enable_steady_tick(Duration::from_millis(90));

    let progress_bar = bar.clone();
    let pipeline = ReportPipeline::from_config(config)
        .context("failed to create API clients")?
        .on_progress(move |event| match event {
            Progress::SearchStarted { queries } => {
                progress_bar.set_message(format!("Running {} web searches...", queries));
            }
            Progress::SearchFinished(summary) => {
                progress_bar.println(format!(
                    "{} {}/{} searches returned content{}",
                    style("Search:").bold(),
                    summary.successful,
                    summary.total,
                    if summary.discarded { " (context discarded)" } else { "" }
                ));
            }
            Progress::SectionStarted { id } => {
                progress_bar.set_message(format!("Generating {}...", id.title()));
            }
            Progress::SectionFinished { id, ok } => {
                if !ok {
                    progress_bar.println(format!(
                        "{} {}",
                        style("Section failed:").red().bold(),
                        id.title()
                    ));
                }
                progress_bar.inc(1);
            }
            Progress::Assembled => progress_bar.set_message("Writing report..."),
        });

    let result = pipeline.run_and_write().await;
    bar.finish_and_clear();

    let (outcome, written) = result.context("report generation failed")?;
    print_summary(&outcome, &written);

    Ok(())
}

fn print_summary(outcome: &PipelineOutcome, written: &WrittenReport) {
    let stats = &written.stats;

    println!();
    println!("{}", style("Report generated").green().bold());
    println!(
        "{} {:.2}s",
        style("Runtime:").bold(),
        stats.runtime.as_secs_f64()
    );
    println!(
        "{} {} words, {} sections",
        style("Report:").bold(),
        style(stats.word_count).magenta(),
        style(stats.section_count).magenta()
    );
    if stats.failed_sections > 0 {
        println!(
            "{} {}",
            style("Failed sections:").yellow().bold(),
            outcome
                .failures
                .iter()
                .map(|f| f.id.title())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    println!(
        "{} {}",
        style("Saved report to:").bold(),
        written.markdown_path.display()
    );
    println!(
        "{} {}",
        style("Saved portfolio data to:").bold(),
        written.json_path.display()
    );

    let portfolio = &outcome.portfolio;
    if !portfolio.is_parsed() {
        println!(
            "{} {}",
            style("Allocation table not parsed:").yellow(),
            portfolio.error.as_deref().unwrap_or("unknown error")
        );
        return;
    }

    println!();
    println!(
        "Portfolio contains {} assets ({:.1}% allocated):",
        portfolio.positions.len(),
        portfolio.total_allocation
    );
    for position in portfolio.positions.iter().take(5) {
        println!(
            "  {}: {}% {}",
            position.asset,
            position.allocation,
            style(position.position_type.as_deref().unwrap_or("")).dim()
        );
    }
    if portfolio.positions.len() > 5 {
        println!("  ... and {} more assets", portfolio.positions.len() - 5);
    }

    println!("Allocation by position type:");
    for (kind, weight) in &portfolio.by_position_type {
        println!("  {}: {}%", kind, weight);
    }
}
