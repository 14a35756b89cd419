//! Allocation table extraction.
//!
//! The Executive Summary prompt asks for a pipe table with one row per
//! position and an allocation column. [`parse_allocation_table`] finds that
//! table and turns it into [`Position`]s, or says precisely why it could not.
//! Summaries often carry other tables too (macro metrics, expected returns),
//! so only a column headed `alloc…` or `weight…` identifies the positions
//! table; a bare `%` header never does.
//! The assembler falls back to [`PortfolioData::failed`] on error, so a
//! malformed table costs the JSON record its contents but never the run.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::table::{MarkdownTable, parse_tables};

/// Allowed distance, in percentage points, between the allocation total and 100.
pub const ALLOCATION_TOLERANCE: f64 = 1.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    #[error("no markdown table found")]
    NoTable,

    #[error("no table has a {0} column")]
    MissingColumn(&'static str),

    #[error("allocation table has no position rows")]
    NoRows,

    #[error("row {row}: '{value}' is not a percentage")]
    InvalidPercentage { row: usize, value: String },
}

/// One row of the allocation table.
///
/// `allocation` is the gross weight. A negative cell such as `-7.5%` is
/// stored as `7.5` with the direction in `position_type` (`Short` when the
/// table has no type column).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub asset: String,
    pub allocation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
}

/// Structured allocation record written next to the markdown report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioData {
    pub report_date: String,
    /// `parsed` or `failed`
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Asset name to allocation percentage
    pub allocations: BTreeMap<String, f64>,
    pub positions: Vec<Position>,
    pub total_allocation: f64,
    /// Allocation summed per position type (Long/Short/unspecified)
    pub by_position_type: BTreeMap<String, f64>,
}

impl PortfolioData {
    pub fn from_positions(report_date: impl Into<String>, positions: Vec<Position>) -> Self {
        let mut allocations = BTreeMap::new();
        let mut by_position_type = BTreeMap::new();

        for position in &positions {
            *allocations.entry(position.asset.clone()).or_insert(0.0) += position.allocation;
            let kind = position
                .position_type
                .clone()
                .unwrap_or_else(|| "Unspecified".to_string());
            *by_position_type.entry(kind).or_insert(0.0) += position.allocation;
        }

        let total_allocation = positions.iter().map(|p| p.allocation).sum();

        Self {
            report_date: report_date.into(),
            status: "parsed".to_string(),
            error: None,
            allocations,
            positions,
            total_allocation,
            by_position_type,
        }
    }

    /// Empty record noting why the table could not be parsed.
    pub fn failed(report_date: impl Into<String>, error: &AllocationError) -> Self {
        Self {
            report_date: report_date.into(),
            status: "failed".to_string(),
            error: Some(error.to_string()),
            ..Default::default()
        }
    }

    pub fn is_parsed(&self) -> bool {
        self.status == "parsed"
    }

    /// True when the allocations sum to 100 within `tolerance` percentage points.
    pub fn is_balanced(&self, tolerance: f64) -> bool {
        (self.total_allocation - 100.0).abs() <= tolerance
    }
}

fn number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("valid regex"))
}

/// Strips inline markdown emphasis and code marks from a cell.
fn clean_cell(cell: &str) -> String {
    cell.replace("**", "")
        .replace('`', "")
        .trim_matches(|c: char| c == '*' || c == '_' || c.is_whitespace())
        .to_string()
}

/// Reads the first number in a cell such as `12.5%`, `~10 %`, `**8**` or
/// `-7.5%`, keeping its sign.
pub fn parse_percentage(cell: &str) -> Option<f64> {
    number_pattern()
        .find(&clean_cell(cell))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// How strongly a lowercase header names the allocation column.
fn allocation_rank(header: &str) -> Option<u8> {
    if header.contains("alloc") {
        Some(2)
    } else if header.contains("weight") {
        Some(1)
    } else {
        None
    }
}

fn is_asset_header(header: &str) -> bool {
    ["asset", "ticker", "instrument", "security"]
        .iter()
        .any(|key| header.contains(key))
}

fn is_total_row(asset: &str) -> bool {
    let lower = asset.to_lowercase();
    lower == "total" || lower.starts_with("total ")
}

/// Parses the allocation table in `markdown`.
///
/// Every header of every table is ranked: `alloc` beats `weight`, and
/// anything else is not an allocation column. The best-ranked column wins,
/// the earliest one on ties. Its table's asset column is the first header
/// mentioning `asset`, `ticker`, `instrument` or `security`, falling back to
/// the first column. Optional columns: position type (`position`, `long`,
/// `direction`), `horizon`, `confidence`. Rows with an empty asset cell and
/// `Total` rows are skipped.
pub fn parse_allocation_table(markdown: &str) -> Result<Vec<Position>, AllocationError> {
    let tables = parse_tables(markdown);
    if tables.is_empty() {
        return Err(AllocationError::NoTable);
    }

    let (_, table, allocation_col) = tables
        .iter()
        .flat_map(|t| {
            t.headers
                .iter()
                .enumerate()
                .filter_map(move |(col, header)| {
                    allocation_rank(&header.to_lowercase()).map(|rank| (rank, t, col))
                })
        })
        .min_by_key(|(rank, _, _)| Reverse(*rank))
        .ok_or(AllocationError::MissingColumn("allocation"))?;

    let asset_col = table
        .find_column(is_asset_header)
        .filter(|col| *col != allocation_col)
        .or((allocation_col != 0).then_some(0))
        .ok_or(AllocationError::MissingColumn("asset"))?;

    let skip = [asset_col, allocation_col];
    let position_col = optional_column(table, &skip, |h| {
        h.contains("position") || h.contains("long") || h.contains("direction")
    });
    let horizon_col = optional_column(table, &skip, |h| h.contains("horizon"));
    let confidence_col = optional_column(table, &skip, |h| h.contains("confidence"));

    let mut positions = Vec::new();
    for (i, row) in table.rows.iter().enumerate() {
        let asset = clean_cell(&row[asset_col]);
        if asset.is_empty() || is_total_row(&asset) {
            continue;
        }

        let value = parse_percentage(&row[allocation_col]).ok_or_else(|| {
            AllocationError::InvalidPercentage {
                row: i + 1,
                value: row[allocation_col].clone(),
            }
        })?;

        let position_type = column_value(row, position_col)
            .or_else(|| (value < 0.0).then(|| "Short".to_string()));

        positions.push(Position {
            asset,
            allocation: value.abs(),
            position_type,
            horizon: column_value(row, horizon_col),
            confidence: column_value(row, confidence_col),
        });
    }

    if positions.is_empty() {
        return Err(AllocationError::NoRows);
    }

    Ok(positions)
}

fn optional_column<F>(table: &MarkdownTable, skip: &[usize], pred: F) -> Option<usize>
where
    F: Fn(&str) -> bool,
{
    table
        .headers
        .iter()
        .enumerate()
        .find(|(i, header)| !skip.contains(i) && pred(&header.to_lowercase()))
        .map(|(i, _)| i)
}

fn column_value(row: &[String], col: Option<usize>) -> Option<String> {
    col.map(|c| clean_cell(&row[c])).filter(|v| !v.is_empty())
}
