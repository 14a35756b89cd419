use serde::Serialize;

use super::parsing::allocation::{AllocationError, PortfolioData, parse_allocation_table};
use super::section::{Section, SectionBody, SectionId};

/// The report under construction: the nine sections in fixed order.
///
/// Sections are created up front by [`PortfolioReport::new`] and only their
/// bodies change afterwards, so the section count and order hold no matter
/// which generations succeed.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioReport {
    pub title: String,
    pub report_date: String,
    pub sections: Vec<Section>,
}

impl PortfolioReport {
    pub fn new(firm_name: &str, report_date: &str) -> Self {
        Self {
            title: format!("{} Multi-Asset Portfolio – {}", firm_name, report_date),
            report_date: report_date.to_string(),
            sections: Section::catalog(),
        }
    }

    pub fn section(&self, id: SectionId) -> &Section {
        &self.sections[id.order() - 1]
    }

    pub fn set_body(&mut self, id: SectionId, body: SectionBody) {
        self.sections[id.order() - 1].body = body;
    }

    /// Sections whose generation failed, in report order.
    pub fn failed_sections(&self) -> Vec<&Section> {
        self.sections.iter().filter(|s| s.is_failed()).collect()
    }

    /// Renders the full markdown document.
    ///
    /// `# <title>`, then for each section `## <name>` and its body, all
    /// separated by blank lines. A body that opens with its own copy of the
    /// section heading has that line removed.
    pub fn to_markdown(&self) -> String {
        let mut parts = Vec::with_capacity(self.sections.len() + 1);
        parts.push(format!("# {}", self.title));

        for section in &self.sections {
            let body = match &section.body {
                SectionBody::Generated(text) => strip_leading_heading(text, section.name),
                SectionBody::Failed(reason) => {
                    format!("_This section could not be generated: {}_", single_line(reason))
                }
                SectionBody::Pending => "_This section was not generated._".to_string(),
            };
            parts.push(format!("## {}\n\n{}", section.name, body));
        }

        let mut markdown = parts.join("\n\n");
        markdown.push('\n');
        markdown
    }

    /// Extracts allocations from the Executive Summary table.
    ///
    /// Never fails: a missing or malformed table yields an empty record whose
    /// `status` is `failed`.
    pub fn portfolio_data(&self) -> PortfolioData {
        let summary = self.section(SectionId::ExecutiveSummary);
        let Some(text) = summary.text() else {
            tracing::warn!("Executive Summary unavailable; portfolio data will be empty");
            return PortfolioData::failed(&self.report_date, &AllocationError::NoTable);
        };

        match parse_allocation_table(text) {
            Ok(positions) => {
                let data = PortfolioData::from_positions(&self.report_date, positions);
                tracing::info!(
                    "Parsed {} positions totalling {:.1}%",
                    data.positions.len(),
                    data.total_allocation
                );
                data
            }
            Err(e) => {
                tracing::warn!("Could not parse allocation table: {}", e);
                PortfolioData::failed(&self.report_date, &e)
            }
        }
    }
}

/// Collapses all whitespace runs, newlines included, to single spaces.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Drops a first line that is a markdown heading repeating `title`.
fn strip_leading_heading(text: &str, title: &str) -> String {
    let trimmed = text.trim();
    let mut lines = trimmed.splitn(2, '\n');
    let first = lines.next().unwrap_or_default();

    let heading = first.trim_start_matches('#');
    let is_repeat = first.starts_with('#')
        && heading.trim().trim_matches('*').trim().eq_ignore_ascii_case(title);

    if is_repeat {
        lines.next().unwrap_or_default().trim().to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report_with_bodies() -> PortfolioReport {
        let mut report = PortfolioReport::new("Orasis Capital", "April 4, 2025");
        for id in SectionId::ALL {
            report.set_body(id, SectionBody::Generated(format!("{} body", id.key())));
        }
        report
    }

    #[test]
    fn test_title() {
        let report = PortfolioReport::new("Orasis Capital", "April 4, 2025");
        assert_eq!(report.title, "Orasis Capital Multi-Asset Portfolio – April 4, 2025");
        assert_eq!(report.sections.len(), 9);
    }

    #[test]
    fn test_headers_in_section_order() {
        let markdown = report_with_bodies().to_markdown();
        let headers: Vec<&str> = markdown
            .lines()
            .filter_map(|l| l.strip_prefix("## "))
            .collect();
        let expected: Vec<&str> = SectionId::ALL.iter().map(|id| id.title()).collect();
        assert_eq!(headers, expected);
    }

    #[test]
    fn test_failed_section_placeholder() {
        let mut report = report_with_bodies();
        report.set_body(SectionId::Commodities, SectionBody::Failed("timeout".to_string()));

        let markdown = report.to_markdown();
        assert!(markdown.contains("## Commodities\n\n_This section could not be generated: timeout_"));
        assert_eq!(report.failed_sections().len(), 1);
    }

    #[test]
    fn test_multiline_failure_reason_stays_inline() {
        let mut report = report_with_bodies();
        report.set_body(
            SectionId::Shipping,
            SectionBody::Failed("API returned status 500: {\n## oops\n}".to_string()),
        );

        let markdown = report.to_markdown();
        assert_eq!(markdown.matches("\n## ").count(), 9);
        assert!(markdown.contains(
            "## Shipping Sectors\n\n_This section could not be generated: API returned status 500: { ## oops }_"
        ));
    }

    #[test]
    fn test_strip_repeated_heading() {
        assert_eq!(
            strip_leading_heading("### Energy Markets\n\nOil is up.", "Energy Markets"),
            "Oil is up."
        );
        assert_eq!(
            strip_leading_heading("## **energy markets**\nOil", "Energy Markets"),
            "Oil"
        );
        assert_eq!(
            strip_leading_heading("### Oil\nUp", "Energy Markets"),
            "### Oil\nUp"
        );
    }

    #[test]
    fn test_portfolio_data_from_missing_summary() {
        let report = PortfolioReport::new("Orasis Capital", "April 4, 2025");
        let data = report.portfolio_data();
        assert!(!data.is_parsed());
        assert!(data.allocations.is_empty());
    }
}
