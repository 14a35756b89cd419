use serde::Serialize;

use super::prompts;
use super::search::Sector;

/// The nine report sections, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    ExecutiveSummary,
    GlobalEconomy,
    EnergyMarkets,
    Commodities,
    Shipping,
    PortfolioPositions,
    Benchmarking,
    RiskAssessment,
    Conclusion,
}

impl SectionId {
    /// Every section, in the order it appears in the report.
    pub const ALL: [SectionId; 9] = [
        SectionId::ExecutiveSummary,
        SectionId::GlobalEconomy,
        SectionId::EnergyMarkets,
        SectionId::Commodities,
        SectionId::Shipping,
        SectionId::PortfolioPositions,
        SectionId::Benchmarking,
        SectionId::RiskAssessment,
        SectionId::Conclusion,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SectionId::ExecutiveSummary => "executive_summary",
            SectionId::GlobalEconomy => "global_economy",
            SectionId::EnergyMarkets => "energy_markets",
            SectionId::Commodities => "commodities",
            SectionId::Shipping => "shipping",
            SectionId::PortfolioPositions => "portfolio_positions",
            SectionId::Benchmarking => "benchmarking",
            SectionId::RiskAssessment => "risk_assessment",
            SectionId::Conclusion => "conclusion",
        }
    }

    /// Header text printed above the section body.
    pub fn title(&self) -> &'static str {
        match self {
            SectionId::ExecutiveSummary => "Executive Summary",
            SectionId::GlobalEconomy => "Global Trade & Economy",
            SectionId::EnergyMarkets => "Energy Markets",
            SectionId::Commodities => "Commodities",
            SectionId::Shipping => "Shipping Sectors",
            SectionId::PortfolioPositions => "Portfolio Positioning & Rationale",
            SectionId::Benchmarking => "Performance Benchmarking",
            SectionId::RiskAssessment => "Risk Assessment & Monitoring Guidelines",
            SectionId::Conclusion => "Conclusion and Summary Recommendations",
        }
    }

    /// 1-based position in the report.
    pub fn order(&self) -> usize {
        Self::ALL
            .iter()
            .position(|id| id == self)
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    /// Search sectors whose results are passed into this section's prompt.
    pub fn sectors(&self) -> &'static [Sector] {
        match self {
            SectionId::ExecutiveSummary
            | SectionId::PortfolioPositions
            | SectionId::RiskAssessment => &Sector::ALL,
            SectionId::GlobalEconomy => &[Sector::Trade, Sector::Financial],
            SectionId::EnergyMarkets => &[Sector::Energy],
            SectionId::Commodities => &[Sector::Commodities],
            SectionId::Shipping => &[Sector::Shipping, Sector::Energy],
            SectionId::Benchmarking => &[Sector::Financial],
            SectionId::Conclusion => &[],
        }
    }

    pub fn template(&self) -> &'static str {
        match self {
            SectionId::ExecutiveSummary => prompts::EXECUTIVE_SUMMARY,
            SectionId::GlobalEconomy => prompts::GLOBAL_ECONOMY,
            SectionId::EnergyMarkets => prompts::ENERGY_MARKETS,
            SectionId::Commodities => prompts::COMMODITIES,
            SectionId::Shipping => prompts::SHIPPING,
            SectionId::PortfolioPositions => prompts::PORTFOLIO_POSITIONS,
            SectionId::Benchmarking => prompts::BENCHMARKING,
            SectionId::RiskAssessment => prompts::RISK_ASSESSMENT,
            SectionId::Conclusion => prompts::CONCLUSION,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "text", rename_all = "snake_case")]
pub enum SectionBody {
    Pending,
    Generated(String),
    Failed(String),
}

/// One report section and, once generated, its text.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub id: SectionId,
    pub name: &'static str,
    pub order: usize,
    #[serde(skip)]
    pub template: &'static str,
    pub body: SectionBody,
}

impl Section {
    pub fn new(id: SectionId) -> Self {
        Self {
            id,
            name: id.title(),
            order: id.order(),
            template: id.template(),
            body: SectionBody::Pending,
        }
    }

    /// All nine sections, pending, in report order.
    pub fn catalog() -> Vec<Section> {
        SectionId::ALL.into_iter().map(Section::new).collect()
    }

    pub fn text(&self) -> Option<&str> {
        match &self.body {
            SectionBody::Generated(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.body, SectionBody::Failed(_))
    }
}
