//! Prompt templates.
//!
//! Placeholders: `{firm_name}`, `{report_date}`, `{year}`. Search context is
//! not templated in; it travels as its own message (see `SectionGenerator`).
//! Headers are added by the assembler, so every template asks the model to
//! start with content rather than a heading.

pub(crate) const SYSTEM: &str = "You are a professional investment analyst at {firm_name}, \
a hedge fund specializing in global macro and trade-related assets.
Your task is to create detailed investment portfolio analysis with data-backed research and \
specific source citations.

IMPORTANT CONSTRAINTS:
1. The ENTIRE report must be NO MORE than 13,000 words total. Optimize your content accordingly.
2. The Executive Summary MUST contain a markdown summary table of all portfolio positions.
3. Ensure all assertions are backed by specific data points or sources.
4. Use current data from {year} where available. The report date is {report_date}.
5. Do not start your answer with the section title; the report already prints it. \
Use ### for any sub-headings.";

pub(crate) const EXECUTIVE_SUMMARY: &str = "Write the executive summary of the investment \
portfolio report dated {report_date}.
Summarize the key findings, market outlook, and high-level portfolio strategy.
Keep it clear, concise, and data-driven with specific metrics.

CRITICAL REQUIREMENT: include a summary table of ALL portfolio positions (10-15 positions in \
total). The table MUST be a markdown pipe table with exactly these columns:
| Asset/Ticker | Position Type | Allocation % | Time Horizon | Confidence Level |
Position Type is Long or Short. Allocation % values are plain numbers followed by % and MUST sum \
to 100%. Do not add a total row.

After the table, include a brief overview of asset allocations by category (shipping, \
commodities, energy, bonds, etc.).";

pub(crate) const GLOBAL_ECONOMY: &str = "Write a concise but comprehensive analysis \
(600-700 words) of Global Trade & Economy as part of a macroeconomic outlook.
Include:
- Regional breakdowns and economic indicators with specific figures
- GDP growth projections by region with exact percentages
- Trade flow statistics with volumes and year-over-year changes
- Container throughput at major ports with TEU figures
- Supply chain metrics and logistics indicators
- Currency valuations and their impact on trade relationships
- Trade agreements and policy changes with implementation timelines
- Inflation rates across major economies

Include 5-7 specific sources (IMF, World Bank, WTO, UNCTAD, central banks, research firms) with \
publication dates. Every assertion should be backed by data or a referenced source.";

pub(crate) const ENERGY_MARKETS: &str = "Write a concise but informative analysis \
(500-600 words) of Energy Markets as part of a macroeconomic outlook.
Include:
- Oil: supply/demand balance, production figures, inventory levels and price projections
- Natural gas and LNG: capacity expansions, trade routes and pricing dynamics
- Renewable energy transition impacts with adoption rates and investment figures
- Energy infrastructure developments with capacity and timeline data
- OPEC+ and non-OPEC production quotas and compliance
- Refining margins and utilization rates across regions

Include 4-5 specific sources with publication dates. Every assertion should be backed by data or \
a referenced source.";

pub(crate) const COMMODITIES: &str = "Write a concise but informative analysis (500-600 words) \
of Commodities Markets as part of a macroeconomic outlook.
Include:
- Metals: supply/demand fundamentals for copper, iron ore and aluminum with production and \
inventory figures
- Agriculture: crop reports, weather impacts and inventory-to-use ratios
- Supply chain and infrastructure constraints with quantitative impacts
- Futures market positioning and price forecasts
- Industrial demand trends by region
- Production costs and margins across commodity sectors

Include 4-5 specific sources (USDA, LME, SGX, commodity research firms) with publication dates. \
Every assertion should be backed by data or a referenced source.";

pub(crate) const SHIPPING: &str = "Write a concise but informative analysis (700-800 words) of \
Shipping Sectors as part of a macroeconomic outlook.
Include:
- Tankers: fleet growth, orderbook trends and ton-mile demand
- Dry bulk: Baltic Dry Index levels, vessel class performance, spot and time charter rates
- Containers: TEU capacity, port congestion and charter rates in USD/day
- LNG carriers: liquefaction capacity growth, utilization and rates
- Fleet age profiles and scrapping rates
- Regulatory impacts (IMO, EEXI, CII) with compliance costs
- Regional trade flow shifts with route data

Include 5-6 specific sources (Clarksons, Drewry, Alphaliner, Baltic Exchange, brokers) with \
publication dates. Every assertion should be backed by data or a referenced source.";

pub(crate) const PORTFOLIO_POSITIONS: &str = "Write the detailed portfolio positions section \
of the report.

List 10-15 investment positions in total (a mix of long and short), exactly the positions of \
the Executive Summary table, with target allocations adding to 100%.

For each position provide:
- Asset name and ticker
- Long/short positioning
- Target allocation percentage
- Investment time horizon (specific months or quarters)
- Confidence level (high/moderate/low) with justification
- Data-backed rationale with specific numbers
- How it relates to current market conditions

Organize the positions by asset category and explain how each aligns with the overall strategy.";

pub(crate) const BENCHMARKING: &str = "Write a Performance Benchmarking section (500+ words) \
for the portfolio.
Include:
- Comparison to prior allocations with performance metrics
- Attribution by sector and asset class
- Risk-adjusted returns (Sharpe and Sortino ratios)
- Benchmark comparisons (S&P 500, MSCI World, commodity indices)
- Behavior in specific market regimes (high inflation, dollar strength)
- Factor attribution (value, momentum, quality)

Include 5-7 specific sources with publication dates. Every assertion should be backed by data or \
a referenced source.";

pub(crate) const RISK_ASSESSMENT: &str = "Write a Risk Assessment & Monitoring Guidelines \
section (1000+ words) for the portfolio.
Include:
- Key risk factors by asset and for the overall portfolio
- VaR and stress-test scenarios with loss estimates
- Correlation analysis between positions
- A monitoring framework with metrics and thresholds
- Hedging strategies for the key risk factors
- Liquidity risk by asset class
- Concentration risk
- Regulatory and compliance risks

Include 5-7 specific sources with publication dates. Every assertion should be backed by data or \
a referenced source.";

pub(crate) const CONCLUSION: &str = "Write a concise conclusion for the portfolio report dated \
{report_date}, followed by a markdown table summarizing every recommendation with columns:
Asset/Ticker, Category, Region, Position (Long/Short), Target Allocation (%), Time Horizon, \
Confidence Level, Key Rationale.

Close with 3-5 specific sources with publication dates.";
