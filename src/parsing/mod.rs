//! Text parsing for generated report content.
//!
//! - [`table`] extracts GitHub-flavored markdown pipe tables.
//! - [`allocation`] turns the Executive Summary's position table into
//!   [`allocation::PortfolioData`].

pub mod allocation;
pub mod table;
