pub mod aggregator;
mod model;

pub use aggregator::Analyzer;
pub use model::{DataAnalysis, ProjectSummary, ReportSnapshot, Totals, UserSummary};
