pub mod chart;
pub mod dump;
pub mod markdown;
