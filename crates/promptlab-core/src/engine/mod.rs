pub mod runner;

pub use runner::{ModelTarget, RunRecord, RunSummary, Runner};
