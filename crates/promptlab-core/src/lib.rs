pub mod config;
pub mod diagram;
pub mod engine;
pub mod errors;
pub mod fingerprint;
pub mod model;
pub mod prompts;
pub mod providers;
pub mod report;
pub mod storage;
