pub mod llm;
pub mod metadata;
