pub mod agent;
pub mod api;
pub mod config;
pub mod context;
pub mod crew;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod summarize;
pub mod task;
pub mod tool;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
