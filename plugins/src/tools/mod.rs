//! Concrete tools bound to the travel crew's agents.

pub mod calculator;
pub mod file_writer;
pub mod scrape;
pub mod search;

pub use calculator::CalculatorTool;
pub use file_writer::FileWriterTool;
pub use scrape::ScrapeWebsiteTool;
pub use search::WebSearchTool;
