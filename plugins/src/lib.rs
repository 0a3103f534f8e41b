pub mod factory;
pub mod http;
pub mod llm;
pub mod services;
pub mod tools;
