//! tripcrew command line and HTTP front end.

pub mod app;
pub mod commands;
pub mod http;
pub mod utils;
