pub mod api_client;
pub mod columns;
pub mod config;
pub mod credential;
pub mod error;
pub mod export;
pub mod logging;
pub mod report_builder;
pub mod report_source;
