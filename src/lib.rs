pub mod app;
pub mod backend;
pub mod config;
pub mod error;
pub mod job;
pub mod logging;
pub mod metrics;
pub mod types;
