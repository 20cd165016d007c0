pub mod actors;
pub mod aggregator;
pub mod cli;
pub mod error;
pub mod github;
pub mod hindex;
pub mod models;
pub mod report;
pub mod server;
pub mod types;
