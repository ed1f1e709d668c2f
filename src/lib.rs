pub mod config;
pub mod engine;
pub mod error;
pub mod observability;
pub mod types;
