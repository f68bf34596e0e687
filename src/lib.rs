pub mod activation;
pub mod azure;
pub mod cli;
pub mod config;
pub mod duration;
pub mod error;
pub mod filter;
pub mod prompt;
pub mod resolver;
pub mod scope;
pub mod types;
