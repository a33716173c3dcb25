pub mod cli;
pub mod client;
pub mod config;
pub mod deadline;
pub mod error;
pub mod http;
pub mod service;
pub mod source;
pub mod store;
pub mod types;
