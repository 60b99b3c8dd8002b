pub mod cli;
pub mod config;
pub mod logging;
pub mod order;
pub mod pipeline;
pub mod protocol;
pub mod recommender;
pub mod server;
pub mod types;
