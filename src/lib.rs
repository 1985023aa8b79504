pub mod api_client;
pub mod cli_args;
pub mod config;
pub mod dataset;
pub mod driver;
pub mod logging;
pub mod output;
pub mod payload;
