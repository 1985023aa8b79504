//! Configuration module
//!
//! Settings for the API endpoints, dataset location, training wait and
//! output formatting, loaded from TOML and overridden by the environment.

pub mod config;
