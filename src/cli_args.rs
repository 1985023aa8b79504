use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::config::config::Config;

/// Parsed command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    pub dataset: Option<PathBuf>,
    pub api_url: Option<String>,
    pub delay_secs: Option<f64>,
    pub config_path: Option<PathBuf>,
    pub single: bool,
    pub verbose: bool,
    pub generate_config: bool,
    pub show_config: bool,
    pub help: bool,
}

impl CliArgs {
    /// Parse arguments, excluding the program name.
    pub fn parse(args: &[String]) -> Result<Self> {
        let mut parsed = Self::default();
        let mut iter = args.iter();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-h" | "--help" => parsed.help = true,
                "-v" | "--verbose" => parsed.verbose = true,
                "--single" => parsed.single = true,
                "--generate-config" => parsed.generate_config = true,
                "--show-config" => parsed.show_config = true,
                "--api-url" => parsed.api_url = Some(value_for(arg, iter.next())?.to_string()),
                "--config" => parsed.config_path = Some(PathBuf::from(value_for(arg, iter.next())?)),
                "--delay" => {
                    let raw = value_for(arg, iter.next())?;
                    let secs: f64 = raw
                        .parse()
                        .with_context(|| format!("--delay expects seconds, got '{}'", raw))?;
                    if Duration::try_from_secs_f64(secs).is_err() {
                        anyhow::bail!("--delay is out of range: '{}'", raw);
                    }
                    parsed.delay_secs = Some(secs);
                }
                flag if flag.starts_with('-') => anyhow::bail!("unknown option: {}", flag),
                path => {
                    if parsed.dataset.is_some() {
                        anyhow::bail!("only one dataset file may be given, got extra '{}'", path);
                    }
                    parsed.dataset = Some(PathBuf::from(path));
                }
            }
        }

        Ok(parsed)
    }

    /// Command-line values win over config file and environment.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.api_url {
            config.api.base_url = url.clone();
        }
        if let Some(delay) = self.delay_secs {
            config.training.delay_secs = delay;
        }
        if let Some(path) = &self.dataset {
            config.dataset.path = path.clone();
        }
    }
}

fn value_for<'a>(flag: &str, value: Option<&'a String>) -> Result<&'a str> {
    value
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("{} requires a value", flag))
}
