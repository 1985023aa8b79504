use anyhow::Result;
use crossterm::style::Stylize;
use std::io;

use sustain_cli::api_client::ApiClient;
use sustain_cli::cli_args::CliArgs;
use sustain_cli::config::config::Config;
use sustain_cli::driver::{Driver, DriverOptions};

fn print_help() {
    println!("{}", "sustain-cli - train and batch-analyze shipment sustainability".blue().bold());
    println!();
    println!("{}", "Usage:".yellow());
    println!("  sustain-cli [OPTIONS] [DATASET.json]");
    println!();
    println!("{}", "Options:".yellow());
    println!("  {}     - Service root (default http://localhost:5000)", "--api-url <URL>".green());
    println!("  {}      - Seconds to wait after training (default 5)", "--delay <SECS>".green());
    println!("  {}     - Use this config file instead of the default", "--config <PATH>".green());
    println!("  {}             - Also analyze the first shipment on its own", "--single".green());
    println!("  {}        - Debug logging on stderr", "-v, --verbose".green());
    println!("  {}    - Write a commented default config file", "--generate-config".green());
    println!("  {}        - Print the effective configuration", "--show-config".green());
    println!("  {}           - Show this help", "-h, --help".green());
    println!();
    println!("{}", "Environment:".yellow());
    println!("  {}  - Overrides api.base_url", "SUSTAIN_API_URL".green());
    println!("  {}  - Overrides dataset.path", "SUSTAIN_DATASET".green());
    println!("  {}         - Log filter, e.g. driver=debug", "RUST_LOG".green());
    println!();
}

fn run(cli: &CliArgs) -> Result<()> {
    if cli.generate_config {
        let path = match &cli.config_path {
            Some(path) => path.clone(),
            None => Config::get_config_path()?,
        };
        Config::write_default_with_comments(&path)?;
        println!("Configuration file created at: {}", path.display());
        return Ok(());
    }

    let mut config = Config::load(cli.config_path.as_deref())?;
    config.apply_env();
    cli.apply_overrides(&mut config);
    config.validate()?;

    if cli.show_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let client = ApiClient::new(&config.api)?;
    tracing::info!(target: "driver", "Using sustainability API at {}", client.base_url());

    let mut options = DriverOptions::from_config(&config)?;
    options.analyze_single = cli.single;

    let driver = Driver::new(client, options);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    driver.run(&config.dataset.path, &mut out)?;
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let cli = match CliArgs::parse(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{}", format!("Error: {:#}", e).red());
            eprintln!("Run with --help for usage.");
            std::process::exit(2);
        }
    };

    if cli.help {
        print_help();
        return;
    }

    sustain_cli::logging::init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}
