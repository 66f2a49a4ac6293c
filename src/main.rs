//! asn-harvest main entry point
//!
//! This is the command-line interface for the accident record harvester.

use asn_harvest::config::{load_config_with_hash, validate, Config};
use asn_harvest::crawler::{AutoApprove, Confirm, ConsolePrompt, Harvester, HttpFetcher};
use asn_harvest::output::{print_discovery, print_report, CsvSink};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// asn-harvest: an incremental accident record harvester
///
/// For every requested year, asn-harvest first walks the listing pages to establish the
/// number of occurrences, asks for confirmation, and then extracts every accident page
/// into a CSV file that is rewritten after each record.
#[derive(Parser, Debug)]
#[command(name = "asn-harvest")]
#[command(version)]
#[command(about = "Harvests yearly aviation accident listings into CSV", long_about = None)]
struct Cli {
    /// Years to harvest, one after another
    #[arg(value_name = "YEAR", required = true)]
    years: Vec<u32>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory the CSV files are written to
    #[arg(long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Base URL of the accident database
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,

    /// Only analyze the listing pages and print their layout
    #[arg(long, conflicts_with = "yes")]
    discover_only: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match load(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    let harvester = Harvester::from_config(&config)?;

    if cli.discover_only {
        handle_discover_only(&harvester, &cli.years).await
    } else {
        handle_harvest(&harvester, &config, &cli).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("asn_harvest=info,warn"),
            1 => EnvFilter::new("asn_harvest=debug,info"),
            _ => EnvFilter::new("asn_harvest=trace,debug"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file (or defaults) and applies command-line overrides
fn load(cli: &Cli) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(base_url) = &cli.base_url {
        config.source.base_url = base_url.clone();
    }
    if let Some(directory) = &cli.output_dir {
        config.output.directory = directory.clone();
    }

    // again, after the overrides
    validate(&config)?;
    Ok(config)
}

/// Handles --discover-only: prints the listing layout of every year
async fn handle_discover_only(
    harvester: &Harvester<HttpFetcher>,
    years: &[u32],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut failed = 0;

    for &year in years {
        match harvester.discover(year).await {
            Ok(discovery) => print_discovery(&discovery),
            Err(e) => {
                tracing::error!("Discovery for {} failed: {}", year, e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(format!("Discovery failed for {} of {} years", failed, years.len()).into());
    }
    Ok(())
}

/// Handles the main harvest: discovery, confirmation and extraction per year
async fn handle_harvest(
    harvester: &Harvester<HttpFetcher>,
    config: &Config,
    cli: &Cli,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut confirm: Box<dyn Confirm> = if cli.yes {
        Box::new(AutoApprove)
    } else {
        Box::new(ConsolePrompt::stdio())
    };

    tracing::info!(
        "Harvesting {} year(s) from {}",
        cli.years.len(),
        harvester.base_url()
    );

    let mut failed = Vec::new();
    for &year in &cli.years {
        let mut sink = CsvSink::for_year(&config.output, year);
        let report = harvester.harvest_year(year, confirm.as_mut(), &mut sink).await;
        if !cli.quiet {
            print_report(&report);
        }

        if report.phase.is_error() {
            failed.push(year);
        }
    }

    if !failed.is_empty() {
        let years: Vec<String> = failed.iter().map(|year| year.to_string()).collect();
        return Err(format!("Harvest failed for {}", years.join(", ")).into());
    }

    tracing::info!("Harvest completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_years_and_defaults() {
        let cli = Cli::try_parse_from(["asn-harvest", "2023", "2024"]).unwrap();
        assert_eq!(cli.years, vec![2023, 2024]);
        assert!(!cli.quiet);
        assert!(!cli.yes);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_quiet_flag() {
        let cli = Cli::try_parse_from(["asn-harvest", "-q", "-y", "2024"]).unwrap();
        assert!(cli.quiet);
        assert!(cli.yes);

        assert!(Cli::try_parse_from(["asn-harvest", "-q", "-v", "2024"]).is_err());
    }

    #[test]
    fn test_year_is_required() {
        assert!(Cli::try_parse_from(["asn-harvest", "--yes"]).is_err());
        assert!(Cli::try_parse_from(["asn-harvest", "--discover-only", "--yes", "2024"]).is_err());
    }

    #[test]
    fn test_overrides_are_validated() {
        let cli = Cli::try_parse_from(["asn-harvest", "--base-url", "ftp://asn.example", "2024"])
            .unwrap();
        assert!(load(&cli).is_err());

        let cli = Cli::try_parse_from(["asn-harvest", "--output-dir", "data", "2024"]).unwrap();
        assert_eq!(load(&cli).unwrap().output.directory, "data");
    }
}
