//! CLI entry point for the GTFS-RT sensor test harness.
//!
//! Loads a sensor platform configuration as Home Assistant would receive it,
//! validates it and constructs the fetcher and sensors outside Home Assistant.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use gtfs_rt_harness::harness::{self, Outcome};
use gtfs_rt_harness::logging::{DebugLevel, Logging};
use gtfs_rt_harness::report;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "gtfs_rt_test")]
#[command(about = "Test script for ha-gtfs-rt-v2", long_about = None)]
struct Cli {
    /// Config file to use
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    file: PathBuf,

    /// Debug level: INFO (default) or DEBUG
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "INFO")]
    debug: DebugLevel,

    /// Output file for log
    #[arg(short = 'l', long = "log", value_name = "FILE")]
    log: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging = Logging::new(cli.debug, cli.log.as_deref()).with_context(|| match &cli.log {
        Some(path) => format!("Failed to create log file {}", path.display()),
        None => "Failed to set up logging".to_string(),
    })?;

    logging.in_scope(|| {
        debug!(level = %logging.level(), file = %cli.file.display(), "Harness starting");
        run(&cli.file)
    })
}

fn run(file: &Path) -> Result<()> {
    match harness::run(file)? {
        Outcome::Invalid(_) => {}
        Outcome::Ready(platform) => {
            for sensor in &platform.sensors {
                report::print_pretty(sensor);
            }
            report::print_json(&platform.sensors)?;
            info!(sensors = platform.sensors.len(), "Sensors constructed");
        }
    }
    Ok(())
}
