use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use log::info;
use std::path::PathBuf;

use sitewatch::config::MonitorConfig;
use sitewatch::monitor::SiteMonitor;
use sitewatch::notifiers::log_file::LogFileNotifier;
use sitewatch::notifiers::telegram::TelegramNotifier;
use sitewatch::notifiers::Notifier;
use sitewatch::utils;

/// A tool for monitoring webpage content changes
#[derive(Parser)]
#[command(name = "sitewatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Monitor a webpage for content changes until interrupted
    Watch {
        /// Webpage URL to monitor
        #[arg(short, long)]
        url: Option<String>,

        /// Check interval in seconds (30-600)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Number of verification events to retain
        #[arg(long)]
        capacity: Option<usize>,

        /// Write the verification history to this CSV file on shutdown
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,
    },
    /// Run a single check cycle and print the outcome
    Check {
        /// Webpage URL to check
        #[arg(short, long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize environment variables and logging
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading settings from config file: {:?}", path);
            MonitorConfig::load(path)?
        }
        None => MonitorConfig::default(),
    };

    match cli.command {
        Commands::Watch {
            url,
            interval,
            capacity,
            export,
        } => {
            if let Some(url) = url {
                config.url = url;
            }
            if let Some(interval) = interval {
                config.interval_secs = interval;
            }
            if let Some(capacity) = capacity {
                config.history_capacity = capacity;
            }

            let monitor = SiteMonitor::from_config(&config, build_notifiers())?;
            monitor.start().await;

            tokio::signal::ctrl_c().await?;
            info!("Interrupt received, stopping monitor");
            monitor.stop().await;

            if let Some(path) = export {
                let csv = monitor.export_history().await;
                utils::write_to_file(&path, &csv)?;
                info!("History exported to {:?}", path);
            }
        }
        Commands::Check { url } => {
            if let Some(url) = url {
                config.url = url;
            }

            let monitor = SiteMonitor::from_config(&config, build_notifiers())?;
            let outcome = monitor.trigger_check().await;
            println!("{}: {}", config.url, outcome);
        }
    }

    Ok(())
}

/// Assemble notification channels from the environment.
fn build_notifiers() -> Vec<Box<dyn Notifier>> {
    let mut channels: Vec<Box<dyn Notifier>> = Vec::new();

    if let Some(telegram) = TelegramNotifier::from_env() {
        channels.push(Box::new(telegram));
    }
    if let Ok(path) = std::env::var("SITEWATCH_LOG_FILE") {
        if !path.is_empty() {
            channels.push(Box::new(LogFileNotifier::new(path)));
        }
    }

    if channels.is_empty() {
        info!("No notification channels configured; changes are only recorded in history");
    }

    channels
}
