//! medkiosk - patient review kiosk
//!
//! Runs the badge-authenticated assessment review workflow on the console
//! simulator, or probes the remote data service.

use clap::{Parser, Subcommand};
use medkiosk_client::{ClientConfig, ClientError, DataService, HttpDataService};
use medkiosk_device::{console_kiosk, AlarmSwitch, Config, DeviceError};
use medkiosk_fsm::{EngineStats, StopHandle, SystemClock};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "medkiosk")]
#[command(about = "Patient assessment review kiosk")]
#[command(version)]
struct Cli {
    /// Path to a YAML config file
    #[arg(short, long, env = "KIOSK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the kiosk on the console simulator (default)
    Run,

    /// Call every data service endpoint once and print the results
    Probe {
        /// Badge card code to resolve
        #[arg(short, long)]
        tag: String,
    },

    /// Write the effective configuration to a YAML file
    Config {
        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load config: {}", e);
            return Err(e.into());
        }
    };
    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(config).await,
        Commands::Probe { tag } => {
            tokio::task::spawn_blocking(move || probe(&config, &tag)).await??;
            Ok(())
        }
        Commands::Config { output } => {
            config.save(&output)?;
            tracing::info!("Wrote config to {}", output.display());
            Ok(())
        }
    }
}

fn data_service(config: &Config) -> Result<HttpDataService, ClientError> {
    HttpDataService::new(
        ClientConfig::new(&config.service.base_url)
            .with_timeout(config.service.request_timeout())
            .with_user_agent(&config.service.user_agent),
    )
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Starting medkiosk");
    tracing::info!("  Data service: {}", config.service.base_url);
    tracing::info!("  Tick interval: {}ms", config.timing.tick_ms);
    tracing::info!("  Commands: l r s b (buttons), t <code> (badge), q (quit)");

    let stop = StopHandle::new();
    let alarm = AlarmSwitch::new();

    // Spawn shutdown signal handler
    let shutdown_stop = stop.clone();
    let shutdown_alarm = alarm.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Received shutdown signal, stopping kiosk...");
        shutdown_alarm.disarm();
        shutdown_stop.stop();
    });

    // The engine blocks its thread for the whole session
    let stats = tokio::task::spawn_blocking(move || -> Result<EngineStats, DeviceError> {
        let clock = SystemClock::shared();
        let data = data_service(&config)?;
        let (io, pins) = console_kiosk(clock.clone(), config.timing.debounce(), stop.clone())?;
        let mut kiosk =
            medkiosk_device::build(data, io, pins, &config, clock, alarm)?.with_stop_handle(stop);
        kiosk.run();
        Ok(kiosk.stats())
    })
    .await??;

    tracing::info!(
        ticks = stats.ticks,
        transitions = stats.transitions,
        hook_failures = stats.hook_failures,
        tick_panics = stats.tick_panics,
        "Kiosk stopped"
    );
    Ok(())
}

fn probe(config: &Config, tag: &str) -> Result<(), DeviceError> {
    let data = data_service(config)?;
    println!("service: {}", data.base_url());

    match data.post_assessments() {
        Ok(()) => println!("post assessments: ok"),
        Err(e) => println!("post assessments: {}", e),
    }

    let card = data.rfid_tag(tag)?;
    print_json("rfid tag", &card)?;

    let provider_id = card
        .provider_id
        .ok_or_else(|| ClientError::not_found(format!("provider for card {}", tag)))?;
    print_json("provider", &data.provider(provider_id)?)?;

    let patients = data.patients(provider_id)?;
    print_json("patients", &patients)?;

    match patients.first() {
        Some(first) => print_json("assessments", &data.assessments(first.patient_id)?)?,
        None => println!("assessments: no patients to query"),
    }
    Ok(())
}

fn print_json<T: Serialize>(label: &str, value: &T) -> Result<(), DeviceError> {
    let json = serde_json::to_string_pretty(value).map_err(ClientError::from)?;
    println!("{}: {}", label, json);
    Ok(())
}
