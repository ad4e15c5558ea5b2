#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{error, info, warn, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use monitor_presets::config::Settings;
use monitor_presets::constants::storage;
use monitor_presets::device::SimulatedDevice;
use monitor_presets::persistence::JsonFileStore;
use monitor_presets::ui::RecordingSurface;
use monitor_presets::{HostEvent, PresetController};

#[derive(Debug, Parser, Clone)]
#[command(name = "monitor-presets")]
#[command(about = "Monitor output preset controller driven by a line-based event script on stdin")]
struct Cli {
    /// Settings file (created with defaults when missing)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Preset storage document
    #[arg(long)]
    store: Option<PathBuf>,

    /// Number of simulated video outputs
    #[arg(long, default_value_t = 3)]
    outputs: u32,

    /// Number of simulated video inputs
    #[arg(long, default_value_t = 6)]
    inputs: u32,

    /// Simulated endpoint uptime in seconds at launch
    #[arg(long, default_value_t = 86_400)]
    uptime: u64,
}

fn default_store_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(storage::APP_DIR);
    path.push(storage::STORAGE_FILENAME);
    path
}

/// Forward stdin lines to the controller until EOF or `quit`
async fn read_script(device: Arc<SimulatedDevice>, tx: UnboundedSender<HostEvent>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Device-side status changes are applied directly to the simulator
        if let Some(count) = line.strip_prefix("calls ") {
            match count.trim().parse() {
                Ok(calls) => {
                    device.set_active_calls(calls);
                    info!(calls, "Simulated active call count changed");
                }
                Err(e) => warn!("Invalid call count '{}': {}", count, e),
            }
            continue;
        }

        match HostEvent::parse_line(line) {
            Ok(event) => {
                let shutdown = event == HostEvent::Shutdown;
                if tx.send(event).is_err() || shutdown {
                    return Ok(());
                }
            }
            Err(e) => warn!("Skipping line: {}", e),
        }
    }

    let _ = tx.send(HostEvent::Shutdown);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    let settings_path = cli.settings.clone().unwrap_or_else(Settings::default_path);
    let settings = Settings::load(&settings_path)?;
    info!(path = %settings_path.display(), ?settings, "settings loaded");

    let store_path = cli.store.clone().unwrap_or_else(default_store_path);
    let store = Arc::new(JsonFileStore::new(&store_path, settings.component.clone()));
    info!(path = %store.path().display(), component = %settings.component, "using file store");

    let device = Arc::new(
        SimulatedDevice::new(cli.outputs, cli.inputs).with_uptime(Duration::from_secs(cli.uptime)),
    );
    let ui = Arc::new(RecordingSurface::new());

    // Channel for stdin reader and long-press timers → controller loop
    let (tx, rx) = mpsc::unbounded_channel();

    let mut controller = PresetController::new(settings, device.clone(), store, ui, tx.clone());
    controller.startup().await.context("Startup failed")?;

    let reader = tokio::spawn(read_script(device, tx));

    controller.run(rx).await;

    match reader.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Event script reader failed: {:#}", e),
        Err(e) => error!("Event script reader task failed: {}", e),
    }
    Ok(())
}
