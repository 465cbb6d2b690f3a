//! blinkctl — Main Entry Point
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                  │
//! │                                                          │
//! │  GpioBank  PlatformScheduler    NodeRegistry  LogEventSink│
//! │  (PinDriver)   (TaskScheduler)  (Registry)    (EventSink) │
//! │                                                          │
//! │  ─────────────── Port Trait Boundary ──────────────────  │
//! │                                                          │
//! │      ┌──────────────────────────────────────────┐        │
//! │      │  BlinkController ◀── ControlSurface      │◀─ console
//! │      └──────────────────────────────────────────┘        │
//! └──────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::{Context, Result};
use log::info;

use blinkctl::adapters::console;
use blinkctl::adapters::log_sink::LogEventSink;
use blinkctl::adapters::node_registry::NodeRegistry;
use blinkctl::config::BlinkConfig;
use blinkctl::drivers::gpio::GpioBank;
use blinkctl::lifecycle::BlinkDevice;
use blinkctl::scheduler::PlatformScheduler;

// ── Host simulation: command line ─────────────────────────────

#[cfg(not(target_os = "espidf"))]
#[derive(clap::Parser)]
#[command(name = "blinkctl")]
#[command(about = "Blink one GPIO; type 'on', 'off' or an interval in ms")]
struct Cli {
    /// JSON config file (missing fields take defaults)
    #[arg(short, long, value_name = "FILE")]
    config: Option<std::path::PathBuf>,

    /// Output GPIO
    #[arg(long)]
    pin: Option<i32>,

    /// Power-up blink interval (50-1000 ms)
    #[arg(long, value_name = "MS")]
    interval_ms: Option<u32>,
}

#[cfg(not(target_os = "espidf"))]
fn init() -> Result<BlinkConfig> {
    use clap::Parser;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            BlinkConfig::from_json(&json)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => BlinkConfig::default(),
    };
    if let Some(pin) = cli.pin {
        config.pin = pin;
    }
    if let Some(ms) = cli.interval_ms {
        config.initial_interval_ms = ms;
    }
    Ok(config)
}

// ── Device: ESP-IDF bootstrap ─────────────────────────────────

#[cfg(target_os = "espidf")]
fn init() -> Result<BlinkConfig> {
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    Ok(BlinkConfig::default())
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    let config = init()?;
    info!("blinkctl v{}", env!("CARGO_PKG_VERSION"));

    let device = BlinkDevice::bring_up(
        &config,
        |cfg| PlatformScheduler::start(&cfg.workqueue_name, cfg.max_active),
        NodeRegistry::new(),
        GpioBank::new(),
        LogEventSink::new(),
    )
    .context("bring-up failed")?;

    info!("Control surface ready: 'on', 'off', <ms>; empty line reads, 'exit' quits");
    let stdin = std::io::stdin();
    console::serve(device.surface(), stdin.lock(), std::io::stdout())
        .context("console I/O failed")?;

    device.shutdown();
    Ok(())
}
