//! Web server command.

use anyhow::Result;
use bookcast_core::config::{
    DEFAULT_DATA_FILE, DEFAULT_INTERVAL_MS, DEFAULT_MAX_BOOKINGS, DEFAULT_PORT,
};
use bookcast_core::hub::DEFAULT_QUEUE_CAPACITY;
use bookcast_core::{generator, BookingStore, BroadcastHub, ServerConfig};
use bookcast_db::BookingFile;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// How long to wait for the hub to drain after the server stops.
const HUB_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Host to bind to
    #[arg(long, env = "BOOKCAST_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// File holding the persisted bookings
    #[arg(long, env = "BOOKCAST_DATA_FILE", default_value = DEFAULT_DATA_FILE)]
    pub data_file: PathBuf,

    /// Maximum number of bookings retained
    #[arg(long, env = "BOOKCAST_MAX_BOOKINGS", default_value_t = DEFAULT_MAX_BOOKINGS)]
    pub max_bookings: usize,

    /// Milliseconds between generated bookings
    #[arg(long, env = "BOOKCAST_INTERVAL_MS", default_value_t = DEFAULT_INTERVAL_MS)]
    pub interval_ms: u64,

    /// Extra directory of static files to serve
    #[arg(long, env = "BOOKCAST_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Do not generate synthetic bookings
    #[arg(long)]
    pub no_generator: bool,

    /// Also write logs to a file
    #[arg(long)]
    pub log: bool,

    /// Log file used with --log
    #[arg(long, default_value = "bookcast.log")]
    pub log_file: PathBuf,
}

impl ServeArgs {
    fn to_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            data_file: self.data_file.clone(),
            max_bookings: self.max_bookings,
            interval: Duration::from_millis(self.interval_ms),
            static_dir: self.static_dir.clone(),
            generator_enabled: !self.no_generator,
        }
    }
}

pub async fn execute(args: ServeArgs) -> Result<()> {
    let config = args.to_config();
    config.validate()?;

    let store = BookingStore::open(BookingFile::new(&config.data_file), config.max_bookings).await;
    let loaded = store.len();
    let (hub, hub_task) = BroadcastHub::new(store).spawn(DEFAULT_QUEUE_CAPACITY);

    println!();
    println!("  {} {}", "Bookcast".cyan().bold(), "Live Bookings".bold());
    println!();
    println!("  {}  http://{}", "Dashboard".green(), config.bind_addr());
    println!("  {}       http://{}/api/bookings", "API".green(), config.bind_addr());
    println!("  {}  ws://{}/ws", "WebSocket".green(), config.bind_addr());
    println!(
        "  {}       {} ({} of {} bookings)",
        "Data".green(),
        config.data_file.display(),
        loaded,
        config.max_bookings
    );
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    let shutdown = CancellationToken::new();

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            return;
        }
        info!("Shutdown requested");
        signal_token.cancel();
    });

    let generator_task = config.generator_enabled.then(|| {
        tokio::spawn(generator::run(hub.clone(), config.interval, shutdown.clone()))
    });

    let result = bookcast_web::run_server(
        hub.clone(),
        &config.bind_addr(),
        config.static_dir.clone(),
        shutdown.clone(),
    )
    .await;

    shutdown.cancel();
    if let Some(task) = generator_task {
        let _ = task.await;
    }

    drop(hub);
    if tokio::time::timeout(HUB_DRAIN_TIMEOUT, hub_task).await.is_err() {
        warn!("Broadcast hub still has open connections, exiting anyway");
    }

    result
}
