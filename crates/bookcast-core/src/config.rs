//! Server configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{BookcastError, BookcastResult};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default bound on retained bookings.
pub const DEFAULT_MAX_BOOKINGS: usize = 50;

/// Default generator period in milliseconds.
pub const DEFAULT_INTERVAL_MS: u64 = 5000;

/// Default booking file.
pub const DEFAULT_DATA_FILE: &str = "bookings.json";

/// Everything `bookcast serve` needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_file: PathBuf,
    pub max_bookings: usize,
    pub interval: Duration,
    pub static_dir: Option<PathBuf>,
    pub generator_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            max_bookings: DEFAULT_MAX_BOOKINGS,
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            static_dir: None,
            generator_enabled: true,
        }
    }
}

impl ServerConfig {
    /// Reject values the server cannot run with.
    pub fn validate(&self) -> BookcastResult<()> {
        if self.max_bookings == 0 {
            return Err(BookcastError::config("max bookings must be at least 1"));
        }
        if self.interval.is_zero() {
            return Err(BookcastError::config("generator interval must be positive"));
        }
        if self.host.trim().is_empty() {
            return Err(BookcastError::config("host must not be empty"));
        }
        if let Some(dir) = &self.static_dir {
            if !dir.is_dir() {
                return Err(BookcastError::config(format!(
                    "static directory '{}' does not exist",
                    dir.display()
                )));
            }
        }
        Ok(())
    }

    /// Socket address string to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
