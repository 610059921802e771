use crate::core::{ItemError, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_WORKER_COUNT: usize = 10;

/// Batch processing configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingConfig {
    /// Number of long-lived workers; also the cap on concurrently running units
    pub worker_count: usize,

    /// Artificial latency before each unit fetches its item
    pub unit_delay: Option<Duration>,
}

impl ProcessingConfig {
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count,
            unit_delay: None,
        }
    }

    /// Set worker count
    pub fn worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    /// Set simulated per-unit latency
    pub fn unit_delay(mut self, delay: Duration) -> Self {
        self.unit_delay = Some(delay);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(ItemError::InvalidConfig(
                "worker_count must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WORKER_COUNT)
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub processing: ProcessingConfig,
}

impl ServerConfig {
    /// Reads `APP_HOST`, `APP_PORT`, `APP_WORKERS` and `APP_UNIT_DELAY_MS`,
    /// falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(host) = env::var("APP_HOST") {
            config.host = host;
        }
        if let Ok(port) = env::var("APP_PORT") {
            config.port = parse_var("APP_PORT", &port)?;
        }
        if let Ok(workers) = env::var("APP_WORKERS") {
            config.processing.worker_count = parse_var("APP_WORKERS", &workers)?;
        }
        if let Ok(delay) = env::var("APP_UNIT_DELAY_MS") {
            let millis: u64 = parse_var("APP_UNIT_DELAY_MS", &delay)?;
            config.processing.unit_delay = Some(Duration::from_millis(millis));
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the host
    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_string();
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn processing(mut self, processing: ProcessingConfig) -> Self {
        self.processing = processing;
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(ItemError::InvalidConfig("host cannot be empty".to_string()));
        }
        self.processing.validate()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            processing: ProcessingConfig::default(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| ItemError::InvalidConfig(format!("{name} has invalid value '{raw}'")))
}
