//! Configuration loading from TOML
//!
//! # Configuration File Format
//!
//! ```toml
//! [link]
//! device = "/dev/ttyUSB0"
//! baud_rate = 115200
//!
//! [network]
//! bind_address = "0.0.0.0:4444"
//! max_clients = 10
//! ```
//!
//! `baud_rate`, `bind_address`, and `max_clients` are optional and default
//! to the values shown above. The satellite link runs 8-N-1 at the
//! configured baud rate; both sides of the deployed link use 115200.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Satellite link configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LinkConfig {
    /// Serial device path (e.g., "/dev/ttyUSB0", "COM3")
    pub device: String,

    /// Baud rate; the deployed link runs at 115200
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

fn default_baud_rate() -> u32 {
    115200
}

/// Operator gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// TCP bind address for operator sessions
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Cap on simultaneous operator sessions
    #[serde(default = "default_max_clients")]
    pub max_clients: usize,
}

fn default_bind_address() -> String {
    "0.0.0.0:4444".to_string()
}

fn default_max_clients() -> usize {
    10
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            bind_address: default_bind_address(),
            max_clients: default_max_clients(),
        }
    }
}

/// Root configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub link: LinkConfig,
    #[serde(default)]
    pub network: NetworkConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self> {
        let config: Config = basic_toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

        if config.link.device.is_empty() {
            return Err(Error::Config(
                "link.device must name a serial device".to_string(),
            ));
        }
        if config.network.max_clients == 0 {
            return Err(Error::Config(
                "network.max_clients must be at least 1".to_string(),
            ));
        }

        Ok(config)
    }
}
