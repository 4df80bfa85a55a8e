//! Configuration for the admin console server.
//!
//! Sources, lowest priority first:
//! 1. built-in defaults,
//! 2. an optional TOML file (`HOTEL_CONFIG` or `--config`),
//! 3. environment variables:
//!
//! - `HOTEL_BIND_ADDR`           (default: "0.0.0.0")
//! - `HOTEL_PORT`                (default: "9000")
//! - `HOTEL_MAX_CLIENTS`         (default: "16")
//! - `HOTEL_MAX_QUEUED`          (default: "32")
//! - `HOTEL_STORE_TIMEOUT_MS`    (default: "2000")
//! - `HOTEL_SHUTDOWN_GRACE_SECS` (default: "10")
//! - `HOTEL_DATA_FILE`           (default: unset, in-memory only)
//! - `HOTEL_TAX_RATE_BP`         (default: "1000", i.e. 10 %)
//! - `HOTEL_LOG_LEVEL`           (default: "info")
//!
//! 4. command-line flags applied by the binary.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use hotel_core::hotel_engine::DEFAULT_TAX_RATE_BP;
use hotel_core::RoomType;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value '{value}' for {key}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Credentials of one console operator.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminAccount {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for AdminAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminAccount")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Rooms to provision when no snapshot exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub room_type: RoomType,
    pub count: u32,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// IP address / interface to bind to (e.g. "0.0.0.0" or "127.0.0.1").
    pub bind_addr: String,

    /// TCP port to listen on. `0` picks a free port.
    pub port: u16,

    /// Maximum number of simultaneously served admin sessions.
    pub max_clients: usize,

    /// Connections allowed to wait for a session slot; beyond this,
    /// new connections are told the server is full and closed.
    pub max_queued: usize,

    /// Upper bound for a single engine call.
    pub store_timeout_ms: u64,

    /// How long open sessions may keep running after shutdown starts.
    pub shutdown_grace_secs: u64,

    /// JSON snapshot of the inventory store. `None` keeps state in memory only.
    pub data_file: Option<PathBuf>,

    /// Tax rate applied at checkout, in basis points.
    pub tax_rate_bp: u32,

    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,

    pub admins: Vec<AdminAccount>,

    pub inventory: Vec<InventoryEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "0.0.0.0".to_string(),
            port: 9000,
            max_clients: 16,
            max_queued: 32,
            store_timeout_ms: 2_000,
            shutdown_grace_secs: 10,
            data_file: None,
            tax_rate_bp: DEFAULT_TAX_RATE_BP,
            log_level: "info".to_string(),
            admins: vec![AdminAccount {
                username: "admin".to_string(),
                password: "admin".to_string(),
            }],
            inventory: vec![
                InventoryEntry {
                    room_type: RoomType::Single,
                    count: 4,
                },
                InventoryEntry {
                    room_type: RoomType::Double,
                    count: 4,
                },
                InventoryEntry {
                    room_type: RoomType::Deluxe,
                    count: 2,
                },
                InventoryEntry {
                    room_type: RoomType::PentHouse,
                    count: 1,
                },
            ],
        }
    }
}

impl Config {
    /// Load the optional TOML file, then apply environment overrides.
    ///
    /// `path` wins over `HOTEL_CONFIG`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = path
            .map(Path::to_path_buf)
            .or_else(|| env::var_os("HOTEL_CONFIG").map(PathBuf::from));

        let config = match file {
            Some(path) => Config::from_toml_file(&path)?,
            None => Config::default(),
        };
        config.with_env_overrides()
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Config::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(addr) = env::var("HOTEL_BIND_ADDR") {
            self.bind_addr = addr;
        }
        self.port = read_env_or("HOTEL_PORT", self.port)?;
        self.max_clients = read_env_or("HOTEL_MAX_CLIENTS", self.max_clients)?;
        self.max_queued = read_env_or("HOTEL_MAX_QUEUED", self.max_queued)?;
        self.store_timeout_ms = read_env_or("HOTEL_STORE_TIMEOUT_MS", self.store_timeout_ms)?;
        self.shutdown_grace_secs =
            read_env_or("HOTEL_SHUTDOWN_GRACE_SECS", self.shutdown_grace_secs)?;
        self.tax_rate_bp = read_env_or("HOTEL_TAX_RATE_BP", self.tax_rate_bp)?;
        if let Some(path) = env::var_os("HOTEL_DATA_FILE") {
            self.data_file = Some(PathBuf::from(path));
        }
        if let Ok(level) = env::var("HOTEL_LOG_LEVEL") {
            self.log_level = level;
        }
        Ok(self)
    }

    /// Convenience: `addr:port` socket string.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }

    /// Check console credentials.
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        self.admins
            .iter()
            .any(|a| a.username == username && a.password == password)
    }
}

fn read_env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidEnv { key, value: val }),
        Err(_) => Ok(default),
    }
}
