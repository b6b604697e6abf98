// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Agency Configuration
//
// Defines the configuration schema for the agency service:
// - HTTP listener (bind address, port)
// - PostgreSQL pool settings
// - Breed reference source
// - Logging level
//
// Loaded from YAML with discovery, then overridden from the environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_PATH_ENV: &str = "SPYCAT_CONFIG_PATH";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgencyConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub breeds: BreedsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connections idle for longer than this are closed
    #[serde(default = "default_max_idle_time", with = "humantime_serde")]
    pub max_idle_time: Duration,

    /// Bound on the initial connect and on acquiring a pooled connection
    #[serde(default = "default_connect_timeout", with = "humantime_serde")]
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreedsConfig {
    /// Endpoint returning a JSON array of `{id, name}`
    #[serde(default = "default_breeds_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_breeds_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7777
}

fn default_max_connections() -> u32 {
    30
}

fn default_max_idle_time() -> Duration {
    Duration::from_secs(15 * 60)
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_breeds_endpoint() -> String {
    "https://api.thecatapi.com/v1/breeds".to_string()
}

fn default_breeds_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            max_idle_time: default_max_idle_time(),
            connect_timeout: default_connect_timeout(),
        }
    }
}

impl Default for BreedsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_breeds_endpoint(),
            timeout: default_breeds_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ServerConfig {
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl AgencyConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Discover configuration file using precedence order
    /// 1. SPYCAT_CONFIG_PATH environment variable
    /// 2. ./spycat-config.yaml (working directory)
    /// 3. ~/.spycat/config.yaml (user home)
    /// 4. /etc/spycat/config.yaml (system, Unix)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./spycat-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".spycat").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        {
            let system_config = PathBuf::from("/etc/spycat/config.yaml");
            if system_config.exists() {
                return Some(system_config);
            }
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path fails if missing/invalid
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            return Ok(config);
        }

        let mut config = match Self::discover_config() {
            Some(config_path) => {
                tracing::info!("Loading configuration from discovered path: {:?}", config_path);
                Self::from_yaml_file(config_path)?
            }
            None => {
                tracing::warn!("No configuration file found in standard locations. Using defaults.");
                Self::default()
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("SPY_CAT_AGENCY_PORT") {
            // Accepts both "7777" and ":7777"
            match val.trim_start_matches(':').parse::<u16>() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(
                    "Invalid value for SPY_CAT_AGENCY_PORT: '{}'. Ignoring.",
                    val
                ),
            }
        }

        if let Some(val) = lookup("CATS_BREEDS_API") {
            self.breeds.endpoint = val;
        }

        if let Some(val) = lookup("DB_DSN") {
            self.database.url = val;
        }

        if let Some(val) = lookup("DB_MAX_OPEN_CONNS") {
            match val.parse::<u32>() {
                Ok(n) => self.database.max_connections = n,
                Err(_) => tracing::warn!(
                    "Invalid value for DB_MAX_OPEN_CONNS: '{}'. Ignoring.",
                    val
                ),
            }
        }

        if let Some(val) = lookup("DB_MAX_IDLE_TIME") {
            match humantime_serde::re::humantime::parse_duration(&val) {
                Ok(d) => self.database.max_idle_time = d,
                Err(_) => tracing::warn!(
                    "Invalid value for DB_MAX_IDLE_TIME: '{}'. Expected e.g. 15m. Ignoring.",
                    val
                ),
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("server.port cannot be 0");
        }

        if self.breeds.endpoint.is_empty() {
            anyhow::bail!("breeds.endpoint cannot be empty");
        }

        if !self.breeds.endpoint.starts_with("http://") && !self.breeds.endpoint.starts_with("https://") {
            anyhow::bail!("breeds.endpoint must be an http(s) URL: '{}'", self.breeds.endpoint);
        }

        if self.breeds.timeout.is_zero() {
            anyhow::bail!("breeds.timeout must be greater than zero");
        }

        if self.database.max_connections == 0 {
            anyhow::bail!("database.max_connections must be greater than zero");
        }

        Ok(())
    }

    /// The persistent store additionally needs a connection string
    pub fn validate_database(&self) -> anyhow::Result<()> {
        if self.database.url.is_empty() {
            anyhow::bail!("database.url cannot be empty (set it in the config file or via DB_DSN)");
        }
        Ok(())
    }
}
