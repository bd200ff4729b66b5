use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file at {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse TOML from config file at {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to load config from environment: {0}")]
    Env(#[from] envy::Error),
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// When unset, every request runs as the anonymous user.
    #[serde(default)]
    pub jwt_secret: Option<String>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
struct PartialServerConfig {
    database_url: Option<String>,
    listen_addr: Option<String>,
    log_dir: Option<String>,
    jwt_secret: Option<String>,
    max_connections: Option<u32>,
}

fn default_database_url() -> String {
    "sqlite://tags.db?mode=rwc".to_string()
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_max_connections() -> u32 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            database_url: default_database_url(),
            listen_addr: default_listen_addr(),
            log_dir: default_log_dir(),
            jwt_secret: None,
            max_connections: default_max_connections(),
        }
    }
}

impl ServerConfig {
    /// Loads the config from an optional TOML file, then the environment.
    /// Environment variables win over the file.
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let file_config = match config_path {
            Some(path_str) => read_config_file(Path::new(path_str))?,
            None => PartialServerConfig::default(),
        };

        let env_config: PartialServerConfig = envy::from_env::<PartialServerConfig>()?;

        Ok(merge(env_config, file_config))
    }
}

fn read_config_file(path: &Path) -> Result<PartialServerConfig, ConfigError> {
    if !path.exists() {
        return Ok(PartialServerConfig::default());
    }
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn merge(env_config: PartialServerConfig, file_config: PartialServerConfig) -> ServerConfig {
    ServerConfig {
        database_url: env_config
            .database_url
            .or(file_config.database_url)
            .unwrap_or_else(default_database_url),
        listen_addr: env_config
            .listen_addr
            .or(file_config.listen_addr)
            .unwrap_or_else(default_listen_addr),
        log_dir: env_config
            .log_dir
            .or(file_config.log_dir)
            .unwrap_or_else(default_log_dir),
        jwt_secret: env_config
            .jwt_secret
            .or(file_config.jwt_secret)
            .filter(|secret| !secret.is_empty()),
        max_connections: env_config
            .max_connections
            .or(file_config.max_connections)
            .unwrap_or_else(default_max_connections),
    }
}
