// src/config.rs
//
// Settings come from three layers: built-in defaults, an optional TOML file,
// then command-line flags (or their environment variables).

use crate::import::ImportSettings;
use clap::Parser;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Command-line arguments for buyer_leads
#[derive(Parser, Debug, Default)]
#[command(name = "buyer_leads")]
#[command(about = "Buyer lead intake with bulk CSV import")]
#[command(version)]
pub struct Args {
    /// Optional TOML settings file
    #[arg(short, long, env = "BUYER_LEADS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on
    #[arg(short, long, env = "BUYER_LEADS_BIND")]
    pub bind: Option<SocketAddr>,

    /// SQLite database file
    #[arg(short, long, env = "BUYER_LEADS_DB")]
    pub database: Option<String>,

    /// Worker threads serving requests
    #[arg(long)]
    pub workers: Option<usize>,

    /// Print a session token for this email (creating the user) and exit
    #[arg(long, value_name = "EMAIL")]
    pub issue_session: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_path: String,
    pub max_workers: usize,
    pub max_upload_bytes: usize,
    pub import: ImportSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            database_path: "buyer_leads.sqlite3".to_string(),
            max_workers: 8,
            max_upload_bytes: 5 * 1024 * 1024,
            import: ImportSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?;
                Self::from_toml_str(&text, path)?
            }
            None => Self::default(),
        };

        if let Some(bind) = args.bind {
            config.bind_addr = bind;
        }
        if let Some(db) = &args.database {
            config.database_path = db.clone();
        }
        if let Some(workers) = args.workers {
            config.max_workers = workers;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == 0 {
            return Err(ConfigError::Invalid("max_workers must be at least 1".into()));
        }
        if self.import.batch_size == 0 {
            return Err(ConfigError::Invalid("import.batch_size must be at least 1".into()));
        }
        if self.import.max_rows == 0 {
            return Err(ConfigError::Invalid("import.max_rows must be at least 1".into()));
        }
        Ok(())
    }
}
