//! Server configuration.
//!
//! Settings come from three layers, highest precedence first: command-line
//! flags (or their environment variables), an optional YAML file given with
//! `--config`, and built-in defaults.

use crate::error::{Error, Result};
use clap::Parser;
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use trackr::storage::{DEFAULT_DATABASE_NAME, MEMORY_URL, StorageBackend};

/// Default listen host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// Command-line arguments.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "trackr-server", version, about = "Project-scoped issue tracker HTTP API")]
pub struct Args {
    /// Store connection string (`memory://`, `mongodb://...`)
    #[arg(long, env = "DB", value_name = "URL")]
    pub database_url: Option<String>,

    /// Database holding the per-project collections
    #[arg(long, env = "DB_NAME", value_name = "NAME")]
    pub database_name: Option<String>,

    /// Address to listen on
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Disable the permissive CORS layer
    #[arg(long)]
    pub no_cors: bool,

    /// YAML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Contents of a YAML configuration file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Store connection string.
    pub database_url: Option<String>,
    /// Database name.
    pub database_name: Option<String>,
    /// Listen host.
    pub host: Option<String>,
    /// Listen port.
    pub port: Option<u16>,
    /// Whether to enable CORS.
    pub cors: Option<bool>,
}

impl FileConfig {
    /// Read and parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and
    /// `Error::ConfigFile` if it is not valid YAML for this schema.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents).map_err(|source| Error::ConfigFile {
            path: path.display().to_string(),
            source,
        })
    }
}

/// Fully resolved server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind.
    pub addr: SocketAddr,
    /// Whether the permissive CORS layer is installed.
    pub cors: bool,
    /// Store to connect to.
    pub backend: StorageBackend,
}

impl ServerConfig {
    /// Resolve settings from arguments, loading the config file they name.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is unreadable or any value is
    /// invalid.
    pub fn resolve(args: &Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(args, file)
    }

    /// Merge arguments over file values over defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for an unparseable host and the core
    /// configuration error for an unsupported store URL.
    pub fn merge(args: &Args, file: FileConfig) -> Result<Self> {
        let host = args
            .host
            .clone()
            .or(file.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = args.port.or(file.port).unwrap_or(DEFAULT_PORT);
        let ip: IpAddr = host
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("invalid host address '{host}'")))?;

        let url = args
            .database_url
            .clone()
            .or(file.database_url)
            .unwrap_or_else(|| MEMORY_URL.to_string());
        let database = args
            .database_name
            .clone()
            .or(file.database_name)
            .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string());

        Ok(Self {
            addr: SocketAddr::new(ip, port),
            cors: !args.no_cors && file.cors.unwrap_or(true),
            backend: StorageBackend::parse(&url, database)?,
        })
    }
}
