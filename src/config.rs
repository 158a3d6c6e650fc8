// src/config.rs
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
};

pub const DEFAULT_DATA_PATH: &str = "CrimesOnWomenData.csv";

/// Which column layout the dataset uses, and therefore which charts are served.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Per-category columns: Rape, K&A, DD, AoW, AoM, DV, WT.
    #[default]
    Categories,
    /// Pre-aggregated Total Crimes / Other Crimes columns.
    Totals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub debug: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            debug: false,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = match self.host.as_str() {
            "localhost" => IpAddr::from([127, 0, 0, 1]),
            host => host
                .parse()
                .with_context(|| format!("invalid host address {:?}", host))?,
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: PathBuf,
    pub variant: Variant,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DATA_PATH),
            variant: Variant::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub server: ServerConfig,
    pub dataset: DatasetConfig,
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub debug: Option<bool>,
    pub data: Option<PathBuf>,
    pub variant: Option<Variant>,
}

impl DashboardConfig {
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config file {:?}", path))?;
        serde_yaml::from_str(&raw).with_context(|| format!("parsing config file {:?}", path))
    }

    /// Defaults, then the optional YAML file, then command-line overrides.
    pub fn resolve(file: Option<&Path>, overrides: Overrides) -> Result<Self> {
        let mut cfg = match file {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        if let Some(host) = overrides.host {
            cfg.server.host = host;
        }
        if let Some(port) = overrides.port {
            cfg.server.port = port;
        }
        if let Some(debug) = overrides.debug {
            cfg.server.debug = debug;
        }
        if let Some(data) = overrides.data {
            cfg.dataset.path = data;
        }
        if let Some(variant) = overrides.variant {
            cfg.dataset.variant = variant;
        }
        Ok(cfg)
    }
}
