//! Server configuration: TOML file values overridden by command-line flags.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

#[derive(Debug, Parser)]
#[command(name = "offroad-server", about = "Serves pre-computed off-road GeoJSON files")]
pub struct Args {
    /// TOML file with server settings
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub host: Option<String>,
    #[arg(long)]
    pub port: Option<u16>,
    /// Merged county edges served at /offroad_edges/merged
    #[arg(long)]
    pub merged_file: Option<PathBuf>,
    /// Filtered waypoints served at /waypoints
    #[arg(long)]
    pub waypoints_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub merged_file: PathBuf,
    pub waypoints_file: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            merged_file: PathBuf::from("merged_all_counties.geojson"),
            waypoints_file: PathBuf::from("filtered_waypoints.geojson"),
        }
    }
}

impl ServerConfig {
    pub fn load(args: Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(host) = args.host {
            config.host = host;
        }
        if let Some(port) = args.port {
            config.port = port;
        }
        if let Some(merged_file) = args.merged_file {
            config.merged_file = merged_file;
        }
        if let Some(waypoints_file) = args.waypoints_file {
            config.waypoints_file = waypoints_file;
        }
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading server config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing server config {}", path.display()))
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}
