use std::{net::SocketAddr, path::Path};

use anyhow::Context;
use serde::{Serialize, Deserialize};

const DEFAULT_PATH: &str = "config.toml";

#[derive(Serialize, Deserialize, Default, Debug)]
#[serde(default)]
pub struct Config {
    pub http: Http,
    pub mpd: Mpd,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(default)]
pub struct Http {
    pub listen: SocketAddr,
}

impl Default for Http {
    fn default() -> Self {
        Http { listen: SocketAddr::from(([0, 0, 0, 0], 3000)) }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Mpd {
    /// `host:port` of the mpd control socket.
    pub address: String,
}

impl Default for Mpd {
    fn default() -> Self {
        Mpd { address: "localhost:6600".to_string() }
    }
}

fn try_config(path: &Path) -> anyhow::Result<Option<Config>> {
    let config_toml = match std::fs::read_to_string(path) {
        Ok(contents) => {
            log::info!("Using config at {}", path.display());
            contents
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("Looking for config at {}: {e:?}", path.display());
            return Ok(None);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("reading {}", path.display()));
        }
    };

    let config = toml::from_str(&config_toml)
        .with_context(|| format!("error in config file {}", path.display()))?;

    Ok(Some(config))
}

/// Loads `path` if given, which must exist. Otherwise looks for
/// `config.toml` in the working directory and falls back to defaults.
pub fn load(path: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = path {
        return try_config(path)?
            .with_context(|| format!("missing config file {}", path.display()));
    }

    if let Some(config) = try_config(Path::new(DEFAULT_PATH))? {
        return Ok(config);
    }

    log::info!("No {DEFAULT_PATH} found, using defaults");
    Ok(Config::default())
}
