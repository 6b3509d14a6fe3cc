//! Runtime configuration from the environment.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `PORT` | `8000` | TCP port, bound on all interfaces |
//! | `PORTS_DATA_FILE` | `data/ports.json` | JSON file holding the collection |

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::error::Error;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_DATA_FILE: &str = "data/ports.json";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub port: u16,
    pub data_file: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                Error::Config(format!("PORT must be a port number, got `{raw}`"))
            })?,
            None => DEFAULT_PORT,
        };
        let data_file = get("PORTS_DATA_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));

        Ok(Self { port, data_file })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        (Ipv4Addr::UNSPECIFIED, self.port).into()
    }
}
