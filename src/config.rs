//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `HOST` - Bind address (default: 0.0.0.0)
//! - `PORT` - Listen port (default: 8083)
//! - `CART_STORAGE_DIR` - Directory holding `cart-storage.json` (default: ./data)
//! - `CATALOG_PATH` - JSON file of products to seed the catalog with
//! - `CART_INSPECT` - Log the full cart state after every change (default: false)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

const DEFAULT_PORT: u16 = 8083;
const DEFAULT_STORAGE_DIR: &str = "./data";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub cart_storage_dir: PathBuf,
    pub catalog_path: Option<PathBuf>,
    /// Attach the tracing inspector to the cart store
    pub inspect_cart: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            cart_storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            catalog_path: None,
            inspect_cart: false,
        }
    }
}

impl Config {
    /// Load from the process environment. Call `dotenvy::dotenv()` first to
    /// pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let host = match lookup("HOST") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidEnvVar("HOST".into(), raw))?,
            None => defaults.host,
        };
        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidEnvVar("PORT".into(), raw))?,
            None => defaults.port,
        };
        let inspect_cart = match lookup("CART_INSPECT").as_deref() {
            None | Some("") | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => return Err(ConfigError::InvalidEnvVar("CART_INSPECT".into(), other.to_string())),
        };
        Ok(Self {
            host,
            port,
            cart_storage_dir: lookup("CART_STORAGE_DIR").map(PathBuf::from).unwrap_or(defaults.cart_storage_dir),
            catalog_path: lookup("CATALOG_PATH").filter(|p| !p.is_empty()).map(PathBuf::from),
            inspect_cart,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr { SocketAddr::new(self.host, self.port) }
}
