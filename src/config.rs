//! Configuration for a SphinxQL connection.
//!
//! # Example
//!
//! ```
//! use sphinx_connection::SphinxConfig;
//!
//! // Minimal config (uses defaults)
//! let config = SphinxConfig::default();
//! assert_eq!(config.port, 9306);
//!
//! // Full config
//! let config = SphinxConfig {
//!     host: "search.internal".into(),
//!     prefix: "app_".into(),
//!     max_connections: 10,
//!     ..Default::default()
//! };
//! assert_eq!(config.dsn(), "mysql://search.internal:9306");
//! ```

use serde::Deserialize;

use crate::error::SphinxError;

/// Configuration for a SphinxQL connection.
///
/// All fields have sensible defaults matching a stock `searchd` listening on
/// the SphinxQL port. The table `prefix` is applied to every table name the
/// schema builder and query builder emit.
#[derive(Debug, Clone, Deserialize)]
pub struct SphinxConfig {
    /// Daemon host (default: 127.0.0.1)
    #[serde(default = "default_host")]
    pub host: String,

    /// SphinxQL listener port (default: 9306)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database name; the daemon ignores it but some proxies require one
    #[serde(default)]
    pub database: Option<String>,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: Option<String>,

    /// Connection charset (default: utf8)
    #[serde(default = "default_charset")]
    pub charset: String,

    #[serde(default)]
    pub collation: Option<String>,

    /// Table prefix prepended to every table name
    #[serde(default)]
    pub prefix: String,

    /// Pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Connect timeout in milliseconds
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Attempts made to establish the transport before giving up
    #[serde(default = "default_connect_retries")]
    pub connect_retries: usize,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 9306 }
fn default_charset() -> String { "utf8".to_string() }
fn default_max_connections() -> u32 { 5 }
fn default_connect_timeout_ms() -> u64 { 5_000 }
fn default_connect_retries() -> usize { 5 }

impl Default for SphinxConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: None,
            username: String::new(),
            password: None,
            charset: default_charset(),
            collation: None,
            prefix: String::new(),
            max_connections: default_max_connections(),
            connect_timeout_ms: default_connect_timeout_ms(),
            connect_retries: default_connect_retries(),
        }
    }
}

impl SphinxConfig {
    /// Connection URL for diagnostics. The password is never included.
    #[must_use]
    pub fn dsn(&self) -> String {
        let auth = if self.username.is_empty() {
            String::new()
        } else {
            format!("{}@", self.username)
        };
        let db = self
            .database
            .as_deref()
            .map(|d| format!("/{}", d))
            .unwrap_or_default();
        format!("mysql://{}{}:{}{}", auth, self.host, self.port, db)
    }

    /// Reject configurations that can never connect.
    pub fn validate(&self) -> Result<(), SphinxError> {
        if self.host.trim().is_empty() {
            return Err(SphinxError::Config("host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(SphinxError::Config("port must be non-zero".into()));
        }
        if self.max_connections == 0 {
            return Err(SphinxError::Config("max_connections must be at least 1".into()));
        }
        Ok(())
    }
}
