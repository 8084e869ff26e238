// Configuration module entry point
// Loads process configuration and validates the served document root

mod state;
mod types;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

// Re-export public types
pub use state::AppState;
pub use types::{Config, LoggingConfig, PerformanceConfig, ServerConfig, SiteConfig};

impl Config {
    /// Load configuration from the default `config.toml`
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from the given file path (without extension),
    /// merged with `SPA__`-prefixed environment variables over defaults
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("SPA").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("site.root", "./dist")?
            .set_default("site.fallback", "index.html")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Validate the document root and fallback document, returning the
    /// canonical root path all serving is fixed to
    ///
    /// A missing or unreadable root, or a root without the fallback
    /// document, is a fatal misconfiguration.
    pub fn validate_site(&self) -> Result<PathBuf, String> {
        let root = Path::new(&self.site.root).canonicalize().map_err(|e| {
            format!(
                "Document root '{}' is missing or unreadable: {e}",
                self.site.root
            )
        })?;
        if !root.is_dir() {
            return Err(format!(
                "Document root '{}' is not a directory",
                root.display()
            ));
        }
        let fallback = root.join(&self.site.fallback);
        if !fallback.is_file() {
            return Err(format!(
                "Fallback document '{}' not found under document root '{}'",
                self.site.fallback,
                root.display()
            ));
        }
        Ok(root)
    }
}
