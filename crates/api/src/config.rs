//! Application configuration loaded from environment variables.

use std::time::Duration;

use session::DEFAULT_PUBLIC_BASE_URL;

/// Default shared secret guarding the `/testing` endpoints.
pub const DEFAULT_SIMULATION_SECRET: &str = "super-secret-sim-key";

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `DATABASE_URL`: `sqlite:` URL selecting the SQLite backend (default: in-memory)
/// - `SIMULATION_SECRET`: value expected in the `Simulation-Secret` header
/// - `PUBLIC_BASE_URL`: prefix of order permalinks
/// - `WEBHOOK_TIMEOUT_MS`: bound on webhook and agent-profile fetches (default: `5000`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub simulation_secret: String,
    pub public_base_url: String,
    pub webhook_timeout: Duration,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            simulation_secret: std::env::var("SIMULATION_SECRET")
                .unwrap_or(defaults.simulation_secret),
            public_base_url: std::env::var("PUBLIC_BASE_URL").unwrap_or(defaults.public_base_url),
            webhook_timeout: std::env::var("WEBHOOK_TIMEOUT_MS")
                .ok()
                .and_then(|ms| ms.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.webhook_timeout),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the database URL if it selects the SQLite backend.
    pub fn sqlite_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .filter(|url| url.starts_with("sqlite:"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            simulation_secret: DEFAULT_SIMULATION_SECRET.to_string(),
            public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
            webhook_timeout: Duration::from_millis(5000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert!(config.database_url.is_none());
        assert_eq!(config.simulation_secret, "super-secret-sim-key");
        assert_eq!(config.public_base_url, "http://localhost:8080");
        assert_eq!(config.webhook_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_addr_default() {
        let config = Config::default();
        assert_eq!(config.addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_sqlite_url_selection() {
        let mut config = Config::default();
        assert!(config.sqlite_url().is_none());

        config.database_url = Some("sqlite://transactions.db".to_string());
        assert_eq!(config.sqlite_url(), Some("sqlite://transactions.db"));

        config.database_url = Some("postgres://localhost/ucp".to_string());
        assert!(config.sqlite_url().is_none());
    }
}
