use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            reports: ReportsConfig::default(),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("opsdesk.db")
}

/// Report pipeline configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportsConfig {
    /// Directory scanned for raw transaction CSV inputs
    #[serde(default = "default_staging_dir")]
    pub staging_dir: PathBuf,
    /// Directory the generated reports are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Run the three generators one after another instead of concurrently
    #[serde(default)]
    pub sequential: bool,
    /// TTL for the cached status snapshot, in seconds
    #[serde(default = "default_status_cache_ttl")]
    pub status_cache_ttl_secs: u64,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            staging_dir: default_staging_dir(),
            output_dir: default_output_dir(),
            sequential: false,
            status_cache_ttl_secs: default_status_cache_ttl(),
        }
    }
}

fn default_staging_dir() -> PathBuf {
    PathBuf::from("tmp")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("out")
}

fn default_status_cache_ttl() -> u64 {
    5
}

/// Sanitized config for API responses
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub reports: SanitizedReportsConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedReportsConfig {
    pub staging_dir: String,
    pub output_dir: String,
    pub sequential: bool,
    pub status_cache_ttl_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            reports: SanitizedReportsConfig {
                staging_dir: config.reports.staging_dir.display().to_string(),
                output_dir: config.reports.output_dir.display().to_string(),
                sequential: config.reports.sequential,
                status_cache_ttl_secs: config.reports.status_cache_ttl_secs,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.path, PathBuf::from("opsdesk.db"));
        assert_eq!(config.reports.staging_dir, PathBuf::from("tmp"));
        assert_eq!(config.reports.output_dir, PathBuf::from("out"));
        assert!(!config.reports.sequential);
    }

    #[test]
    fn test_sanitized_config() {
        let config = Config::default();
        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.reports.staging_dir, "tmp");
        assert_eq!(sanitized.reports.output_dir, "out");
    }
}
