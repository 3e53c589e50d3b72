//! Configuration types.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::error::ConfigError;

/// Maximum number of records returned by the list operation.
pub const LIST_LIMIT: usize = 50;

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub bind: IpAddr,
    pub port: u16,
    /// Path of the libSQL database file.
    pub db_path: PathBuf,
    /// Directory for daily-rolling log files. Stderr only when unset.
    pub log_dir: Option<PathBuf>,
    /// Allowed CORS origins. `["*"]` allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            db_path: PathBuf::from("./data/email-priority.db"),
            log_dir: None,
            cors_origins: vec!["*".to_string()],
        }
    }
}

impl ServerConfig {
    /// Build config from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup (env vars in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind = match lookup("EMAIL_PRIORITY_BIND") {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "EMAIL_PRIORITY_BIND".to_string(),
                message: format!("{raw:?}: {e}"),
            })?,
            None => defaults.bind,
        };

        let port: u16 = lookup("EMAIL_PRIORITY_PORT")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);

        let db_path = lookup("EMAIL_PRIORITY_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);

        let log_dir = lookup("EMAIL_PRIORITY_LOG_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let cors_origins: Vec<String> = lookup("EMAIL_PRIORITY_CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .filter(|origins: &Vec<String>| !origins.is_empty())
            .unwrap_or(defaults.cors_origins);

        Ok(Self {
            bind,
            port,
            db_path,
            log_dir,
            cors_origins,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    /// Whether any origin is allowed.
    pub fn cors_allows_any(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.db_path, PathBuf::from("./data/email-priority.db"));
        assert!(config.log_dir.is_none());
        assert!(config.cors_allows_any());
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn reads_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("EMAIL_PRIORITY_BIND", "127.0.0.1"),
            ("EMAIL_PRIORITY_PORT", "8081"),
            ("EMAIL_PRIORITY_DB_PATH", "/tmp/x.db"),
            ("EMAIL_PRIORITY_LOG_DIR", "/var/log/ep"),
            (
                "EMAIL_PRIORITY_CORS_ORIGINS",
                "https://a.example, https://b.example",
            ),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8081");
        assert_eq!(config.db_path, PathBuf::from("/tmp/x.db"));
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/ep")));
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert!(!config.cors_allows_any());
    }

    #[test]
    fn bad_port_falls_back_to_default() {
        let config =
            ServerConfig::from_lookup(lookup_from(&[("EMAIL_PRIORITY_PORT", "nope")])).unwrap();
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn bad_bind_address_is_rejected() {
        let err = ServerConfig::from_lookup(lookup_from(&[("EMAIL_PRIORITY_BIND", "not-an-ip")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "EMAIL_PRIORITY_BIND"));
    }

    #[test]
    fn empty_cors_list_keeps_default() {
        let config =
            ServerConfig::from_lookup(lookup_from(&[("EMAIL_PRIORITY_CORS_ORIGINS", " , ")]))
                .unwrap();
        assert!(config.cors_allows_any());
    }
}
