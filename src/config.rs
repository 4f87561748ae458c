//! Runtime configuration from the environment

use crate::error::TrackerError;
use crate::models::UserId;
use crate::Result;
use std::env;
use std::path::PathBuf;

const DEFAULT_DATA_PATH: &str = "user_data.json";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Snapshot file location
    pub data_path: PathBuf,
    pub port: u16,
    /// Identity used by the single-user console bot
    pub console_user: UserId,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            port: DEFAULT_PORT,
            console_user: UserId(1),
        }
    }
}

impl TrackerConfig {
    /// Reads `.env` first, then the process environment
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let data_path = lookup("TRACKER_DATA_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);

        let port = match lookup("PORT").or_else(|| lookup("API_PORT")) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| TrackerError::ConfigError(format!("invalid port {:?}: {}", raw, e)))?,
            None => defaults.port,
        };

        let console_user = match lookup("TRACKER_USER_ID") {
            Some(raw) => raw.trim().parse().map(UserId).map_err(|e| {
                TrackerError::ConfigError(format!("invalid TRACKER_USER_ID {:?}: {}", raw, e))
            })?,
            None => defaults.console_user,
        };

        Ok(Self {
            data_path,
            port,
            console_user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, TrackerConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = TrackerConfig::from_lookup(lookup(&[
            ("TRACKER_DATA_PATH", "/var/lib/ledger/data.json"),
            ("API_PORT", "9090"),
            ("TRACKER_USER_ID", "-17"),
        ]))
        .unwrap();
        assert_eq!(config.data_path, PathBuf::from("/var/lib/ledger/data.json"));
        assert_eq!(config.port, 9090);
        assert_eq!(config.console_user, UserId(-17));
    }

    #[test]
    fn test_port_takes_precedence_and_is_validated() {
        let config =
            TrackerConfig::from_lookup(lookup(&[("PORT", "3000"), ("API_PORT", "9090")])).unwrap();
        assert_eq!(config.port, 3000);

        let result = TrackerConfig::from_lookup(lookup(&[("PORT", "eighty")]));
        assert!(matches!(result, Err(TrackerError::ConfigError(_))));
    }
}
