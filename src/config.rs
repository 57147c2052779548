//! Environment-sourced configuration loader and validator.

use std::fs;
use thiserror::Error;

pub const DEFAULT_CHECK_INTERVAL: u64 = 300;
pub const DEFAULT_INVENTORY_URL: &str = "https://www.tesla.com/tr_tr/inventory/new";
pub const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_MODELS: &[&str] = &["Model 3", "Model Y"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

/// Startup configuration. Every field is fixed for the lifetime of the
/// process; the monitoring toggle lives in the watcher, not here, and
/// deliberately resets to enabled on restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bot_token: String,
    pub chat_id: i64,
    /// Seconds between inventory checks.
    pub check_interval: u64,
    /// Model names a listing must mention to be picked up.
    pub models: Vec<String>,
    pub inventory_url: String,
    pub data_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bot_token = get("TELEGRAM_BOT_TOKEN")
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;

        let chat_id = get("TELEGRAM_CHAT_ID")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("TELEGRAM_CHAT_ID"))?
            .trim()
            .parse::<i64>()
            .map_err(|err| ConfigError::Invalid {
                var: "TELEGRAM_CHAT_ID",
                message: err.to_string(),
            })?;

        let check_interval = match get("CHECK_INTERVAL") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|err| ConfigError::Invalid {
                var: "CHECK_INTERVAL",
                message: err.to_string(),
            })?,
            None => DEFAULT_CHECK_INTERVAL,
        };
        if check_interval == 0 {
            return Err(ConfigError::Invalid {
                var: "CHECK_INTERVAL",
                message: "must be > 0".into(),
            });
        }

        // MODELS is a JSON array of strings, e.g. ["Model 3", "Model Y"].
        let models: Vec<String> = match get("MODELS") {
            Some(raw) => serde_json::from_str(&raw).map_err(|err| ConfigError::Invalid {
                var: "MODELS",
                message: err.to_string(),
            })?,
            None => DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
        };
        if models.is_empty() || models.iter().any(|m| m.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                var: "MODELS",
                message: "must be a non-empty array of non-empty names".into(),
            });
        }

        let inventory_url = get("INVENTORY_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_INVENTORY_URL.to_string());
        let data_dir = get("DATA_DIR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());

        Ok(Config {
            bot_token,
            chat_id,
            check_interval,
            models,
            inventory_url,
            data_dir,
        })
    }

    /// Ensure the state directory exists (creates `data_dir` if missing).
    pub fn ensure_data_dir(&self) -> Result<(), std::io::Error> {
        if self.data_dir.trim().is_empty() {
            return Ok(());
        }
        fs::create_dir_all(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map = vars(pairs);
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn minimal_env_uses_defaults() {
        let cfg = load(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "-100200300"),
        ])
        .unwrap();
        assert_eq!(cfg.chat_id, -100200300);
        assert_eq!(cfg.check_interval, DEFAULT_CHECK_INTERVAL);
        assert_eq!(cfg.models, vec!["Model 3", "Model Y"]);
        assert_eq!(cfg.inventory_url, DEFAULT_INVENTORY_URL);
        assert_eq!(cfg.data_dir, DEFAULT_DATA_DIR);
    }

    #[test]
    fn missing_token_is_rejected() {
        let err = load(&[("TELEGRAM_CHAT_ID", "1")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TELEGRAM_BOT_TOKEN")));
    }

    #[test]
    fn missing_chat_id_is_rejected() {
        let err = load(&[("TELEGRAM_BOT_TOKEN", "123:abc")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("TELEGRAM_CHAT_ID")));
    }

    #[test]
    fn non_numeric_chat_id_is_rejected() {
        let err = load(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "not-a-number"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "TELEGRAM_CHAT_ID", .. }));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let err = load(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "1"),
            ("CHECK_INTERVAL", "0"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "CHECK_INTERVAL", .. }));
    }

    #[test]
    fn models_parse_from_json_array() {
        let cfg = load(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "1"),
            ("MODELS", r#"["Model S", "Model X"]"#),
        ])
        .unwrap();
        assert_eq!(cfg.models, vec!["Model S", "Model X"]);
    }

    #[test]
    fn empty_model_list_is_rejected() {
        let err = load(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "1"),
            ("MODELS", "[]"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "MODELS", .. }));
    }

    #[test]
    fn ensure_data_dir_creates_directory() {
        let td = tempfile::tempdir().unwrap();
        let dir = td.path().join("state");
        let mut cfg = load(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("TELEGRAM_CHAT_ID", "1"),
        ])
        .unwrap();
        cfg.data_dir = dir.to_string_lossy().to_string();
        cfg.ensure_data_dir().unwrap();
        assert!(dir.exists());
    }
}
