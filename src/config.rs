use std::net::SocketAddr;
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "CropCare";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "cropcare=info,cropcare_lib=info,tower_http=info"
}

/// Sample prediction sources, highest priority first.
pub const SAMPLE_PREDICTION_CANDIDATES: &[&str] = &[
    "attached_assets/detection_results.json",
    "static/data/detection_results.json",
    "detection_results.json",
];

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_DATABASE_URL: &str = "sqlite:///plant_disease.db";
const DEFAULT_UPLOAD_FOLDER: &str = "static/uploads";
const DEFAULT_MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";
const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 120;
const DEFAULT_CHAT_SESSION_CAPACITY: usize = 256;
const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Process-wide configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_path: PathBuf,
    pub upload_dir: PathBuf,
    /// Request body cap in bytes (uploads included).
    pub max_upload_bytes: usize,
    /// `None` disables all generative features; fallbacks are served instead.
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub gemini_timeout_secs: u64,
    pub chat_session_capacity: usize,
    pub history_limit: usize,
    pub sample_sources: Vec<PathBuf>,
}

impl AppConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            key: "BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let database_url =
            get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let chat_session_capacity = parse_or(
            "CHAT_SESSION_CAPACITY",
            get("CHAT_SESSION_CAPACITY"),
            DEFAULT_CHAT_SESSION_CAPACITY,
        )?;
        if chat_session_capacity == 0 {
            return Err(ConfigError::Invalid {
                key: "CHAT_SESSION_CAPACITY",
                value: "0".into(),
            });
        }

        Ok(Self {
            bind_addr,
            database_path: sqlite_path_from_url(&database_url),
            upload_dir: PathBuf::from(
                get("UPLOAD_FOLDER").unwrap_or_else(|| DEFAULT_UPLOAD_FOLDER.to_string()),
            ),
            max_upload_bytes: parse_or(
                "MAX_CONTENT_LENGTH",
                get("MAX_CONTENT_LENGTH"),
                DEFAULT_MAX_CONTENT_LENGTH,
            )?,
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: get("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            gemini_timeout_secs: parse_or(
                "GEMINI_TIMEOUT_SECS",
                get("GEMINI_TIMEOUT_SECS"),
                DEFAULT_GEMINI_TIMEOUT_SECS,
            )?,
            chat_session_capacity,
            history_limit: parse_or("HISTORY_LIMIT", get("HISTORY_LIMIT"), DEFAULT_HISTORY_LIMIT)?,
            sample_sources: SAMPLE_PREDICTION_CANDIDATES
                .iter()
                .map(PathBuf::from)
                .collect(),
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
    }
}

/// `sqlite:///plant_disease.db` → `plant_disease.db`; plain paths pass through.
fn sqlite_path_from_url(url: &str) -> PathBuf {
    let path = url
        .strip_prefix("sqlite:///")
        .or_else(|| url.strip_prefix("sqlite://"))
        .or_else(|| url.strip_prefix("sqlite:"))
        .unwrap_or(url);
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_env_empty() {
        let config = config_with(&[]).unwrap();
        assert_eq!(config.bind_addr.port(), 5000);
        assert_eq!(config.database_path, PathBuf::from("plant_disease.db"));
        assert_eq!(config.upload_dir, PathBuf::from("static/uploads"));
        assert_eq!(config.max_upload_bytes, 16 * 1024 * 1024);
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.gemini_model, "gemini-1.5-pro");
        assert_eq!(config.chat_session_capacity, 256);
        assert_eq!(config.history_limit, 20);
        assert_eq!(config.sample_sources.len(), 3);
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = config_with(&[("GEMINI_API_KEY", "   ")]).unwrap();
        assert!(config.gemini_api_key.is_none());
    }

    #[test]
    fn overrides_are_read() {
        let config = config_with(&[
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DATABASE_URL", "/var/lib/cropcare/results.db"),
            ("GEMINI_API_KEY", "secret"),
            ("CHAT_SESSION_CAPACITY", "8"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.database_path, PathBuf::from("/var/lib/cropcare/results.db"));
        assert_eq!(config.gemini_api_key.as_deref(), Some("secret"));
        assert_eq!(config.chat_session_capacity, 8);
    }

    #[test]
    fn malformed_number_is_rejected() {
        let err = config_with(&[("MAX_CONTENT_LENGTH", "lots")]).unwrap_err();
        match err {
            ConfigError::Invalid { key, value } => {
                assert_eq!(key, "MAX_CONTENT_LENGTH");
                assert_eq!(value, "lots");
            }
        }
    }

    #[test]
    fn zero_chat_capacity_is_rejected() {
        assert!(config_with(&[("CHAT_SESSION_CAPACITY", "0")]).is_err());
    }

    #[test]
    fn sqlite_url_prefixes_are_stripped() {
        assert_eq!(sqlite_path_from_url("sqlite:///a.db"), PathBuf::from("a.db"));
        assert_eq!(sqlite_path_from_url("sqlite://b.db"), PathBuf::from("b.db"));
        assert_eq!(sqlite_path_from_url("c.db"), PathBuf::from("c.db"));
    }

    #[test]
    fn app_name_is_cropcare() {
        assert_eq!(APP_NAME, "CropCare");
    }
}
