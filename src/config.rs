use crate::error::ConfigError;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Default capacity of the persisted history.
pub const DEFAULT_MAX_HISTORY_ITEMS: usize = 50;

/// Default background sync cadence.
pub const DEFAULT_SYNC_INTERVAL_MS: u64 = 30_000;

/// Floor for the sync cadence; anything below this hammers the collector.
pub const MIN_SYNC_INTERVAL_MS: u64 = 1_000;

/// What gets evicted when an append overflows the capacity bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvictionPolicy {
    /// Purely positional: drop the tail item regardless of delivery state.
    /// This mirrors the original collector client and can silently drop a
    /// still-pending item.
    #[default]
    Oldest,
    /// Prefer dropping already-delivered tail items; fall back to positional
    /// only when everything over capacity is still pending.
    DeliveredFirst,
}

/// classpulse configuration, persisted as TOML under `~/.classpulse/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the instructor dashboard API.
    pub api_url: String,

    /// Path appended to `api_url` for feedback submission.
    pub feedback_endpoint: String,

    /// Capacity bound of the persisted history.
    pub max_history_items: usize,

    /// Background sync cadence in milliseconds.
    pub sync_interval_ms: u64,

    /// Per-request timeout for delivery attempts.
    pub request_timeout_secs: u64,

    /// Overflow eviction policy.
    pub eviction_policy: EvictionPolicy,

    /// Computed at load time; never serialized.
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Computed at load time; never serialized.
    #[serde(skip)]
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "https://your-server-url.com/api".to_string(),
            feedback_endpoint: "/feedback".to_string(),
            max_history_items: DEFAULT_MAX_HISTORY_ITEMS,
            sync_interval_ms: DEFAULT_SYNC_INTERVAL_MS,
            request_timeout_secs: 30,
            eviction_policy: EvictionPolicy::default(),
            config_path: PathBuf::new(),
            data_dir: PathBuf::new(),
        }
    }
}

impl Config {
    /// Load `~/.classpulse/config.toml`, creating the directory and a
    /// default config on first run.
    pub fn load_or_init() -> Result<Self, ConfigError> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .ok_or_else(|| ConfigError::Load("could not find home directory".into()))?;
        let data_dir = home.join(".classpulse");
        let config_path = data_dir.join("config.toml");

        if !data_dir.exists() {
            fs::create_dir_all(&data_dir)?;
        }

        let mut config = if config_path.exists() {
            let contents = fs::read_to_string(&config_path)?;
            toml::from_str::<Config>(&contents)
                .map_err(|e| ConfigError::Load(format!("failed to parse config file: {e}")))?
        } else {
            Config::default()
        };

        // Set computed paths that are skipped during serialization.
        config.config_path = config_path.clone();
        config.data_dir = data_dir;

        config.apply_env_overrides();
        config.validate()?;

        if !config_path.exists() {
            config.save()?;
        }

        Ok(config)
    }

    /// Apply environment variable overrides to config.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("CLASSPULSE_API_URL") {
            if !url.is_empty() {
                self.api_url = url;
            }
        }

        if let Ok(endpoint) = std::env::var("CLASSPULSE_FEEDBACK_ENDPOINT") {
            if !endpoint.is_empty() {
                self.feedback_endpoint = endpoint;
            }
        }

        if let Ok(interval) = std::env::var("CLASSPULSE_SYNC_INTERVAL_MS") {
            if let Ok(ms) = interval.parse::<u64>() {
                self.sync_interval_ms = ms;
            }
        }

        if let Ok(max) = std::env::var("CLASSPULSE_MAX_HISTORY_ITEMS") {
            if let Ok(n) = max.parse::<usize>() {
                self.max_history_items = n;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.is_empty() {
            return Err(ConfigError::Validation("api_url must not be empty".into()));
        }
        if !self.feedback_endpoint.starts_with('/') {
            return Err(ConfigError::Validation(
                "feedback_endpoint must start with '/'".into(),
            ));
        }
        if self.max_history_items == 0 {
            return Err(ConfigError::Validation(
                "max_history_items must be at least 1".into(),
            ));
        }
        if self.sync_interval_ms < MIN_SYNC_INTERVAL_MS {
            return Err(ConfigError::Validation(format!(
                "sync_interval_ms must be at least {MIN_SYNC_INTERVAL_MS}"
            )));
        }
        Ok(())
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Load(format!("failed to serialize config: {e}")))?;
        fs::write(&self.config_path, toml_str)?;
        Ok(())
    }

    /// Full submission URL for the feedback endpoint.
    pub fn feedback_url(&self) -> String {
        format!(
            "{}{}",
            self.api_url.trim_end_matches('/'),
            self.feedback_endpoint
        )
    }

    /// Path of the history database inside the data directory.
    pub fn history_db_path(&self) -> PathBuf {
        self.data_dir.join("history.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, OnceLock};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap()
    }

    // ── Defaults ─────────────────────────────────────────────

    #[test]
    fn defaults_match_collector_protocol() {
        let config = Config::default();
        assert_eq!(config.feedback_endpoint, "/feedback");
        assert_eq!(config.max_history_items, 50);
        assert_eq!(config.sync_interval_ms, 30_000);
        assert_eq!(config.eviction_policy, EvictionPolicy::Oldest);
    }

    #[test]
    fn feedback_url_joins_without_duplicate_slash() {
        let config = Config {
            api_url: "https://collector.example/api/".into(),
            ..Config::default()
        };
        assert_eq!(config.feedback_url(), "https://collector.example/api/feedback");
    }

    // ── TOML round-trip ──────────────────────────────────────

    #[test]
    fn toml_round_trip_preserves_fields() {
        let config = Config {
            api_url: "https://collector.example/api".into(),
            sync_interval_ms: 60_000,
            eviction_policy: EvictionPolicy::DeliveredFirst,
            ..Config::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.api_url, config.api_url);
        assert_eq!(parsed.sync_interval_ms, 60_000);
        assert_eq!(parsed.eviction_policy, EvictionPolicy::DeliveredFirst);
    }

    #[test]
    fn minimal_toml_fills_defaults() {
        let parsed: Config = toml::from_str("api_url = \"https://x.example\"\n").unwrap();
        assert_eq!(parsed.api_url, "https://x.example");
        assert_eq!(parsed.max_history_items, 50);
        assert_eq!(parsed.eviction_policy, EvictionPolicy::Oldest);
    }

    #[test]
    fn eviction_policy_uses_kebab_case() {
        let parsed: Config =
            toml::from_str("eviction_policy = \"delivered-first\"\n").unwrap();
        assert_eq!(parsed.eviction_policy, EvictionPolicy::DeliveredFirst);
    }

    // ── Validation ───────────────────────────────────────────

    #[test]
    fn zero_capacity_fails_validation() {
        let config = Config {
            max_history_items: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn sub_second_interval_fails_validation() {
        let config = Config {
            sync_interval_ms: 100,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn relative_endpoint_fails_validation() {
        let config = Config {
            feedback_endpoint: "feedback".into(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    // ── Env overrides ────────────────────────────────────────

    #[test]
    fn env_overrides_take_effect() {
        let _guard = env_lock();
        unsafe {
            std::env::set_var("CLASSPULSE_API_URL", "https://override.example/api");
            std::env::set_var("CLASSPULSE_SYNC_INTERVAL_MS", "45000");
        }

        let mut config = Config::default();
        config.apply_env_overrides();

        unsafe {
            std::env::remove_var("CLASSPULSE_API_URL");
            std::env::remove_var("CLASSPULSE_SYNC_INTERVAL_MS");
        }

        assert_eq!(config.api_url, "https://override.example/api");
        assert_eq!(config.sync_interval_ms, 45_000);
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let _guard = env_lock();
        unsafe {
            std::env::set_var("CLASSPULSE_API_URL", "");
        }

        let mut config = Config::default();
        config.apply_env_overrides();

        unsafe {
            std::env::remove_var("CLASSPULSE_API_URL");
        }

        assert_eq!(config.api_url, Config::default().api_url);
    }
}
