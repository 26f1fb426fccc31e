//! # Client Configuration
//!
//! Which backend the stores talk to, and how.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CRM_BACKEND=http                                                   │
//! │     CRM_API_URL=https://crm.example.com/api                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/crm/client.toml (Linux)                                  │
//! │     ~/Library/Application Support/com.relay.crm/client.toml (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     mock backend, realistic latency, page size 10                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # client.toml
//! backend = "http"   # mock | http
//!
//! [api]
//! base_url = "http://localhost:3000/api"
//! timeout_secs = 10
//!
//! [mock]
//! latency_scale = 1.0   # 0 disables simulated delays
//!
//! [store]
//! page_size = 10
//! propagation = "first_record_heuristic"   # or active_customer
//!
//! [session]
//! database_path = "/var/lib/crm/session.db"   # omit for the default
//! in_memory = false
//! ```
//!
//! ## Environment Variables
//!
//! | Variable                 | Field                    |
//! |--------------------------|--------------------------|
//! | `CRM_BACKEND`            | `backend`                |
//! | `CRM_API_URL`            | `api.base_url`           |
//! | `CRM_API_TIMEOUT_SECS`   | `api.timeout_secs`       |
//! | `CRM_MOCK_LATENCY_SCALE` | `mock.latency_scale`     |
//! | `CRM_PAGE_SIZE`          | `store.page_size`        |
//! | `CRM_PROPAGATION`        | `store.propagation`      |
//! | `CRM_SESSION_DB`         | `session.database_path`  |

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crm_core::{PropagationPolicy, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

use crate::client::DEFAULT_API_URL;
use crate::error::{TransportError, TransportResult};

const CONFIG_FILE: &str = "client.toml";
const SESSION_DB_FILE: &str = "session.db";

// =============================================================================
// Backend Kind
// =============================================================================

/// Which implementation of the data-source ports to wire up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// In-memory sources seeded with demo records.
    #[default]
    Mock,

    /// The REST backend at `api.base_url`.
    Http,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Mock => write!(f, "mock"),
            BackendKind::Http => write!(f, "http"),
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mock" | "demo" => Ok(BackendKind::Mock),
            "http" | "rest" => Ok(BackendKind::Http),
            other => Err(TransportError::InvalidConfig(format!(
                "Unknown backend: '{}'. Valid options: mock, http",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

/// REST backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Mock backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockSettings {
    /// Multiplier on the simulated delays. 1.0 is realistic, 0 is instant.
    #[serde(default = "default_latency_scale")]
    pub latency_scale: f64,
}

fn default_latency_scale() -> f64 {
    1.0
}

impl Default for MockSettings {
    fn default() -> Self {
        MockSettings {
            latency_scale: default_latency_scale(),
        }
    }
}

/// Store behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// How a created or updated lead is mirrored into the per-customer list.
    #[serde(default)]
    pub propagation: PropagationPolicy,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            page_size: default_page_size(),
            propagation: PropagationPolicy::default(),
        }
    }
}

/// Where the session token and user are persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Keep the session in memory only (nothing survives a restart).
    #[serde(default)]
    pub in_memory: bool,
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub backend: BackendKind,

    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub mock: MockSettings,

    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub session: SessionSettings,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (client.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> TransportResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> TransportResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| TransportError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| TransportError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)
            .map_err(|e| TransportError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Client config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> TransportResult<()> {
        let url = Url::parse(&self.api.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(TransportError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(TransportError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        if !(1..=MAX_PAGE_SIZE).contains(&self.store.page_size) {
            return Err(TransportError::InvalidConfig(format!(
                "page_size must be between 1 and {}, got: {}",
                MAX_PAGE_SIZE, self.store.page_size
            )));
        }

        let scale = self.mock.latency_scale;
        if !scale.is_finite() || scale < 0.0 {
            return Err(TransportError::InvalidConfig(format!(
                "latency_scale must be a non-negative number, got: {}",
                scale
            )));
        }

        Ok(())
    }

    /// Applies `CRM_*` overrides read through `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("CRM_BACKEND") {
            match backend.parse() {
                Ok(parsed) => {
                    debug!(backend = %backend, "Overriding backend from environment");
                    self.backend = parsed;
                }
                Err(_) => warn!(backend = %backend, "Unknown backend in environment"),
            }
        }

        if let Some(url) = lookup("CRM_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(secs) = lookup("CRM_API_TIMEOUT_SECS") {
            if let Ok(s) = secs.parse::<u64>() {
                self.api.timeout_secs = s;
            }
        }

        if let Some(scale) = lookup("CRM_MOCK_LATENCY_SCALE") {
            if let Ok(s) = scale.parse::<f64>() {
                debug!(scale = s, "Overriding mock latency from environment");
                self.mock.latency_scale = s;
            }
        }

        if let Some(size) = lookup("CRM_PAGE_SIZE") {
            if let Ok(s) = size.parse::<u32>() {
                self.store.page_size = s;
            }
        }

        if let Some(policy) = lookup("CRM_PROPAGATION") {
            match policy.parse() {
                Ok(parsed) => self.store.propagation = parsed,
                Err(_) => warn!(policy = %policy, "Unknown propagation policy in environment"),
            }
        }

        if let Some(path) = lookup("CRM_SESSION_DB") {
            debug!(path = %path, "Overriding session database from environment");
            self.session.database_path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "relay", "crm")
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The SQLite file holding the session, or `None` for in-memory.
    pub fn session_db_path(&self) -> Option<PathBuf> {
        if self.session.in_memory {
            return None;
        }
        self.session.database_path.clone().or_else(|| {
            Self::project_dirs().map(|dirs| dirs.data_dir().join(SESSION_DB_FILE))
        })
    }

    pub fn is_mock(&self) -> bool {
        self.backend == BackendKind::Mock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("mock".parse::<BackendKind>().unwrap(), BackendKind::Mock);
        assert_eq!("HTTP".parse::<BackendKind>().unwrap(), BackendKind::Http);
        assert_eq!("rest".parse::<BackendKind>().unwrap(), BackendKind::Http);
        assert!("grpc".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(config.is_mock());
        assert_eq!(config.api.base_url, "http://localhost:3000/api");
        assert_eq!(config.api.timeout(), Duration::from_secs(10));
        assert_eq!(config.store.page_size, 10);
        assert_eq!(config.store.propagation, PropagationPolicy::FirstRecordHeuristic);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::default();

        config.api.base_url = "ws://localhost:3000".into();
        assert!(matches!(config.validate(), Err(TransportError::InvalidUrl(_))));

        config.api.base_url = "https://crm.example.com/api".into();
        assert!(config.validate().is_ok());

        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());
        config.api.timeout_secs = 5;

        config.store.page_size = 0;
        assert!(config.validate().is_err());
        config.store.page_size = MAX_PAGE_SIZE + 1;
        assert!(config.validate().is_err());
        config.store.page_size = MAX_PAGE_SIZE;
        assert!(config.validate().is_ok());

        config.mock.latency_scale = f64::NAN;
        assert!(config.validate().is_err());
        config.mock.latency_scale = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ClientConfig::default();
        config.apply_env_overrides(env(&[
            ("CRM_BACKEND", "http"),
            ("CRM_API_URL", "https://crm.example.com/api"),
            ("CRM_API_TIMEOUT_SECS", "30"),
            ("CRM_MOCK_LATENCY_SCALE", "0"),
            ("CRM_PAGE_SIZE", "25"),
            ("CRM_PROPAGATION", "active_customer"),
            ("CRM_SESSION_DB", "/tmp/crm-session.db"),
        ]));

        assert_eq!(config.backend, BackendKind::Http);
        assert_eq!(config.api.base_url, "https://crm.example.com/api");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.mock.latency_scale, 0.0);
        assert_eq!(config.store.page_size, 25);
        assert_eq!(config.store.propagation, PropagationPolicy::ActiveCustomer);
        assert_eq!(
            config.session_db_path(),
            Some(PathBuf::from("/tmp/crm-session.db"))
        );
    }

    #[test]
    fn test_bad_env_values_are_ignored() {
        let mut config = ClientConfig::default();
        config.apply_env_overrides(env(&[
            ("CRM_BACKEND", "carrier-pigeon"),
            ("CRM_PAGE_SIZE", "lots"),
            ("CRM_PROPAGATION", "everywhere"),
        ]));
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_in_memory_session_has_no_path() {
        let mut config = ClientConfig::default();
        config.session.database_path = Some(PathBuf::from("/tmp/ignored.db"));
        config.session.in_memory = true;
        assert_eq!(config.session_db_path(), None);
    }

    #[test]
    fn test_toml_roundtrip_through_file() {
        let dir = std::env::temp_dir().join(format!("crm-config-{}", std::process::id()));
        let path = dir.join(CONFIG_FILE);

        let mut config = ClientConfig::default();
        config.backend = BackendKind::Http;
        config.store.propagation = PropagationPolicy::ActiveCustomer;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("backend = \"http\""));
        assert!(contents.contains("[store]"));
        assert!(contents.contains("propagation = \"active_customer\""));

        let loaded: ClientConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: ClientConfig = toml::from_str("[store]\npage_size = 20\n").unwrap();
        assert_eq!(config.store.page_size, 20);
        assert_eq!(config.api, ApiSettings::default());
        assert!(config.is_mock());
    }
}
