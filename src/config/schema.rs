/// Configuration schema and defaults for mapledash.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[api]`, `[polling]`, `[storage]`, `[web]` and `[logging]`.
///
/// Every field has a built-in default. Users only need to set the values
/// they want to override.
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level mapledash configuration.
///
/// Maps directly to `~/.mapledash/config.toml` and `.mapledash.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub api: ApiConfig,
    pub polling: PollingConfig,
    pub storage: StorageConfig,
    pub web: WebConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [api]
// ---------------------------------------------------------------------------

/// Remote service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the usage service. The status endpoint is its root.
    pub base_url: String,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mapleai.de".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// ---------------------------------------------------------------------------
// [polling]
// ---------------------------------------------------------------------------

/// Intervals for the two scheduled tasks and the error banner lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds between service status checks.
    pub status_interval_secs: u64,
    /// Seconds between automatic usage refreshes once a fetch succeeded.
    pub usage_interval_secs: u64,
    /// Seconds an error banner stays visible.
    pub error_banner_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            status_interval_secs: 60,
            usage_interval_secs: 30,
            error_banner_secs: 5,
        }
    }
}

impl PollingConfig {
    pub fn status_interval(&self) -> Duration {
        Duration::from_secs(self.status_interval_secs.max(1))
    }

    pub fn usage_interval(&self) -> Duration {
        Duration::from_secs(self.usage_interval_secs.max(1))
    }

    /// Banner lifetime, saturating at the largest duration chrono can hold.
    pub fn error_banner_ttl(&self) -> chrono::Duration {
        i64::try_from(self.error_banner_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }
}

// ---------------------------------------------------------------------------
// [storage]
// ---------------------------------------------------------------------------

/// Where the bearer token is persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the token slot. `~` is expanded to the home directory.
    pub token_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            token_path: "~/.mapledash/token".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

/// Embedded web dashboard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address for `mapledash serve`.
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether event logging is enabled.
    pub enabled: bool,
    /// Path to the event log file. `~` is expanded to the home directory.
    pub path: String,
    /// Log level: `"debug"`, `"info"`, `"warn"`, `"error"`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.mapledash/events.log".to_string(),
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl DashConfig {
    /// Generate the annotated default TOML config file content.
    ///
    /// Used by `mapledash config init`.
    pub fn default_toml() -> String {
        r#"# mapledash Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (MAPLEDASH_*)
#   2. Project config (.mapledash.toml in current directory)
#   3. User global config (~/.mapledash/config.toml)
#   4. Built-in defaults

[api]
base_url = "https://api.mapleai.de"
timeout_ms = 10000

[polling]
status_interval_secs = 60     # GET / (no token needed)
usage_interval_secs = 30      # key-info + usage-history, armed after first success
error_banner_secs = 5

[storage]
token_path = "~/.mapledash/token"

[web]
addr = "127.0.0.1:9747"
open_browser = true

[logging]
enabled = true
path = "~/.mapledash/events.log"
level = "info"                # debug | info | warn | error
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
