/// Configuration system for mapledash.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** — hardcoded in [`schema::DashConfig::default()`]
/// 2. **User global config** — `~/.mapledash/config.toml`
/// 3. **Project local config** — `.mapledash.toml` in the current working directory
/// 4. **Environment variables** — `MAPLEDASH_*` overrides (highest precedence)
///
/// Later layers override earlier ones at the key level: TOML files are merged
/// as value trees before deserialization, so a file that sets one key leaves
/// every other key at the previous layer's value.
///
/// # Usage
///
/// ```rust,ignore
/// use mapledash::config;
///
/// let cfg = config::load();
/// let client = HttpApi::from_config(&cfg.api);
/// ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::DashConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars. Malformed files are skipped so a typo never keeps the dashboard
/// from starting.
pub fn load() -> DashConfig {
    let mut config = load_layers(&[global_config_path(), project_config_path()]);
    apply_env_overrides(&mut config);
    config
}

/// Merge the given TOML files (in order) on top of the defaults.
fn load_layers(paths: &[Option<PathBuf>]) -> DashConfig {
    let Ok(mut merged) = toml::Value::try_from(DashConfig::default()) else {
        return DashConfig::default();
    };

    for path in paths.iter().flatten() {
        if let Some(overlay) = load_toml_value(path) {
            merge_values(&mut merged, overlay);
        }
    }

    merged.try_into().unwrap_or_default()
}

/// Read a TOML file as an untyped value tree.
///
/// Returns `None` if the file doesn't exist or the content is malformed.
fn load_toml_value(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Recursively merge `overlay` into `base`. Tables merge key by key; any other
/// value in the overlay replaces the base value.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.mapledash/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".mapledash").join("config.toml"))
}

/// Path to the project local config: `.mapledash.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".mapledash.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

/// Expand a leading `~` to the home directory.
///
/// Returns `None` only when the path starts with `~` and no home directory
/// can be determined.
pub fn expand_home(path: &str) -> Option<PathBuf> {
    if path == "~" {
        return dirs::home_dir();
    }
    match path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None => Some(PathBuf::from(path)),
    }
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `MAPLEDASH_API_URL` — base URL of the usage service
/// - `MAPLEDASH_TIMEOUT_MS` — per-request timeout
/// - `MAPLEDASH_STATUS_INTERVAL_SECS` — service status poll interval
/// - `MAPLEDASH_USAGE_INTERVAL_SECS` — usage refresh interval
/// - `MAPLEDASH_TOKEN_PATH` — token slot location
/// - `MAPLEDASH_WEB_ADDR` — listen address for `mapledash serve`
/// - `MAPLEDASH_LOG` — event logging on/off (`1`/`true`/`yes`/`on`)
/// - `MAPLEDASH_LOG_LEVEL` — `debug`, `info`, `warn`, `error`
fn apply_env_overrides(config: &mut DashConfig) {
    if let Ok(val) = std::env::var("MAPLEDASH_API_URL")
        && !val.is_empty()
    {
        config.api.base_url = val;
    }
    if let Ok(val) = std::env::var("MAPLEDASH_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.api.timeout_ms = ms;
    }

    if let Ok(val) = std::env::var("MAPLEDASH_STATUS_INTERVAL_SECS")
        && let Ok(secs) = val.parse::<u64>()
    {
        config.polling.status_interval_secs = secs;
    }
    if let Ok(val) = std::env::var("MAPLEDASH_USAGE_INTERVAL_SECS")
        && let Ok(secs) = val.parse::<u64>()
    {
        config.polling.usage_interval_secs = secs;
    }

    if let Ok(val) = std::env::var("MAPLEDASH_TOKEN_PATH")
        && !val.is_empty()
    {
        config.storage.token_path = val;
    }
    if let Ok(val) = std::env::var("MAPLEDASH_WEB_ADDR")
        && !val.is_empty()
    {
        config.web.addr = val;
    }

    if let Ok(val) = std::env::var("MAPLEDASH_LOG") {
        config.logging.enabled = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("MAPLEDASH_LOG_LEVEL")
        && crate::logging::Level::parse(&val).is_some()
    {
        config.logging.level = val.to_ascii_lowercase();
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.mapledash/config.toml`.
///
/// Returns an error if the file already exists (use `force = true` to
/// overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.mapledash/ directory")?;
    }

    fs::write(&path, DashConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Starts from the existing file (or the serialized defaults), updates the
/// dotted key, and writes the result back.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let source = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&DashConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&source).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    // Refuse to write something the loader would silently discard.
    let _: DashConfig = root
        .clone()
        .try_into()
        .with_context(|| format!("invalid value for '{key}': {value}"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// The existing value's type decides how `raw_value` is parsed.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').filter(|p| !p.is_empty()).collect();
    let Some((leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    let mut current = root;
    for &part in sections {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(*leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::String(_)) => toml::Value::String(raw_value.to_string()),
        Some(_) => anyhow::bail!("config key '{key}' cannot be set from the command line"),
        None => anyhow::bail!("config key not found: '{key}'"),
    };

    table.insert((*leaf).to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_file(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mapledash-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(is_truthy("YES"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn layers_merge_key_by_key() {
        let global = scratch_file(
            "global.toml",
            "[polling]\nusage_interval_secs = 10\nstatus_interval_secs = 20\n",
        );
        let project = scratch_file("project.toml", "[polling]\nstatus_interval_secs = 90\n");

        let config = load_layers(&[Some(global), Some(project)]);
        // project wins where it speaks, global survives where it doesn't
        assert_eq!(config.polling.status_interval_secs, 90);
        assert_eq!(config.polling.usage_interval_secs, 10);
        assert_eq!(config.api.base_url, "https://api.mapleai.de");
    }

    #[test]
    fn malformed_layer_is_ignored() {
        let broken = scratch_file("broken.toml", "[polling\nusage_interval_secs = ");
        let config = load_layers(&[Some(broken), None]);
        assert_eq!(config.polling.usage_interval_secs, 30);
    }

    #[test]
    fn expand_home_handles_tilde() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand_home("~/x/token"), Some(home.join("x").join("token")));
        assert_eq!(expand_home("/tmp/token"), Some(PathBuf::from("/tmp/token")));
    }

    #[test]
    fn set_toml_value_updates_string() {
        let mut root: toml::Value = toml::from_str("[api]\nbase_url = \"a\"\n").unwrap();
        set_toml_value(&mut root, "api.base_url", "http://localhost:8080").unwrap();
        assert_eq!(
            root["api"]["base_url"].as_str(),
            Some("http://localhost:8080")
        );
    }

    #[test]
    fn set_toml_value_updates_bool_and_integer() {
        let mut root: toml::Value =
            toml::from_str("[web]\nopen_browser = true\n[polling]\nusage_interval_secs = 30\n")
                .unwrap();
        set_toml_value(&mut root, "web.open_browser", "off").unwrap();
        set_toml_value(&mut root, "polling.usage_interval_secs", "15").unwrap();
        assert_eq!(root["web"]["open_browser"].as_bool(), Some(false));
        assert_eq!(root["polling"]["usage_interval_secs"].as_integer(), Some(15));
    }

    #[test]
    fn set_toml_value_rejects_bad_input() {
        let mut root: toml::Value = toml::from_str("[polling]\nusage_interval_secs = 30\n").unwrap();
        assert!(set_toml_value(&mut root, "nonexistent.key", "1").is_err());
        assert!(set_toml_value(&mut root, "polling.unknown", "1").is_err());
        assert!(set_toml_value(&mut root, "polling.usage_interval_secs", "soon").is_err());
        assert!(set_toml_value(&mut root, "", "1").is_err());
    }

    #[test]
    fn show_effective_config_returns_toml() {
        let toml_str = show_effective_config().unwrap();
        let _: DashConfig = toml::from_str(&toml_str).unwrap();
    }
}
