//! CLI command implementations for mapledash.
//!
//! Provides subcommand handlers for:
//! - `mapledash serve` — web dashboard
//! - `mapledash watch` — live terminal dashboard
//! - `mapledash usage` — one fetch cycle, printed once
//! - `mapledash status` — unauthenticated service status
//! - `mapledash token set|clear|show` — persisted token slot
//! - `mapledash config show|init|set|reset` — configuration management

use std::io::Write;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;

use crate::api::{HttpApi, ServiceStatus, UsageApi};
use crate::config::{self, DashConfig};
use crate::dashboard::{format_number, terminal};
use crate::logging;
use crate::session::Session;
use crate::token::{self, TokenStore};
use crate::web;

/// Output format for one-shot commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            _ => Self::Table,
        }
    }
}

const WATCH_REDRAW: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// mapledash serve
// ---------------------------------------------------------------------------

/// Start the session and serve the web dashboard until interrupted.
pub fn run_serve(cfg: &DashConfig, addr: Option<&str>, no_browser: bool) -> Result<()> {
    let addr = addr.unwrap_or(&cfg.web.addr).to_string();
    let session = Session::from_config(cfg);
    session.start();
    web::serve(session, &addr, cfg.web.open_browser && !no_browser)
}

// ---------------------------------------------------------------------------
// mapledash watch
// ---------------------------------------------------------------------------

/// Live terminal dashboard, redrawn every second until interrupted.
pub fn run_watch(cfg: &DashConfig) -> Result<()> {
    let session = Session::from_config(cfg);
    session.start();

    let mut stdout = std::io::stdout();
    loop {
        let frame = terminal::render(&session.view(), Utc::now());
        // clear screen, cursor home
        write!(stdout, "\x1b[2J\x1b[H")?;
        writeln!(stdout, "{}", "MapleAI Usage Dashboard".bold().cyan())?;
        writeln!(stdout, "{}", "=".repeat(50))?;
        writeln!(stdout)?;
        write!(stdout, "{frame}")?;
        writeln!(stdout, "\n{}", "Press Ctrl+C to stop.".dimmed())?;
        stdout.flush()?;
        thread::sleep(WATCH_REDRAW);
    }
}

// ---------------------------------------------------------------------------
// mapledash usage
// ---------------------------------------------------------------------------

/// Run one status check and one fetch cycle with the stored token.
pub fn run_usage(cfg: &DashConfig, format: OutputFormat) -> Result<()> {
    let session = Session::from_config(cfg);

    if !session.restore_token() {
        println!(
            "{}",
            "No API token stored. Run `mapledash token set <TOKEN>` first.".yellow()
        );
        return Ok(());
    }

    session.check_status();
    let result = session.fetch_cycle();
    let view = session.view();

    match format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&view).context("failed to serialize dashboard")?;
            println!("{json}");
        }
        OutputFormat::Table => print!("{}", terminal::render(&view, Utc::now())),
    }

    result.context("usage fetch failed")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// mapledash status
// ---------------------------------------------------------------------------

/// Query the unauthenticated service status endpoint once.
pub fn run_status(cfg: &DashConfig, format: OutputFormat) -> Result<()> {
    let api = HttpApi::from_config(&cfg.api);
    let status = match api.service_status() {
        Ok(status) => status,
        Err(err) => {
            if format == OutputFormat::Table {
                print_health_item("Service", false, "unreachable");
            }
            return Err(err).with_context(|| format!("status check against {} failed", api.base_url()));
        }
    };

    match format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&status).context("failed to serialize status")?;
            println!("{json}");
        }
        OutputFormat::Table => print_status_table(&status, api.base_url()),
    }
    Ok(())
}

fn print_status_table(status: &ServiceStatus, base_url: &str) {
    println!("{}", "MapleAI Service Status".bold().cyan());
    println!("{}", "=".repeat(40));
    print_health_item("Service", true, &status.status);
    print_health_item("Environment", true, &status.environment);
    print_health_item("Requests served", true, &format_number(status.requests));
    print_health_item("Tokens used", true, &format_number(status.total_tokens_used));
    print_health_item(
        "Endpoints",
        !status.endpoints.is_empty(),
        &status.endpoints.len().to_string(),
    );
    for endpoint in &status.endpoints {
        println!("      {}", endpoint.dimmed());
    }
    println!();
    println!("  {}", base_url.dimmed());
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<25} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// mapledash token set | clear | show
// ---------------------------------------------------------------------------

/// Persist a token to the configured slot.
pub fn run_token_set(cfg: &DashConfig, raw: &str) -> Result<()> {
    let mut store = TokenStore::from_config(&cfg.storage);
    let token = store.submit(raw).context("failed to store token")?;
    println!(
        "{} Token {} saved to {}",
        "✓".green().bold(),
        token::mask(&token).bold(),
        slot_display(&store)
    );
    println!(
        "  {}",
        "Run `mapledash usage` or `mapledash serve` to load your dashboard.".dimmed()
    );
    Ok(())
}

/// Remove the persisted token.
pub fn run_token_clear(cfg: &DashConfig) -> Result<()> {
    let mut store = TokenStore::from_config(&cfg.storage);
    store.clear().context("failed to remove token")?;
    println!("{} Token cleared ({})", "✓".green().bold(), slot_display(&store));
    Ok(())
}

/// Print the persisted token, masked unless `reveal` is set.
pub fn run_token_show(cfg: &DashConfig, reveal: bool) -> Result<()> {
    let mut store = TokenStore::from_config(&cfg.storage);
    match store.restore() {
        Some(token) => {
            let shown = if reveal { token } else { token::mask(&token) };
            println!("{shown}");
            println!("  {}", slot_display(&store).dimmed());
        }
        None => println!("{}", "No API token stored.".yellow()),
    }
    Ok(())
}

fn slot_display(store: &TokenStore) -> String {
    store
        .slot_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "memory only".to_string())
}

// ---------------------------------------------------------------------------
// mapledash config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective mapledash Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source(global_exists, "~/.mapledash/config.toml");
    print_source(project_exists, ".mapledash.toml");
    println!(
        "  {} {}",
        "·".dimmed(),
        "MAPLEDASH_* environment variables".dimmed()
    );

    if let Some(path) = logging::log_path() {
        println!();
        println!("{} {}", "Event log:".dimmed(), path.display());
    }

    Ok(())
}

fn print_source(exists: bool, name: &str) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.mapledash/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    println!("  {}", "Edit the file to customize mapledash.".dimmed());
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
