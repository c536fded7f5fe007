use anyhow::Result;
use clap::{Parser, Subcommand};

use mapledash::{cli, config, logging};

#[derive(Debug, Parser)]
#[command(name = "mapledash")]
#[command(about = "Usage dashboard for MapleAI API keys")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the web dashboard
    Serve {
        /// Listen address (default: [web] addr)
        #[arg(long)]
        addr: Option<String>,
        /// Do not open a browser window
        #[arg(long)]
        no_browser: bool,
    },
    /// Live terminal dashboard
    Watch,
    /// Fetch key usage once and print it
    Usage {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show the public service status
    Status {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Manage the stored API token
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum TokenAction {
    /// Store a token
    Set {
        /// The API token
        token: String,
    },
    /// Remove the stored token
    Clear,
    /// Print the stored token (masked)
    Show {
        /// Print the token in full
        #[arg(long)]
        reveal: bool,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `polling.usage_interval_secs 60`
    Set { key: String, value: String },
    /// Reset the config file to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    let cfg = config::load();
    logging::init(&cfg.logging);

    match app.command {
        Commands::Serve { addr, no_browser } => cli::run_serve(&cfg, addr.as_deref(), no_browser),
        Commands::Watch => cli::run_watch(&cfg),
        Commands::Usage { format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_usage(&cfg, fmt)
        }
        Commands::Status { format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_status(&cfg, fmt)
        }
        Commands::Token { action } => match action {
            TokenAction::Set { token } => cli::run_token_set(&cfg, &token),
            TokenAction::Clear => cli::run_token_clear(&cfg),
            TokenAction::Show { reveal } => cli::run_token_show(&cfg, reveal),
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
