//! `floorsign` - daily board check-in for the Huluxia Floor forum
//!
//! This binary wires the pieces together: configuration, the HTTP API
//! client, the session cache, the optional notifier, and one agent run.

use anyhow::{Context, Result};
use clap::Parser;
use console::Style;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use floorsign_core::api::HttpFloorApi;
use floorsign_core::boards::load_boards;
use floorsign_core::session::SessionStore;
use floorsign_core::{Config, DeviceProfile, FloorsignError, SessionAgent};

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let mut config = Config::load().context("Failed to load configuration")?;
    // CLI flags win over the config file
    if cli.boards.is_some() {
        config.boards_file = cli.boards.clone();
    }
    if cli.cache.is_some() {
        config.cache_file = cli.cache.clone();
    }
    if cli.notify_url.is_some() {
        config.notify_url = cli.notify_url.clone();
    }
    if cli.base_url.is_some() {
        config.base_url = cli.base_url.clone();
    }

    let password = match cli.password {
        Some(password) => password,
        None => inquire::Password::new("Password:")
            .without_confirmation()
            .prompt()
            .context("Failed to read password")?,
    };

    let device = DeviceProfile::random();
    let api = HttpFloorApi::new(config.base_url(), device.clone())
        .context("Failed to build the API client")?;
    let store = SessionStore::new(config.cache_file());
    let boards = load_boards(&config.boards_file());
    let notifier = floorsign_core::notify::from_config(config.notify_url.as_deref());

    let mut agent = SessionAgent::new(Arc::new(api), store, boards, device);
    if let Some(notifier) = notifier {
        agent = agent.with_notifier(notifier);
    }

    let summary = match agent.perform_daily_check_in(&cli.account, &password).await {
        Ok(summary) => summary,
        Err(e @ FloorsignError::Auth { .. }) => {
            let red = Style::new().red().bold();
            eprintln!("{} {}", red.apply_to("✗"), e);
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Check-in run failed"),
    };

    let green = Style::new().green().bold();
    let dim = Style::new().dim();
    println!(
        "{} {} ({}) checked in to {}/{} boards",
        green.apply_to("✔"),
        cli.account,
        dim.apply_to(&summary.nickname),
        summary.success_count,
        summary.total_count
    );

    Ok(())
}
