//! CLI argument parsing using clap 4.x derive macros

use clap::Parser;
use std::path::PathBuf;

/// Daily board check-in agent for the Huluxia Floor forum
///
/// Logs the account in against the mobile API (reusing a cached session
/// when one is still valid), checks in to every configured board, and
/// reports a summary.
#[derive(Parser, Debug)]
#[command(name = "floorsign")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Forum account (phone number)
    pub account: String,

    /// Account password (prompted for interactively when omitted)
    #[arg(short, long)]
    pub password: Option<String>,

    /// Board list JSON file (board id -> display name)
    #[arg(long)]
    pub boards: Option<PathBuf>,

    /// Session cache file
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Webhook URL that receives the final summary
    #[arg(long)]
    pub notify_url: Option<String>,

    /// Override the vendor API origin
    #[arg(long)]
    pub base_url: Option<String>,
}
