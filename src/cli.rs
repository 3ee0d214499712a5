use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use crate::config::Config;
use crate::export::{report_file_name, ExportError};
use crate::server;
use crate::storage::FileStore;
use crate::tracker::MatchSession;

/// Handball match tracker: live action recording, statistics and CSV reports.
#[derive(Debug, Parser)]
#[command(name = "handball-tracker")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Run the operator console HTTP server
    Serve {
        /// Address to bind, overrides HANDBALL_BIND
        #[arg(long)]
        bind: Option<String>,
    },
    /// Write the match report CSV for the stored match
    Export {
        /// Output path (defaults to handball_match_report_<date>.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print scoreboard and per-player statistics as JSON
    Stats,
    /// Print the stored roster as JSON
    Players,
}

pub fn run_with_args(args: &[String]) -> i32 {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 2 } else { 0 };
            let _ = err.print();
            return code;
        }
    };

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "invalid configuration");
            eprintln!("configuration error: {err}");
            return 1;
        }
    };

    match cli.command {
        Command::Serve { bind } => handle_serve(config, bind),
        Command::Export { out } => handle_export(&config, out),
        Command::Stats => handle_stats(&config),
        Command::Players => handle_players(&config),
    }
}

fn handle_serve(mut config: Config, bind: Option<String>) -> i32 {
    if let Some(bind) = bind {
        config.bind_addr = bind;
    }
    match server::run_server(&config) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn open_session(config: &Config) -> Result<MatchSession<FileStore>, String> {
    let catalog = config.load_catalog().map_err(|err| err.to_string())?;
    MatchSession::load(FileStore::new(config.data_dir.clone()), catalog)
        .map_err(|err| format!("failed to load match data: {err}"))
}

fn handle_export(config: &Config, out: Option<PathBuf>) -> i32 {
    let session = match open_session(config) {
        Ok(session) => session,
        Err(msg) => {
            eprintln!("{msg}");
            return 1;
        }
    };
    let csv = match session.export_csv() {
        Ok(csv) => csv,
        Err(ExportError::NoData) => {
            eprintln!("nothing to export: no actions recorded");
            return 1;
        }
        Err(err) => {
            eprintln!("export failed: {err}");
            return 1;
        }
    };
    let path = out.unwrap_or_else(|| PathBuf::from(report_file_name(Utc::now().date_naive())));
    match fs::write(&path, csv) {
        Ok(()) => {
            info!(path = %path.display(), actions = session.ledger().len(), "report written");
            println!("report written: {}", path.display());
            0
        }
        Err(err) => {
            eprintln!("failed to write {}: {err}", path.display());
            1
        }
    }
}

fn handle_stats(config: &Config) -> i32 {
    let session = match open_session(config) {
        Ok(session) => session,
        Err(msg) => {
            eprintln!("{msg}");
            return 1;
        }
    };
    let payload = serde_json::json!({
        "scoreboard": session.scoreboard(),
        "players": session.summary(),
        "action_count": session.ledger().len(),
    });
    print_json(&payload)
}

fn handle_players(config: &Config) -> i32 {
    let session = match open_session(config) {
        Ok(session) => session,
        Err(msg) => {
            eprintln!("{msg}");
            return 1;
        }
    };
    print_json(session.roster().players())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize output: {err}");
            1
        }
    }
}
