// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! hubd - The hub issue tracker daemon.
//!
//! Owns the SQLite database at the state directory and listens on a Unix
//! socket for length-prefixed JSON requests. One request per connection;
//! authentication is per request via the token carried in the message.
//!
//! Usage:
//!   hubd --state-dir <path> [--config <path>]

use std::fs;
use std::io::Write;
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};

use clap::Parser;

use hub_core::{Config, Database, JwtIdentity, Tracker};

mod dispatch;
mod ipc;

use ipc::{framing, ApiResponse};

/// Socket filename within the state directory.
const SOCKET_NAME: &str = "hubd.sock";
/// PID filename within the state directory.
const PID_NAME: &str = "hubd.pid";
/// Lock filename for single instance guarantee.
const LOCK_NAME: &str = "hubd.lock";
/// Config filename within the state directory.
const CONFIG_NAME: &str = "hub.toml";
/// Environment variable: override the state directory.
const HUB_STATE_DIR: &str = "HUB_STATE_DIR";

#[derive(Debug, Parser)]
#[command(name = "hubd", version, about = "Issue tracker daemon")]
struct Args {
    /// Directory holding the socket, lock, log, and database files.
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Configuration file. Defaults to hub.toml in the state directory.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    let state_dir = resolve_state_dir(args.state_dir);

    if let Err(e) = fs::create_dir_all(&state_dir) {
        eprintln!("failed to create state dir {}: {}", state_dir.display(), e);
        std::process::exit(1);
    }

    let log_path = state_dir.join("hubd.log");
    setup_logging(&log_path);

    tracing::info!("hubd starting, state_dir={}", state_dir.display());

    // Acquire file lock for single instance
    let lock_path = state_dir.join(LOCK_NAME);
    let lock_file = match acquire_lock(&lock_path) {
        Ok(f) => f,
        Err(e) => {
            tracing::error!("failed to acquire lock: {}", e);
            std::process::exit(1);
        }
    };

    // Write PID file
    let pid_path = state_dir.join(PID_NAME);
    if let Err(e) = write_pid_file(&pid_path) {
        tracing::error!("failed to write PID file: {}", e);
        std::process::exit(1);
    }

    let config_path = args
        .config
        .unwrap_or_else(|| state_dir.join(CONFIG_NAME));
    let config = match Config::load_or_default(&config_path) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("failed to load config {}: {}", config_path.display(), e);
            std::process::exit(1);
        }
    };

    let db_path = config.database_path(&state_dir);
    let db = match Database::open(&db_path) {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("failed to open database {}: {}", db_path.display(), e);
            std::process::exit(1);
        }
    };
    let mut tracker = Tracker::new(db);
    let identity = JwtIdentity::new(&config);

    // Bind Unix socket
    let socket_path = state_dir.join(SOCKET_NAME);
    // Remove stale socket if it exists
    let _ = fs::remove_file(&socket_path);

    let listener = match UnixListener::bind(&socket_path) {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("failed to bind socket: {}", e);
            cleanup(&pid_path, &socket_path);
            std::process::exit(1);
        }
    };

    tracing::info!(
        "listening on {}, database {}",
        socket_path.display(),
        db_path.display()
    );

    // Signal readiness to parent process
    println!("READY");
    // Flush stdout so parent sees READY immediately
    let _ = std::io::stdout().flush();

    // Accept connections
    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(5)));
                let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(5)));

                match framing::read_request(&mut stream) {
                    Ok(request) => {
                        let response = dispatch::dispatch(&mut tracker, &identity, request);
                        let should_shutdown = matches!(response, ApiResponse::ShuttingDown);
                        let _ = framing::write_response(&mut stream, &response);
                        if should_shutdown {
                            tracing::info!("shutting down");
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("failed to read request: {}", e);
                    }
                }
            }
            Err(e) => {
                tracing::warn!("failed to accept connection: {}", e);
            }
        }
    }

    // Cleanup
    cleanup(&pid_path, &socket_path);
    drop(lock_file);
    tracing::info!("hubd stopped");
}

fn resolve_state_dir(flag: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = flag {
        return dir;
    }
    if let Ok(dir) = std::env::var(HUB_STATE_DIR) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    if let Some(dir) = dirs::state_dir() {
        return dir.join("hub");
    }
    dirs::home_dir()
        .map(|h| h.join(".local/state/hub"))
        .unwrap_or_else(|| PathBuf::from(".local/state/hub"))
}

fn setup_logging(log_path: &Path) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Try to open log file, fall back to stderr
    if let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn acquire_lock(lock_path: &Path) -> std::io::Result<fs::File> {
    use fs2::FileExt;

    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(lock_path)?;
    file.try_lock_exclusive()
        .map_err(|_| std::io::Error::other("another daemon instance is already running"))?;
    Ok(file)
}

fn write_pid_file(pid_path: &Path) -> std::io::Result<()> {
    fs::write(pid_path, format!("{}", std::process::id()))
}

fn cleanup(pid_path: &Path, socket_path: &Path) {
    let _ = fs::remove_file(pid_path);
    let _ = fs::remove_file(socket_path);
}
