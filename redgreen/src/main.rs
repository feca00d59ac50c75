//! TDD loop hook controller.
//!
//! Each hook subcommand reads one event payload from stdin and writes one
//! JSON decision to stdout. Hooks always exit 0; only `status` and usage
//! errors use other exit codes.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::warn;

use redgreen::context::HookContext;
use redgreen::edit::run_edit_gate;
use redgreen::exit_codes;
use redgreen::logging;
use redgreen::observe::run_observer;
use redgreen::status::{render_status, session_status};
use redgreen::stop::run_stop_gate;

#[derive(Parser)]
#[command(
    name = "redgreen",
    version,
    about = "Keeps an agent inside a five-phase RED/GREEN/REFACTOR loop"
)]
struct Cli {
    /// Project root (defaults to the current directory).
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Approve or deny a file edit (pre-edit hook).
    PreEdit,
    /// Advisory feedback after a shell command (post-command hook).
    PostCommand,
    /// Allow or block session exit (stop hook).
    Stop,
    /// Print a summary of the current session.
    Status,
}

fn main() {
    logging::init();
    match run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("resolve current directory")?,
    };
    let ctx = HookContext::open(&root);

    match cli.command {
        Command::PreEdit => {
            let raw = read_payload(ctx.config.max_payload_bytes);
            emit(&run_edit_gate(&ctx, &raw))
        }
        Command::PostCommand => {
            let raw = read_payload(ctx.config.max_payload_bytes);
            emit(&run_observer(&ctx, &raw))
        }
        Command::Stop => {
            let raw = read_payload(ctx.config.max_payload_bytes);
            emit(&run_stop_gate(&ctx, &raw))
        }
        Command::Status => cmd_status(&ctx, &root),
    }
}

fn cmd_status(ctx: &HookContext, root: &Path) -> Result<i32> {
    match session_status(ctx)? {
        Some(record) => {
            print!("{}", render_status(&record));
            Ok(exit_codes::OK)
        }
        None => {
            println!("no active session in {}", root.display());
            Ok(exit_codes::NO_SESSION)
        }
    }
}

/// Read at most `limit` bytes of stdin. A read error yields an empty payload.
fn read_payload(limit: usize) -> Vec<u8> {
    let mut raw = Vec::new();
    let limit = u64::try_from(limit).unwrap_or(u64::MAX);
    if let Err(err) = io::stdin().lock().take(limit).read_to_end(&mut raw) {
        warn!(error = %err, "failed to read hook payload; treating as empty");
        raw.clear();
    }
    raw
}

fn emit<T: Serialize>(decision: &T) -> Result<i32> {
    let mut out = serde_json::to_string(decision).context("serialize decision")?;
    out.push('\n');
    let mut stdout = io::stdout().lock();
    stdout.write_all(out.as_bytes()).context("write decision")?;
    stdout.flush().context("flush decision")?;
    Ok(exit_codes::OK)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hook_subcommands() {
        let cli = Cli::parse_from(["redgreen", "pre-edit"]);
        assert!(matches!(cli.command, Command::PreEdit));
        let cli = Cli::parse_from(["redgreen", "post-command"]);
        assert!(matches!(cli.command, Command::PostCommand));
        let cli = Cli::parse_from(["redgreen", "stop"]);
        assert!(matches!(cli.command, Command::Stop));
    }

    #[test]
    fn parse_root_before_or_after_subcommand() {
        let cli = Cli::parse_from(["redgreen", "--root", "/work/app", "status"]);
        assert_eq!(cli.root.as_deref(), Some(Path::new("/work/app")));
        assert!(matches!(cli.command, Command::Status));

        let cli = Cli::parse_from(["redgreen", "stop", "--root", "/work/app"]);
        assert_eq!(cli.root.as_deref(), Some(Path::new("/work/app")));
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["redgreen", "select"]).is_err());
    }
}
