//! CLI entry point for todo-gist.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use todo_gist_app::AppConfig;

mod commands;

/// Personal task list synchronized through a private GitHub Gist.
#[derive(Parser, Debug)]
#[command(
    name = "todo",
    version,
    about = "todo: a personal task list synchronized through a private GitHub Gist"
)]
struct Cli {
    /// Configuration file (defaults to the platform config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding tasks and credentials.
    #[arg(long, global = true, env = "TODO_GIST_HOME")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage the GitHub token.
    Auth {
        #[command(subcommand)]
        cmd: AuthCommand,
    },

    /// Add a new task.
    Add {
        /// Task description; several words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },

    /// List all tasks.
    #[command(alias = "ls")]
    List,

    /// Mark the task with the given id prefix completed.
    Done { prefix: String },

    /// Mark every task completed.
    DoneAll,

    /// Remove the task with the given id prefix, or `all` to remove every task.
    Rm { target: String },

    /// Reconcile local tasks with the remote gist.
    Sync,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Validate and store a personal access token with the `gist` scope.
    Setup {
        /// Token to store; read from stdin when omitted.
        #[arg(long)]
        token: Option<String>,
    },

    /// Show whether a token is configured.
    Status,

    /// Forget the stored token.
    Logout,
}

fn main() -> Result<ExitCode> {
    let Cli {
        config: config_path,
        data_dir,
        cmd,
    } = Cli::parse();
    install_tracing();

    let config = AppConfig::load(config_path.as_deref())?;
    let data_dir = config.data_dir(data_dir.as_deref())?;
    debug!(data_dir = %data_dir.display(), config = ?config_path, "Resolved paths");
    let env = commands::Environment::new(config, data_dir);

    let command = match cmd {
        Command::Auth {
            cmd: AuthCommand::Setup { token: None },
        } => Command::Auth {
            cmd: AuthCommand::Setup {
                token: Some(prompt_token()?),
            },
        },
        other => other,
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let mut stdout = io::stdout().lock();
    let ok = runtime.block_on(commands::run(command, &env, &mut stdout))?;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn prompt_token() -> Result<String> {
    println!("Enter your GitHub personal access token (requires 'gist' scope):");
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read token from stdin")?;
    Ok(line.trim().to_owned())
}

fn install_tracing() {
    // RUST_LOG overrides the default level; output goes to stderr.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_add_joins_words() {
        let cli = Cli::parse_from(["todo", "add", "Buy", "milk"]);
        match cli.cmd {
            Command::Add { words } => assert_eq!(words, vec!["Buy", "milk"]),
            other => panic!("expected add command, got {other:?}"),
        }
    }

    #[test]
    fn parse_add_requires_description() {
        assert!(Cli::try_parse_from(["todo", "add"]).is_err());
    }

    #[test]
    fn parse_done_and_rm() {
        let cli = Cli::parse_from(["todo", "done", "abc"]);
        assert!(matches!(cli.cmd, Command::Done { prefix } if prefix == "abc"));

        let cli = Cli::parse_from(["todo", "rm", "all"]);
        assert!(matches!(cli.cmd, Command::Rm { target } if target == "all"));

        let cli = Cli::parse_from(["todo", "done-all"]);
        assert!(matches!(cli.cmd, Command::DoneAll));
    }

    #[test]
    fn parse_auth_setup_with_token() {
        let cli = Cli::parse_from(["todo", "auth", "setup", "--token", "ghp_x"]);
        match cli.cmd {
            Command::Auth {
                cmd: AuthCommand::Setup { token },
            } => assert_eq!(token.as_deref(), Some("ghp_x")),
            other => panic!("expected auth setup, got {other:?}"),
        }
    }

    #[test]
    fn parse_global_options_after_subcommand() {
        let cli = Cli::parse_from(["todo", "sync", "--data-dir", "/tmp/todo", "--config", "/tmp/c.toml"]);
        assert!(matches!(cli.cmd, Command::Sync));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/todo")));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn parse_list_alias() {
        let cli = Cli::parse_from(["todo", "ls"]);
        assert!(matches!(cli.cmd, Command::List));
    }
}
