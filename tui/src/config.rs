//! Command-line and environment configuration.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use todo_core::FilterMode;
use tracing_subscriber::EnvFilter;

/// Terminal client for a remote todo list
#[derive(Debug, Clone, Parser)]
#[command(name = "todos", version, about)]
pub struct Cli {
    /// Base address of the todo REST API
    #[arg(long, env = "TODO_API_URL", default_value = "http://localhost:3000")]
    pub base_url: String,

    /// User whose todos are shown
    #[arg(long, env = "TODO_USER_ID", default_value_t = 907)]
    pub user_id: i64,

    /// Initial filter: all, active or completed
    #[arg(long, default_value = "all")]
    pub filter: FilterMode,

    /// Where log output goes; the terminal itself is owned by the UI
    #[arg(long, env = "TODO_LOG_FILE", default_value = "todos.log")]
    pub log_file: PathBuf,
}

/// Route `tracing` output to `path`. Level comes from `RUST_LOG`, default `info`.
pub fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["todos"]).unwrap();
        assert_eq!(cli.user_id, 907);
        assert_eq!(cli.filter, FilterMode::All);
        assert_eq!(cli.log_file, PathBuf::from("todos.log"));
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "todos",
            "--base-url",
            "http://example.test/api",
            "--user-id",
            "12",
            "--filter",
            "completed",
        ])
        .unwrap();
        assert_eq!(cli.base_url, "http://example.test/api");
        assert_eq!(cli.user_id, 12);
        assert_eq!(cli.filter, FilterMode::Completed);
    }

    #[test]
    fn rejects_unknown_filter() {
        assert!(Cli::try_parse_from(["todos", "--filter", "done"]).is_err());
    }
}
