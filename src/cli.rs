use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Write log records to this file (level from RUST_LOG)
    #[arg(long, global = true, env = "TODOS_LOG_FILE", value_name = "PATH")]
    pub log_file: Option<PathBuf>,
    /// Filter to start with: all, active or completed
    #[arg(short, long, global = true, env = "TODOS_FILTER", default_value = "all")]
    pub filter: String,
    /// Start with this many sample tasks
    #[arg(long, global = true, default_value_t = 0)]
    pub seed: usize,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch TUI interface
    Tui,
    /// Run line commands from a file (or stdin) without a terminal UI
    Script {
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
    },
    /// Print shell completions
    Completions {
        #[arg(value_name = "SHELL")]
        shell: String,
    },
}
