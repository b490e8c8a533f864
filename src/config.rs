use anyhow::{Context, Result};
use std::fs::File;
use std::path::PathBuf;

use crate::cli::Cli;
use crate::models::{Filter, Priority};
use crate::state::TodoState;

const SAMPLE_TASKS: [(&str, &str, Priority); 5] = [
    ("Buy milk", "", Priority::Low),
    ("Pay rent", "2024-01-01", Priority::High),
    ("Book dentist appointment", "", Priority::Medium),
    ("Water the plants", "", Priority::Low),
    ("Renew passport", "2030-06-30", Priority::Medium),
];

#[derive(Debug, Clone)]
pub struct Config {
    pub log_file: Option<PathBuf>,
    pub initial_filter: Filter,
    pub seed: usize,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let initial_filter = cli
            .filter
            .parse::<Filter>()
            .context("invalid --filter value")?;
        Ok(Config {
            log_file: cli.log_file.clone(),
            initial_filter,
            seed: cli.seed,
        })
    }

    /// Session state the front ends start from.
    pub fn initial_state(&self) -> TodoState {
        let mut state = TodoState::with_filter(self.initial_filter);
        for (text, due, priority) in SAMPLE_TASKS.iter().cycle().take(self.seed) {
            state.add(*text, *due, *priority);
        }
        state
    }

    /// Initializes env_logger. The TUI owns the terminal, so without a log
    /// file it logs nowhere; headless runs fall back to stderr.
    pub fn init_logging(&self, interactive: bool) -> Result<()> {
        if interactive && self.log_file.is_none() {
            return Ok(());
        }

        let mut builder = env_logger::Builder::new();
        builder
            .filter_level(log::LevelFilter::Warn)
            .parse_default_env();

        match &self.log_file {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("failed to open log file {}", path.display()))?;
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            None => {
                builder.target(env_logger::Target::Stderr);
            }
        }

        builder.try_init()?;
        Ok(())
    }
}
