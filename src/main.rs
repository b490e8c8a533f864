mod cli;
mod config;
mod editor;
mod models;
mod script;
mod state;
mod ui;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use config::Config;
use script::ScriptRunner;
use std::fs::File;
use std::io::{self, BufReader};
use ui::run_tui;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_cli(&cli)?;
    let interactive = matches!(cli.command, None | Some(Commands::Tui));
    config.init_logging(interactive)?;

    let state = config.initial_state();
    log::debug!("starting with {} tasks, filter {}", state.tasks().len(), state.filter);

    match cli.command {
        Some(Commands::Script { path }) => {
            let stdout = io::stdout().lock();
            let mut runner = ScriptRunner::new(state, stdout);
            match path {
                Some(path) => {
                    let file = File::open(&path)
                        .with_context(|| format!("failed to open script {}", path.display()))?;
                    runner.run(BufReader::new(file))?;
                }
                None => {
                    runner.run(io::stdin().lock())?;
                }
            }
        }
        Some(Commands::Completions { shell }) => {
            use clap_complete::{generate, Shell};
            let shell = shell.to_lowercase();
            let shell_enum = match shell.as_str() {
                "bash" => Shell::Bash,
                "zsh" => Shell::Zsh,
                "fish" => Shell::Fish,
                "elvish" => Shell::Elvish,
                "powershell" => Shell::PowerShell,
                _ => {
                    println!("Unsupported shell: {}", shell);
                    return Ok(());
                }
            };
            let mut cmd = Cli::command();
            generate(shell_enum, &mut cmd, "todos", &mut io::stdout());
        }
        Some(Commands::Tui) | None => {
            run_tui(state)?;
        }
    }

    Ok(())
}
