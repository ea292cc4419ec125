//! serialstore CLI: a shell over an in-process store.
//!
//! Three modes:
//! - **Shell mode**: `serialstore [flags] COMMAND` runs one command and exits
//! - **REPL mode**: `serialstore [flags]` opens an interactive prompt when stdin is a TTY
//! - **Pipe mode**: `echo "set k v" | serialstore` reads commands line by line from stdin
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

mod commands;
mod format;
mod parse;
mod repl;
mod state;
mod value;

use std::io::IsTerminal;
use std::process;

use serialstore::StoreConfig;
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{format_error, format_output, OutputMode};
use parse::{matches_to_action, CliAction};
use state::SessionState;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = build_cli().get_matches();

    // Determine output mode
    let output_mode = if matches.get_flag("json") {
        OutputMode::Json
    } else if matches.get_flag("raw") {
        OutputMode::Raw
    } else {
        OutputMode::Human
    };

    let config = match load_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let state = match SessionState::open(config) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    // Dispatch mode
    if matches.subcommand().is_some() {
        let exit_code = run_shell_mode(&matches, &state, output_mode);
        process::exit(exit_code);
    } else if std::io::stdin().is_terminal() {
        repl::run_repl(&state, output_mode);
    } else {
        let exit_code = repl::run_pipe(&state, output_mode);
        process::exit(exit_code);
    }
}

fn load_config(matches: &clap::ArgMatches) -> Result<StoreConfig, String> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => StoreConfig::from_path(path)
            .map_err(|e| format!("Failed to load config '{}': {}", path, e))?,
        None => StoreConfig::default(),
    };

    if let Some(name) = matches.get_one::<String>("name") {
        config.name = name.clone();
    }
    if let Some(store) = matches.get_one::<String>("store") {
        config.store_name = store.clone();
    }
    if let Some(ms) = matches.get_one::<u64>("settle-ms") {
        config.settle_delay_ms = *ms;
    }
    config
        .validate()
        .map_err(|e| format!("Invalid config: {}", e))?;
    Ok(config)
}

fn run_shell_mode(matches: &clap::ArgMatches, state: &SessionState, mode: OutputMode) -> i32 {
    match matches_to_action(matches) {
        Ok(CliAction::Execute(cmd)) => match state.execute(cmd) {
            Ok(output) => {
                let formatted = format_output(&output, mode);
                if !formatted.is_empty() {
                    println!("{}", formatted);
                }
                0
            }
            Err(e) => {
                eprintln!("{}", format_error(&e, mode));
                1
            }
        },
        Ok(CliAction::Meta(_)) => {
            eprintln!("(error) Meta-commands are only available in REPL mode");
            1
        }
        Err(e) => {
            eprintln!("(error) {}", e);
            1
        }
    }
}
