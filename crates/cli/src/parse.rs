//! ArgMatches → StoreCommand/MetaCommand conversion.
//!
//! Translates clap's parsed arguments into the appropriate action:
//! - Store operations → `CliAction::Execute(StoreCommand)`
//! - REPL meta-commands → `CliAction::Meta`

use clap::ArgMatches;
use serialstore::{Key, Value};

use crate::value::parse_value;

/// The result of parsing user input.
pub enum CliAction {
    /// A store operation.
    Execute(StoreCommand),
    /// A REPL-only meta-command.
    Meta(MetaCommand),
}

/// One store operation.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCommand {
    Get { key: Key },
    Set { key: Key, value: Value },
    Has { key: Key },
    Del { key: Key },
    Clear,
    Count,
    Keys,
    Each,
    Info,
}

/// REPL meta-commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaCommand {
    Help { command: Option<String> },
    Quit,
}

/// Check for REPL meta-commands before delegating to clap.
///
/// Returns `Some(MetaCommand)` if the line is a meta-command, `None` otherwise.
pub fn check_meta_command(line: &str) -> Option<MetaCommand> {
    let mut parts = line.split_whitespace();
    match parts.next()? {
        "quit" | "exit" => Some(MetaCommand::Quit),
        "help" | "?" => Some(MetaCommand::Help {
            command: parts.next().map(str::to_string),
        }),
        _ => None,
    }
}

/// Convert clap ArgMatches into a CliAction.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    let (sub_name, m) = matches
        .subcommand()
        .ok_or_else(|| "No command provided".to_string())?;

    let command = match sub_name {
        "get" => StoreCommand::Get { key: key(m)? },
        "set" => {
            let raw = m
                .get_one::<String>("value")
                .ok_or("set requires a value")?;
            StoreCommand::Set {
                key: key(m)?,
                value: parse_value(raw),
            }
        }
        "has" => StoreCommand::Has { key: key(m)? },
        "del" => StoreCommand::Del { key: key(m)? },
        "clear" => StoreCommand::Clear,
        "count" => StoreCommand::Count,
        "keys" => StoreCommand::Keys,
        "each" => StoreCommand::Each,
        "info" => StoreCommand::Info,
        other => return Err(format!("Unknown command: {}", other)),
    };
    Ok(CliAction::Execute(command))
}

/// Split a REPL/pipe line and parse it.
pub fn parse_line(line: &str) -> Result<CliAction, String> {
    if let Some(meta) = check_meta_command(line) {
        return Ok(CliAction::Meta(meta));
    }
    let args = shlex::split(line).ok_or_else(|| "Unbalanced quotes".to_string())?;
    let matches = crate::commands::build_line_cli()
        .try_get_matches_from(args)
        .map_err(|e| e.to_string().trim_end().to_string())?;
    matches_to_action(&matches)
}

fn key(m: &ArgMatches) -> Result<Key, String> {
    m.get_one::<String>("key")
        .cloned()
        .ok_or_else(|| "Missing key".to_string())
}
