//! clap command tree.
//!
//! The same tree parses process arguments in shell mode and each line in
//! REPL and pipe mode (built with `no_binary_name` there).

use clap::{Arg, ArgAction, Command};

/// Build the top-level command with global flags and every subcommand.
pub fn build_cli() -> Command {
    Command::new("serialstore")
        .about("Shell over an always-asynchronous key/value store")
        .subcommand_required(false)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("PATH")
                .help("Load store settings from a TOML file")
                .global(true),
        )
        .arg(
            Arg::new("name")
                .long("name")
                .value_name("NAME")
                .help("Database name")
                .global(true),
        )
        .arg(
            Arg::new("store")
                .long("store")
                .value_name("STORE")
                .help("Object store name")
                .global(true),
        )
        .arg(
            Arg::new("settle-ms")
                .long("settle-ms")
                .value_name("MS")
                .value_parser(clap::value_parser!(u64))
                .help("Pause after each operation, in milliseconds")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .help("Print results as JSON")
                .global(true),
        )
        .arg(
            Arg::new("raw")
                .long("raw")
                .action(ArgAction::SetTrue)
                .conflicts_with("json")
                .help("Print bare values without decoration")
                .global(true),
        )
        .subcommands(store_commands())
}

/// Build the command used for REPL and pipe lines.
pub fn build_line_cli() -> Command {
    Command::new("serialstore")
        .no_binary_name(true)
        .subcommand_required(true)
        .disable_help_subcommand(true)
        .subcommands(store_commands())
}

fn key_arg() -> Arg {
    Arg::new("key").required(true).help("Key")
}

fn store_commands() -> Vec<Command> {
    vec![
        Command::new("get").about("Fetch the value at KEY").arg(key_arg()),
        Command::new("set")
            .about("Store VALUE at KEY (JSON, or a plain string)")
            .arg(key_arg())
            .arg(Arg::new("value").required(true).help("Value")),
        Command::new("has").about("Test whether KEY is present").arg(key_arg()),
        Command::new("del")
            .visible_alias("delete")
            .about("Remove KEY")
            .arg(key_arg()),
        Command::new("clear").about("Remove every entry"),
        Command::new("count").about("Count entries"),
        Command::new("keys").about("List keys in order"),
        Command::new("each").about("Print every entry in key order"),
        Command::new("info").about("Show store settings, connection state and counters"),
    ]
}
