//! REPL and pipe modes.

use std::io::BufRead;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::commands::build_line_cli;
use crate::format::{format_error, format_output, OutputMode};
use crate::parse::{parse_line, CliAction, MetaCommand};
use crate::state::SessionState;

enum LineOutcome {
    Continue,
    Failed,
    Quit,
}

fn history_path() -> Option<std::path::PathBuf> {
    std::env::var_os("HOME").map(|home| std::path::PathBuf::from(home).join(".serialstore_history"))
}

/// Interactive prompt with history.
pub fn run_repl(state: &SessionState, mode: OutputMode) {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            eprintln!("(error) failed to start line editor: {}", e);
            return;
        }
    };
    let history = history_path();
    if let Some(path) = &history {
        let _ = editor.load_history(path);
    }

    loop {
        match editor.readline("serialstore> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line.as_str());
                if let LineOutcome::Quit = run_line(state, &line, mode) {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("(error) {}", e);
                break;
            }
        }
    }

    if let Some(path) = &history {
        let _ = editor.save_history(path);
    }
}

/// Read commands line by line from stdin. Returns the process exit code.
pub fn run_pipe(state: &SessionState, mode: OutputMode) -> i32 {
    let stdin = std::io::stdin();
    let mut exit_code = 0;

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                eprintln!("(error) {}", e);
                return 1;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match run_line(state, trimmed, mode) {
            LineOutcome::Continue => {}
            LineOutcome::Failed => exit_code = 1,
            LineOutcome::Quit => break,
        }
    }
    exit_code
}

fn run_line(state: &SessionState, line: &str, mode: OutputMode) -> LineOutcome {
    match parse_line(line) {
        Ok(CliAction::Execute(cmd)) => match state.execute(cmd) {
            Ok(output) => {
                let formatted = format_output(&output, mode);
                if !formatted.is_empty() {
                    println!("{}", formatted);
                }
                LineOutcome::Continue
            }
            Err(e) => {
                eprintln!("{}", format_error(&e, mode));
                LineOutcome::Failed
            }
        },
        Ok(CliAction::Meta(MetaCommand::Quit)) => LineOutcome::Quit,
        Ok(CliAction::Meta(MetaCommand::Help { command })) => {
            print_help(command.as_deref());
            LineOutcome::Continue
        }
        Err(e) => {
            eprintln!("(error) {}", e);
            LineOutcome::Failed
        }
    }
}

fn print_help(command: Option<&str>) {
    let mut cli = build_line_cli();
    let mut target = match command {
        Some(name) => match cli.find_subcommand_mut(name) {
            Some(sub) => sub.clone(),
            None => {
                eprintln!("(error) Unknown command: {}", name);
                return;
            }
        },
        None => cli,
    };
    println!("{}", target.render_help());
}
