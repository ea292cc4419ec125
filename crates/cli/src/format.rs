//! Output formatting for command results and errors.

use serde_json::json;
use serialstore::{Error, Value};

use crate::state::{CommandOutput, StoreInfo};

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Redis-style decorated output
    Human,
    /// One JSON document per result
    Json,
    /// Bare values, one per line
    Raw,
}

/// Render a command result.
pub fn format_output(output: &CommandOutput, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => to_json(output).to_string(),
        OutputMode::Raw => format_raw(output),
        OutputMode::Human => format_human(output),
    }
}

/// Render an error.
pub fn format_error(err: &Error, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => json!({ "error": err.to_string() }).to_string(),
        _ => format!("(error) {}", err),
    }
}

fn format_human(output: &CommandOutput) -> String {
    match output {
        CommandOutput::Ok => "OK".to_string(),
        CommandOutput::Value(None) => "(nil)".to_string(),
        CommandOutput::Value(Some(v)) => v.to_string(),
        CommandOutput::Bool(b) => format!("(integer) {}", u8::from(*b)),
        CommandOutput::Count(n) => format!("(integer) {}", n),
        CommandOutput::Keys(keys) if keys.is_empty() => "(empty list)".to_string(),
        CommandOutput::Keys(keys) => keys
            .iter()
            .enumerate()
            .map(|(i, k)| format!("{}) {:?}", i + 1, k))
            .collect::<Vec<_>>()
            .join("\n"),
        CommandOutput::Entries(entries) if entries.is_empty() => "(empty list)".to_string(),
        CommandOutput::Entries(entries) => entries
            .iter()
            .map(|(k, v)| format!("{:?} => {}", k, v))
            .collect::<Vec<_>>()
            .join("\n"),
        CommandOutput::Info(info) => format_info(info),
    }
}

fn format_raw(output: &CommandOutput) -> String {
    match output {
        CommandOutput::Ok => String::new(),
        CommandOutput::Value(None) => String::new(),
        CommandOutput::Value(Some(v)) => raw_value(v),
        CommandOutput::Bool(b) => b.to_string(),
        CommandOutput::Count(n) => n.to_string(),
        CommandOutput::Keys(keys) => keys.join("\n"),
        CommandOutput::Entries(entries) => entries
            .iter()
            .map(|(k, v)| format!("{}\t{}", k, raw_value(v)))
            .collect::<Vec<_>>()
            .join("\n"),
        CommandOutput::Info(info) => format_info(info),
    }
}

fn raw_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_json().to_string(),
    }
}

fn format_info(info: &StoreInfo) -> String {
    let m = &info.metrics;
    [
        format!("name: {}", info.config.name),
        format!("version: {}", info.config.version),
        format!("store: {}", info.config.store_name),
        format!("connection: {:?}", info.connection),
        format!("submitted: {}", m.submitted),
        format!("completed: {}", m.completed),
        format!("failed: {}", m.failed),
        format!("sessions_opened: {}", m.sessions_opened),
        format!("sessions_reused: {}", m.sessions_reused),
        format!("sessions_ended: {}", m.sessions_ended),
        format!("stale_sessions: {}", m.stale_sessions),
        format!("chain: {}", info.chain_failure.as_deref().unwrap_or("ok")),
    ]
    .join("\n")
}

fn to_json(output: &CommandOutput) -> serde_json::Value {
    match output {
        CommandOutput::Ok => json!("OK"),
        CommandOutput::Value(v) => v.as_ref().map_or(serde_json::Value::Null, Value::to_json),
        CommandOutput::Bool(b) => json!(b),
        CommandOutput::Count(n) => json!(n),
        CommandOutput::Keys(keys) => json!(keys),
        CommandOutput::Entries(entries) => serde_json::Value::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        ),
        CommandOutput::Info(info) => json!({
            "config": {
                "name": info.config.name,
                "version": info.config.version,
                "store_name": info.config.store_name,
                "settle_delay_ms": info.config.settle_delay_ms,
                "probe_before_reuse": info.config.probe_before_reuse,
            },
            "connection": format!("{:?}", info.connection),
            "metrics": {
                "submitted": info.metrics.submitted,
                "completed": info.metrics.completed,
                "failed": info.metrics.failed,
                "sessions_opened": info.metrics.sessions_opened,
                "sessions_reused": info.metrics.sessions_reused,
                "sessions_ended": info.metrics.sessions_ended,
                "stale_sessions": info.metrics.stale_sessions,
            },
            "chain_failure": info.chain_failure,
        }),
    }
}
