//! Loading backend JSON snapshots from disk.
//!
//! The CLI works on responses saved from the dashboard API. Payload shape
//! errors are reported; individual malformed entries are skipped with a
//! warning so one bad record never hides the rest.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;

use crate::error::DeskError;
use crate::models::{Order, Position, StopLossRecord, StopLossResponse};
use crate::Result;

/// Pending orders: a JSON array of orders
pub fn load_orders(path: &Path) -> Result<Vec<Order>> {
    let value = read_json(path)?;
    parse_list(value, path)
}

/// Adaptive stop-loss state: the `{ exists, records }` wrapper, or a bare array
pub fn load_stop_loss(path: &Path) -> Result<Vec<StopLossRecord>> {
    let value = read_json(path)?;

    match value {
        Value::Array(_) => parse_list(value, path),
        Value::Object(_) => {
            let response: StopLossResponse = serde_json::from_value(value)?;
            Ok(response.into_records())
        }
        other => Err(invalid(path, format!("expected object or array, got {}", kind(&other)))),
    }
}

/// Positions: a JSON array
pub fn load_positions(path: &Path) -> Result<Vec<Position>> {
    let value = read_json(path)?;
    parse_list(value, path)
}

fn read_json(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)?;
    let value = serde_json::from_str(&raw)?;
    Ok(value)
}

fn parse_list<T: DeserializeOwned>(value: Value, path: &Path) -> Result<Vec<T>> {
    let items = match value {
        Value::Array(items) => items,
        other => return Err(invalid(path, format!("expected array, got {}", kind(&other)))),
    };

    let total = items.len();
    let parsed: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| match serde_json::from_value(item) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(path = %path.display(), index = i, error = %e, "Skipping malformed entry");
                None
            }
        })
        .collect();

    tracing::debug!(path = %path.display(), total, parsed = parsed.len(), "Loaded snapshot");
    Ok(parsed)
}

fn invalid(path: &Path, reason: String) -> DeskError {
    DeskError::InvalidSnapshot {
        path: path.display().to_string(),
        reason,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
