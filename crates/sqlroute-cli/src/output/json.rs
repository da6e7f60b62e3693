//! JSON output formatting.

use anyhow::{Context, Result};
use serde::Serialize;

/// Pretty-printed JSON for any report.
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}
