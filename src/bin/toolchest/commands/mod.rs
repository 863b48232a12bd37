//! Command implementations.

pub mod add;
pub mod check;
pub mod clone;
pub mod detect;
pub mod languages;
pub mod list;
pub mod remove;
pub mod rename;

use anyhow::{Context, Result};
use serde::Serialize;

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
