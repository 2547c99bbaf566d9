pub mod scan;
pub mod validate;

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

/// Print `value` as JSON on stdout; logs go to stderr.
pub fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let serialized = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    let json = serialized.context("failed to serialize output")?;

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{json}").context("failed to write output")?;
    Ok(())
}
