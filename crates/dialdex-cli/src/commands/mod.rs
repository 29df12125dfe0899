use std::io::{self, Write};

use anyhow::Result;
use serde::Serialize;

pub mod completions;
pub mod export;

/// Writes the value as a single compact JSON line on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
