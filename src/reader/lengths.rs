use crate::mag_utils::read_all_bytes_from_path;
use anyhow::Context;
use polars::prelude::*;
use std::path::Path;
use tracing::warn;

/// The name of the column holding the scaffold lengths.
pub const LENGTH_COLUMN: &str = "length";

/// Reads a headerless file of scaffold lengths, one integer per line, into a
/// [DataFrame] with a single [`LENGTH_COLUMN`] column.
///
/// Blank lines are skipped. A line that is not a non-negative integer is an error
/// that reports its line number. The file may be gzip compressed.
pub fn read_lengths<T: AsRef<Path>>(file_path: T) -> anyhow::Result<DataFrame> {
    let file_path = file_path.as_ref();
    let bytes = read_all_bytes_from_path(file_path)
        .with_context(|| format!("Could not read the scaffold lengths {:?}", file_path))?;
    let text = String::from_utf8(bytes)
        .with_context(|| format!("The scaffold lengths {:?} are not valid UTF-8", file_path))?;
    parse_lengths(&text).with_context(|| format!("Could not parse {:?}", file_path))
}

/// Parses newline separated lengths. See [read_lengths].
pub fn parse_lengths(text: &str) -> anyhow::Result<DataFrame> {
    let mut lengths = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let l: u64 = line
            .parse()
            .with_context(|| format!("Line {} is not a scaffold length: {:?}", i + 1, line))?;
        lengths.push(l);
    }

    if lengths.is_empty() {
        warn!("No scaffold lengths were found.");
    }

    Ok(DataFrame::new(vec![Series::new(LENGTH_COLUMN, lengths)])?)
}
