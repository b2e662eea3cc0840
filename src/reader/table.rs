use crate::mag_utils::{read_all_bytes, TableFormat};
use anyhow::Context;
use polars::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Cursor, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// The number of rows polars looks at to infer the column types.
const INFER_SCHEMA_ROWS: usize = 10_000;

/// Reads a delimited table from `file_path` into a [DataFrame].
///
/// The file may be gzip compressed; this is detected from its content rather than
/// its name. Leading and trailing whitespace is removed from the column names, as
/// the CheckM and GTDB-Tk tables sometimes carry padded headers.
///
/// ### Arguments
///
/// * `file_path`: The path of the table.
/// * `format`: The [TableFormat] giving the field separator.
/// * `has_header`: Whether the first line holds the column names. Headerless tables get
///    polars' default names (`column_1`, `column_2`, ...).
///
/// ### Returns
///
/// The parsed [DataFrame], or an error naming the file if it could not be opened or parsed.
pub fn read_table<T: AsRef<Path>>(
    file_path: T,
    format: TableFormat,
    has_header: bool,
) -> anyhow::Result<DataFrame> {
    let file_path = file_path.as_ref();
    let file = File::open(file_path)
        .with_context(|| format!("Could not open the table {:?}", file_path))?;
    let df = read_table_from_reader(file, format, has_header)
        .with_context(|| format!("Could not parse the {} table {:?}", format, file_path))?;
    debug!(
        "Read {} rows and {} columns from {:?}",
        df.height(),
        df.width(),
        file_path
    );
    Ok(df)
}

/// Reads a delimited table from any reader. See [read_table].
pub fn read_table_from_reader(
    r: impl Read,
    format: TableFormat,
    has_header: bool,
) -> anyhow::Result<DataFrame> {
    let bytes = read_all_bytes(r)?;
    if bytes.is_empty() {
        warn!("The table is empty.");
        return Ok(DataFrame::default());
    }

    let mut df = CsvReader::new(Cursor::new(bytes))
        .has_header(has_header)
        .with_separator(format.separator())
        .infer_schema(Some(INFER_SCHEMA_ROWS))
        .finish()?;

    strip_column_names(&mut df)?;
    Ok(df)
}

/// Removes leading and trailing whitespace from every column name of `df`.
pub fn strip_column_names(df: &mut DataFrame) -> anyhow::Result<()> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.trim().to_string())
        .collect();

    if names
        .iter()
        .zip(df.get_column_names())
        .any(|(new, old)| new != old)
    {
        debug!("Stripping whitespace from the column names.");
        df.set_column_names(&names)?;
    }
    Ok(())
}

/// Writes `df` with a header line to `file_path` using the separator of `format`.
pub fn write_table<T: AsRef<Path>>(
    df: &mut DataFrame,
    file_path: T,
    format: TableFormat,
) -> anyhow::Result<()> {
    let file_path = file_path.as_ref();
    let file = File::create(file_path)
        .with_context(|| format!("Could not create the output file {:?}", file_path))?;
    let mut writer = BufWriter::new(file);

    CsvWriter::new(&mut writer)
        .include_header(true)
        .with_separator(format.separator())
        .finish(df)
        .with_context(|| format!("Could not write the table to {:?}", file_path))?;

    info!("Saved {} rows to {:?}", df.height(), file_path);
    Ok(())
}
