//! Editing of the ATLAS `samples.tsv` sample sheet.

use crate::mag_utils::TableFormat;
use crate::reader;
use anyhow::Context;
use polars::prelude::*;
use std::path::Path;
use tracing::debug;

pub const READS_R1_COLUMN: &str = "Reads_raw_R1";
pub const READS_R2_COLUMN: &str = "Reads_raw_R2";
pub const SAMPLE_COLUMN: &str = "Sample";
pub const BIN_GROUP_COLUMN: &str = "BinGroup";

/// Columns holding a leftover row index of an earlier export.
const INDEX_COLUMNS: [&str; 2] = ["Unnamed: 0", ""];

/// The name of the directory holding `path`, e.g. `A1_S1` for `reads/A1_S1/R1.fastq.gz`.
/// A path without a directory gives an empty name.
fn parent_dir_name(path: &str) -> &str {
    Path::new(path)
        .parent()
        .and_then(|d| d.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or_default()
}

/// The [parent_dir_name] of every path in `column`, passed through `edit`.
fn parent_dir_names<F>(df: &DataFrame, column: &str, edit: F) -> anyhow::Result<Series>
where
    F: Fn(&str) -> String,
{
    let paths = df
        .column(column)
        .with_context(|| format!("The sample sheet has no {:?} column.", column))?
        .cast(&DataType::String)?;
    let names: StringChunked = paths
        .str()?
        .into_iter()
        .map(|p| p.map(|p| edit(parent_dir_name(p))))
        .collect();
    Ok(names.into_series().with_name(column))
}

/// Rewrites an ATLAS sample sheet so that samples are named after their read directories.
///
/// * `Sample` is the name of the directory holding the `Reads_raw_R1` file with every `_`
///   removed, and becomes the first column.
/// * `BinGroup` is the first two `_` separated parts of the directory holding the
///   `Reads_raw_R2` file, and is appended last.
/// * A leftover index column (`Unnamed: 0` or an unnamed one) is dropped.
///
/// ### Returns
///
/// The edited [DataFrame], or an error if one of the read columns is missing.
///
/// ### Example
///
/// ```rust
/// use magtax::atlas::edit_sample_sheet;
/// use polars::prelude::*;
///
/// let sheet = df!(
///     "Reads_raw_R1" => ["reads/A1_S1/A1_S1_R1.fastq.gz"],
///     "Reads_raw_R2" => ["reads/A1_S1_L001/A1_S1_R2.fastq.gz"],
/// )?;
/// let edited = edit_sample_sheet(&sheet)?;
/// assert_eq!(edited.column("Sample")?.str()?.get(0), Some("A1S1"));
/// assert_eq!(edited.column("BinGroup")?.str()?.get(0), Some("A1_S1"));
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn edit_sample_sheet(sheet: &DataFrame) -> anyhow::Result<DataFrame> {
    let samples = parent_dir_names(sheet, READS_R1_COLUMN, |d| d.replace('_', ""))?;
    let bin_groups = parent_dir_names(sheet, READS_R2_COLUMN, |d| {
        d.split('_').take(2).collect::<Vec<&str>>().join("_")
    })?;

    let mut df = sheet.clone();
    for name in INDEX_COLUMNS
        .iter()
        .chain([SAMPLE_COLUMN, BIN_GROUP_COLUMN].iter())
    {
        if df.get_column_names().contains(name) {
            debug!("Dropping the existing {:?} column.", name);
            df = df.drop(name)?;
        }
    }

    let mut columns = vec![samples.with_name(SAMPLE_COLUMN)];
    columns.extend(df.get_columns().iter().cloned());
    columns.push(bin_groups.with_name(BIN_GROUP_COLUMN));
    Ok(DataFrame::new(columns)?)
}

/// Reads the tab separated sample sheet at `input`, edits it with [edit_sample_sheet]
/// and writes the result to `output`.
pub fn edit_sample_sheet_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
) -> anyhow::Result<DataFrame> {
    let sheet = reader::read_table(input, TableFormat::TSV, true)?;
    let mut edited = edit_sample_sheet(&sheet)?;
    reader::write_table(&mut edited, output, TableFormat::TSV)?;
    Ok(edited)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAY: bool = true;

    #[test]
    fn test_parent_dir_name() {
        assert_eq!(parent_dir_name("/data/reads/A1_S1/A1_S1_R1.fastq.gz"), "A1_S1");
        assert_eq!(parent_dir_name("A1_S1_R1.fastq.gz"), "");
    }

    #[test]
    fn test_edit_sample_sheet() {
        let sheet = df!(
            "Unnamed: 0" => [0i64, 1],
            "Reads_raw_R1" => [
                "/data/reads/Hive_01/Hive_01_R1.fastq.gz",
                "/data/reads/BE_S_2/BE_S_2_R1.fastq.gz",
            ],
            "Reads_raw_R2" => [
                "/data/reads/Hive_01/Hive_01_R2.fastq.gz",
                "/data/reads/BE_S_2_L001/BE_S_2_R2.fastq.gz",
            ],
            "Sample" => ["old_1", "old_2"],
        )
        .unwrap();

        let edited = edit_sample_sheet(&sheet).unwrap();
        if SAY {
            println!("edited: {:?}", edited);
        }
        assert_eq!(
            edited.get_column_names(),
            vec!["Sample", "Reads_raw_R1", "Reads_raw_R2", "BinGroup"]
        );
        let sample = edited.column("Sample").unwrap().str().unwrap();
        assert_eq!(sample.get(0), Some("Hive01"));
        assert_eq!(sample.get(1), Some("BES2"));
        let group = edited.column("BinGroup").unwrap().str().unwrap();
        assert_eq!(group.get(0), Some("Hive_01"));
        assert_eq!(group.get(1), Some("BE_S"));
    }

    #[test]
    fn test_edit_sample_sheet_missing_reads() {
        let sheet = df!("Reads_raw_R1" => ["reads/A1/A1_R1.fastq.gz"]).unwrap();
        assert!(edit_sample_sheet(&sheet).is_err());
    }
}
