//! Distributions of assembled scaffold lengths.

use crate::options::Binning;
use crate::reader::lengths::LENGTH_COLUMN;
use anyhow::{bail, Context};
use polars::{lazy::prelude::*, prelude::*};
use tracing::warn;

pub const LOG10_LENGTH_COLUMN: &str = "log10_length";
pub const FREQUENCY_COLUMN: &str = "Frequency";
pub const SOURCE_COLUMN: &str = "source";

fn require_lengths(df: &DataFrame) -> anyhow::Result<()> {
    df.column(LENGTH_COLUMN)
        .with_context(|| format!("The table has no {:?} column.", LENGTH_COLUMN))?;
    Ok(())
}

/// Adds a `log10_length` column to a table of scaffold lengths.
///
/// ### Arguments
///
/// * `lengths`: A table with a `length` column, as returned by [crate::reader::read_lengths].
/// * `decimals`: If set, the logarithm is rounded to this many decimal places.
pub fn log10_lengths(lengths: &DataFrame, decimals: Option<u32>) -> anyhow::Result<DataFrame> {
    require_lengths(lengths)?;
    let zero_lengths = lengths
        .column(LENGTH_COLUMN)?
        .cast(&DataType::Float64)?
        .f64()?
        .equal(0.0)
        .any();
    if zero_lengths {
        warn!("Some scaffolds have length 0; their logarithm is not finite.");
    }

    let mut logged = col(LENGTH_COLUMN).cast(DataType::Float64).log(10.0);
    if let Some(d) = decimals {
        logged = logged.round(d);
    }

    Ok(lengths
        .clone()
        .lazy()
        .with_column(logged.alias(LOG10_LENGTH_COLUMN))
        .collect()?)
}

/// Adds a `Frequency` column holding the base-10 logarithm of the number of scaffolds
/// sharing the length of each row. Rows without a length get a null frequency.
pub fn length_frequencies(lengths: &DataFrame) -> anyhow::Result<DataFrame> {
    require_lengths(lengths)?;
    let length = col(LENGTH_COLUMN);

    Ok(lengths
        .clone()
        .lazy()
        .with_column(
            when(length.clone().is_null())
                .then(lit(Null {}).cast(DataType::Float64))
                .otherwise(
                    length
                        .clone()
                        .count()
                        .over([length])
                        .cast(DataType::Float64)
                        .log(10.0),
                )
                .alias(FREQUENCY_COLUMN),
        )
        .collect()?)
}

/// Stacks the log-transformed lengths of the hive and sample assemblies, labelling each
/// row with its origin (`Hive` or `Sample`) in a `source` column.
pub fn combine_sources(hive: &DataFrame, sample: &DataFrame) -> anyhow::Result<DataFrame> {
    if hive.get_column_names() != sample.get_column_names() {
        bail!(
            "Cannot combine lengths with different columns: {:?} and {:?}",
            hive.get_column_names(),
            sample.get_column_names()
        )
    }

    let mut labelled = Vec::with_capacity(2);
    for (df, binning) in [(hive, Binning::Hive), (sample, Binning::Sample)] {
        let df = df
            .clone()
            .lazy()
            .with_column(lit(binning.source_label()).alias(SOURCE_COLUMN))
            .collect()?;
        labelled.push(df);
    }

    let mut combined = labelled.remove(0);
    combined.vstack_mut(&labelled[0])?;
    combined.align_chunks();
    Ok(combined)
}
