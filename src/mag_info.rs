use crate::mag_utils::TableFormat;
use crate::options::{Binning, GenusAllowList, JoinOptions, QualityThresholds};
use crate::reader;
use crate::taxonomy::{self, Rank, GENUS_BUCKET_COLUMN};
use anyhow::{bail, Context};
use lazy_static::lazy_static;
use polars::{frame::DataFrame, lazy::prelude::*, prelude::*, series::Series};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::{debug, info, warn};

// each table gets a process-unique identifier
// which is the order in which it was created.
lazy_static! {
    static ref MAGTABLE_COUNTER: AtomicU32 = AtomicU32::new(0);
}

/// The column holding the bin (MAG) identifier.
pub const SAMPLE_NAME_COLUMN: &str = "sample_name";
/// The column holding the bin number within a sample or hive.
pub const BIN_NUMBER_COLUMN: &str = "bin_number";
/// The column recording whether a bin came from hive or sample binning.
pub const BINNING_COLUMN: &str = "binning";
/// The column holding the GTDB-Tk classification string.
pub const CLASSIFICATION_COLUMN: &str = "classification";

const GENUS_SORT_KEY: &str = "genus_sort_key-temp-nobody-will-use-this-name-right";

/// A table of metagenome-assembled genomes (bins) and their quality metrics.
///
/// The rows are held in a polars [DataFrame]; typical columns are the CheckM metrics
/// (`Completeness`, `Contamination`, `Genome size`), sample metadata (`country`, `hive`,
/// `season`, ...) and, once attached, the GTDB-Tk classification and the resolved ranks.
///
/// ### Fields
///
/// * `df`: The underlying [DataFrame].
/// * `signature`: A [`u64`] whose upper 32 bits number the tables in order of construction
///   and whose lower 32 bits count the mutating operations applied to this table.
#[derive(Clone)]
pub struct MagTable {
    /// The underlying Polars dataframe recording all bins
    pub df: DataFrame,
    /// The global (process-unique) signature of this table
    pub signature: u64,
}

impl MagTable {
    #[inline(always)]
    fn inc_signature(&mut self) {
        self.signature += 1;
    }
}

// IO
impl MagTable {
    /// Wraps `df` into a new [MagTable] with a fresh signature.
    pub fn new(df: DataFrame) -> MagTable {
        let gid = MAGTABLE_COUNTER.fetch_add(1, Ordering::SeqCst) as u64;
        if df.height() == 0 {
            warn!("The MAG table is empty.");
        }
        MagTable {
            df,
            signature: (gid << 32),
        }
    }

    /// Reads a [MagTable] from a delimited file with a header line.
    ///
    /// ### Example
    ///
    /// ```rust,no_run
    /// use magtax::mag_info::MagTable;
    /// use magtax::mag_utils::TableFormat;
    ///
    /// let hive = MagTable::from_path("hive_analysis/hive_table_filtered.tsv", TableFormat::TSV)?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn from_path<T: AsRef<Path>>(file_path: T, format: TableFormat) -> anyhow::Result<MagTable> {
        let df = reader::read_table(file_path, format, true)?;
        Ok(MagTable::new(df))
    }

    /// Writes the table with a header line to `file_path`.
    pub fn write<T: AsRef<Path>>(&self, file_path: T, format: TableFormat) -> anyhow::Result<()> {
        let mut df = self.df.clone();
        reader::write_table(&mut df, file_path, format)
    }

    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    pub fn df_mut(&mut self) -> &mut DataFrame {
        self.inc_signature();
        &mut self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn get_signature(&self) -> u64 {
        self.signature
    }

    /// Returns the column called `name`, or an error naming the missing column.
    pub fn column<T: AsRef<str>>(&self, name: T) -> anyhow::Result<&Series> {
        self.df
            .column(name.as_ref())
            .with_context(|| format!("The MAG table has no {:?} column.", name.as_ref()))
    }

    pub fn is_column<T: AsRef<str>>(&self, name: T) -> bool {
        self.df.get_column_names().contains(&name.as_ref())
    }

    /// Replaces or adds `column`.
    pub fn update_column(&mut self, column: Series) -> anyhow::Result<()> {
        if column.null_count() > 0 {
            warn!(
                "The provided Series object {:?} contains {} null values.",
                column.name(),
                column.null_count()
            );
        }
        let name = column.name().to_owned();
        self.df.with_column(column).with_context(|| {
            format!(
                "Could not update the MAG table with the provided Series object: {:?}",
                name
            )
        })?;
        self.inc_signature();
        Ok(())
    }

    /// Sorts the rows by the given columns.
    pub fn sort_by(
        &mut self,
        by: &[&str],
        descending: impl IntoVec<bool>,
        maintain_order: bool,
    ) -> anyhow::Result<()> {
        self.df = self.df.sort(by, descending, maintain_order)?;
        self.inc_signature();
        Ok(())
    }

    /// Keeps the rows whose value in column `by` is one of `values`. Non-string
    /// columns are compared through their string representation.
    ///
    /// ### Example
    ///
    /// ```rust,ignore
    /// let hive_bins = table.filter("binning", &["hive"])?;
    /// ```
    pub fn filter<T: AsRef<str>>(&self, by: T, values: &[T]) -> anyhow::Result<MagTable> {
        let by = by.as_ref();
        self.column(by)?;

        let df = self
            .df
            .clone()
            .lazy()
            .filter(col(by).cast(DataType::String).is_in(lit(Series::new(
                "values",
                values.iter().map(|s| s.as_ref()).collect::<Vec<&str>>(),
            ))))
            .collect()?;

        if df.height() == 0 {
            warn!("The filtered dataframe is empty.")
        }
        Ok(MagTable::new(df))
    }
}

// combining tables
impl MagTable {
    /// Makes `sample_name` unique across samples by appending the bin number
    /// (`A1` + `3` becomes `A1_3`), and records `binning` in a new column.
    ///
    /// ### Returns
    ///
    /// An error if either `sample_name` or `bin_number` is missing.
    pub fn label_bins(&mut self, binning: Binning) -> anyhow::Result<()> {
        self.column(SAMPLE_NAME_COLUMN)?;
        self.column(BIN_NUMBER_COLUMN)?;

        self.df = self
            .df
            .clone()
            .lazy()
            .with_columns([
                concat_str(
                    [
                        col(SAMPLE_NAME_COLUMN).cast(DataType::String),
                        lit("_"),
                        col(BIN_NUMBER_COLUMN).cast(DataType::String),
                    ],
                    "",
                    false,
                )
                .alias(SAMPLE_NAME_COLUMN),
                lit(binning.label()).alias(BINNING_COLUMN),
            ])
            .collect()?;
        self.inc_signature();
        Ok(())
    }

    /// Labels the bins of `hive` and `sample` with [MagTable::label_bins] and stacks
    /// them into one table, hive bins first.
    ///
    /// ### Returns
    ///
    /// The combined [MagTable], or an error if the two tables do not have the same columns.
    /// Numeric columns whose types were inferred differently (e.g. `0` and `0.4`) are
    /// cast to a common type first.
    pub fn combine(mut hive: MagTable, mut sample: MagTable) -> anyhow::Result<MagTable> {
        hive.label_bins(Binning::Hive)?;
        sample.label_bins(Binning::Sample)?;

        let mut df = hive.df;
        let mut sample_df = sample.df;
        align_numeric_dtypes(&mut df, &mut sample_df)?;
        df.vstack_mut(&sample_df)
            .context("The hive and sample tables have different columns and cannot be combined.")?;
        df.align_chunks();
        Ok(MagTable::new(df))
    }

    /// Inner-joins a classifier summary (e.g. `gtdbtk.bac120.summary.tsv`) onto the bins.
    ///
    /// ### Arguments
    ///
    /// * `classification`: The table holding one row per classified genome.
    /// * `options`: The key columns; `options.left_on` must exist in this table and
    ///    `options.right_on` in `classification`.
    ///
    /// ### Returns
    ///
    /// A new [MagTable] holding the bins that were classified. Bins without a
    /// classification are dropped, which is reported as a warning.
    pub fn join_classification(
        &self,
        classification: &MagTable,
        options: &JoinOptions,
    ) -> anyhow::Result<MagTable> {
        let left_on = options.left_on.as_str();
        let right_on = options.right_on.as_str();
        if !self.is_column(left_on) {
            bail!("The MAG table has no {:?} column to join on.", left_on)
        }
        if !classification.is_column(right_on) {
            bail!("The classification table has no {:?} column to join on.", right_on)
        }
        let (left_dtype, right_dtype) = (
            self.column(left_on)?.dtype().clone(),
            classification.column(right_on)?.dtype().clone(),
        );
        if left_dtype != right_dtype {
            bail!(
                "Cannot join {:?} ({}) with {:?} ({}); the key columns have different types.",
                left_on,
                left_dtype,
                right_on,
                right_dtype
            )
        }

        let df = self
            .df
            .clone()
            .lazy()
            .join(
                classification.df.clone().lazy(),
                [col(left_on)],
                [col(right_on)],
                JoinArgs::new(JoinType::Inner),
            )
            .collect()?;

        if df.height() < self.height() {
            warn!(
                "{} of {} bins have no match in the classification table and were dropped.",
                self.height() - df.height(),
                self.height()
            );
        }
        Ok(MagTable::new(df))
    }

    /// Resolves the `classification` column into the seven rank columns and the
    /// `genus_modified` bucket. See [taxonomy::add_taxonomy_columns].
    pub fn add_taxonomy(&mut self, allow_list: &GenusAllowList) -> anyhow::Result<()> {
        let df = std::mem::take(&mut self.df);
        self.df = taxonomy::add_taxonomy_columns(df, CLASSIFICATION_COLUMN, allow_list)?;
        self.inc_signature();
        Ok(())
    }
}

// filtering and transformation
impl MagTable {
    /// Keeps the bins that pass `thresholds`. Rows with a missing metric are dropped.
    pub fn filter_quality(&self, thresholds: &QualityThresholds) -> anyhow::Result<MagTable> {
        let completeness = thresholds.completeness_column.as_str();
        let contamination = thresholds.contamination_column.as_str();
        self.column(completeness)?;
        self.column(contamination)?;

        let df = self
            .df
            .clone()
            .lazy()
            .filter(
                col(completeness)
                    .cast(DataType::Float64)
                    .gt_eq(lit(thresholds.min_completeness))
                    .and(
                        col(contamination)
                            .cast(DataType::Float64)
                            .lt_eq(lit(thresholds.max_contamination)),
                    ),
            )
            .collect()?;

        if df.height() == 0 {
            warn!("No bins passed the quality thresholds.")
        } else {
            debug!("{} of {} bins passed the quality thresholds.", df.height(), self.height());
        }
        Ok(MagTable::new(df))
    }

    /// Replaces the numeric column `name` by its base-10 logarithm.
    pub fn log10_column<T: AsRef<str>>(&mut self, name: T) -> anyhow::Result<()> {
        let name = name.as_ref();
        let values = self.column(name)?.cast(&DataType::Float64)?;
        let non_positive = values.f64()?.lt_eq(0.0).sum().unwrap_or(0);
        if non_positive > 0 {
            warn!(
                "The column {:?} contains {} non-positive values; their logarithm is not finite.",
                name, non_positive
            );
        }

        self.df = self
            .df
            .clone()
            .lazy()
            .with_column(col(name).cast(DataType::Float64).log(10.0).alias(name))
            .collect()?;
        self.inc_signature();
        Ok(())
    }

    /// Computes the summary statistics of the numeric column `name`.
    pub fn describe<T: AsRef<str>>(&self, name: T) -> anyhow::Result<ColumnStatistics> {
        let name = name.as_ref();
        let values = self
            .column(name)?
            .cast(&DataType::Float64)
            .with_context(|| format!("The column {:?} is not numeric.", name))?;
        ColumnStatistics::from_series(&values)
    }

    /// Writes [MagTable::describe] of `name` as text to `file_path`.
    pub fn write_statistics<T: AsRef<str>, P: AsRef<Path>>(
        &self,
        name: T,
        file_path: P,
    ) -> anyhow::Result<()> {
        let stats = self.describe(name)?;
        let file_path = file_path.as_ref();
        fs::write(file_path, stats.to_string())
            .with_context(|| format!("Could not write the statistics to {:?}", file_path))?;
        info!("Saved the statistics of {:?} to {:?}", stats.name, file_path);
        Ok(())
    }

    /// Counts the bins of each genus.
    ///
    /// ### Returns
    ///
    /// A [DataFrame] with the columns `genus`, `family` (the first family seen for the genus)
    /// and `count`, sorted by decreasing count and then by genus.
    pub fn genus_histogram(&self) -> anyhow::Result<DataFrame> {
        let genus = Rank::Genus.column_name();
        let family = Rank::Family.column_name();
        self.column(genus)?;
        self.column(family)?;

        let df = self
            .df
            .clone()
            .lazy()
            .group_by([col(genus)])
            .agg([
                col(family).first(),
                col(genus).count().cast(DataType::UInt64).alias("count"),
            ])
            .collect()?;

        Ok(df.sort(["count", genus], vec![true, false], false)?)
    }

    /// Sorts the rows by the genus name in `genus_modified` (ignoring the `g__` tag),
    /// with the `other` bucket last.
    pub fn sort_by_genus_bucket(&mut self) -> anyhow::Result<()> {
        self.column(GENUS_BUCKET_COLUMN)?;
        let bucket = col(GENUS_BUCKET_COLUMN).cast(DataType::String);

        let df = self
            .df
            .clone()
            .lazy()
            .with_column(
                when(bucket.clone().str().starts_with(lit("g__")))
                    .then(bucket.str().strip_prefix(lit("g__")))
                    .otherwise(lit(Null {}).cast(DataType::String))
                    .alias(GENUS_SORT_KEY),
            )
            .collect()?;
        let df = df.sort_with_options(
            GENUS_SORT_KEY,
            SortOptions {
                descending: false,
                nulls_last: true,
                multithreaded: true,
                maintain_order: true,
            },
        )?;
        self.df = df.drop(GENUS_SORT_KEY)?;
        self.inc_signature();
        Ok(())
    }
}

/// Casts the numeric columns that `hive` and `sample` share but typed differently to a
/// common type: `Float64` if either side is a float, `Int64` otherwise.
fn align_numeric_dtypes(hive: &mut DataFrame, sample: &mut DataFrame) -> anyhow::Result<()> {
    let names: Vec<String> = hive
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();

    for name in names {
        let Ok(other) = sample.column(&name) else {
            continue;
        };
        let (left, right) = (hive.column(&name)?.dtype().clone(), other.dtype().clone());
        if left == right || !left.is_numeric() || !right.is_numeric() {
            continue;
        }

        let common = if left.is_float() || right.is_float() {
            DataType::Float64
        } else {
            DataType::Int64
        };
        debug!(
            "Casting {:?} ({} and {}) to {} before stacking.",
            name, left, right, common
        );
        let h = hive.column(&name)?.cast(&common)?;
        hive.with_column(h)?;
        let s = sample.column(&name)?.cast(&common)?;
        sample.with_column(s)?;
    }
    Ok(())
}

/// Summary statistics of a numeric column, in the layout of a pandas `describe()`.
///
/// `std` is the sample standard deviation; the quartiles use linear interpolation.
/// Statistics that are undefined for the number of values are `NaN`.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnStatistics {
    pub name: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnStatistics {
    /// Computes the statistics of the numeric `series`; null values are ignored.
    pub fn from_series(series: &Series) -> anyhow::Result<ColumnStatistics> {
        let values = series.cast(&DataType::Float64)?;
        let values = values.f64()?;
        let quartile = |q: f64| -> anyhow::Result<f64> {
            Ok(values
                .quantile(q, QuantileInterpolOptions::Linear)?
                .unwrap_or(f64::NAN))
        };

        Ok(ColumnStatistics {
            name: series.name().to_string(),
            count: values.len() - values.null_count(),
            mean: values.mean().unwrap_or(f64::NAN),
            std: values.std(1).unwrap_or(f64::NAN),
            min: values.min().unwrap_or(f64::NAN),
            q25: quartile(0.25)?,
            q50: quartile(0.5)?,
            q75: quartile(0.75)?,
            max: values.max().unwrap_or(f64::NAN),
        })
    }
}

impl std::fmt::Display for ColumnStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows = [
            ("count", self.count as f64),
            ("mean", self.mean),
            ("std", self.std),
            ("min", self.min),
            ("25%", self.q25),
            ("50%", self.q50),
            ("75%", self.q75),
            ("max", self.max),
        ];
        let formatted: Vec<String> = rows.iter().map(|(_, v)| format!("{:.6}", v)).collect();
        let width = formatted.iter().map(|s| s.len()).max().unwrap_or(0) + 4;

        for ((label, _), value) in rows.iter().zip(formatted.iter()) {
            writeln!(f, "{:<5}{:>width$}", label, value, width = width)?;
        }
        write!(f, "Name: {}, dtype: float64", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAY: bool = true;

    fn get_toy_bins() -> MagTable {
        let df = df!(
            "sample_name" => ["A1", "A1", "B2", "B2"],
            "bin_number" => [1i64, 2, 1, 2],
            "country" => ["BE", "BE", "NL", "NL"],
            "Completeness" => [97.5, 42.0, 55.0, 88.0],
            "Contamination" => [0.8, 1.0, 5.0, 7.5],
            "Genome size" => [1_000_000i64, 2_500_000, 10_000, 1_500_000],
        )
        .unwrap();
        MagTable::new(df)
    }

    fn get_toy_gtdbtk() -> MagTable {
        let df = df!(
            "user_genome" => ["A1_1", "A1_2", "B2_1", "A1_9"],
            "classification" => [
                "d__Bacteria;p__Pseudomonadota;c__Gammaproteobacteria;o__Enterobacterales;f__Orbaceae;g__Gilliamella;s__Gilliamella apicola",
                "d__Bacteria;p__Bacillota;c__Bacilli;o__Lactobacillales;f__Lactobacillaceae;g__Apilactobacillus;s__",
                "d__Bacteria;p__Bacillota;c__Bacilli;o__Lactobacillales;f__Lactobacillaceae;g__Lactobacillus;s__",
                "d__Bacteria",
            ],
        )
        .unwrap();
        MagTable::new(df)
    }

    #[test]
    fn test_signature() {
        let mut mt = get_toy_bins();
        let other = get_toy_bins();
        assert_ne!(mt.get_signature() >> 32, other.get_signature() >> 32);

        let sig = mt.get_signature();
        mt.log10_column("Genome size").unwrap();
        assert_eq!(mt.get_signature(), sig + 1);
    }

    #[test]
    fn test_label_and_combine() {
        let combined = MagTable::combine(get_toy_bins(), get_toy_bins()).unwrap();
        if SAY {
            println!("combined: {:?}", combined.df());
        }
        assert_eq!(combined.height(), 8);

        let names = combined.column("sample_name").unwrap().str().unwrap();
        assert_eq!(names.get(0), Some("A1_1"));
        assert_eq!(names.get(3), Some("B2_2"));

        let binning = combined.column("binning").unwrap().str().unwrap();
        assert_eq!(binning.get(0), Some("hive"));
        assert_eq!(binning.get(7), Some("sample"));

        let hive_only = combined.filter("binning", &["hive"]).unwrap();
        assert_eq!(hive_only.height(), 4);
    }

    #[test]
    fn test_combine_mismatched_columns() {
        let mut other = get_toy_bins();
        other
            .update_column(Series::new("season", &["spring", "spring", "autumn", "autumn"]))
            .unwrap();
        assert!(MagTable::combine(get_toy_bins(), other).is_err());
    }

    #[test]
    fn test_combine_integer_and_float_metrics() {
        let hive = get_toy_bins();
        let sample = df!(
            "sample_name" => ["C3"],
            "bin_number" => [1i64],
            "country" => ["DE"],
            "Completeness" => [100i64],
            "Contamination" => [0i64],
            "Genome size" => [1_800_000i64],
        )
        .unwrap();

        let combined = MagTable::combine(hive, MagTable::new(sample)).unwrap();
        assert_eq!(combined.height(), 5);
        let contamination = combined.column("Contamination").unwrap();
        assert_eq!(contamination.dtype(), &DataType::Float64);
        assert_eq!(contamination.f64().unwrap().get(4), Some(0.0));
        assert_eq!(
            combined.column("Genome size").unwrap().dtype(),
            &DataType::Int64
        );
    }

    #[test]
    fn test_filter_skips_null_values() {
        let df = df!(
            "sample_name" => ["A1", "B2", "C3"],
            "country" => [Some("BE"), None, Some("NL")],
        )
        .unwrap();
        let mt = MagTable::new(df);

        let be = mt.filter("country", &["BE"]).unwrap();
        assert_eq!(be.height(), 1);
        let both = mt.filter("country", &["BE", "NL"]).unwrap();
        assert_eq!(both.height(), 2);
        let none = mt.filter("country", &["FR"]).unwrap();
        assert_eq!(none.height(), 0);
    }

    #[test]
    fn test_label_bins_missing_column() {
        let mut mt = MagTable::new(df!("sample_name" => ["A1"]).unwrap());
        assert!(mt.label_bins(Binning::Hive).is_err());
    }

    #[test]
    fn test_join_and_taxonomy() {
        let mut bins = get_toy_bins();
        bins.label_bins(Binning::Hive).unwrap();

        let mut joined = bins
            .join_classification(&get_toy_gtdbtk(), &JoinOptions::default())
            .unwrap();
        assert_eq!(joined.height(), 3);

        joined.add_taxonomy(&GenusAllowList::default()).unwrap();
        if SAY {
            println!("joined: {:?}", joined.df());
        }

        joined.sort_by(&["sample_name"], false, false).unwrap();
        let bucket = joined.column("genus_modified").unwrap().str().unwrap();
        assert_eq!(bucket.get(0), Some("g__Gilliamella"));
        assert_eq!(bucket.get(1), Some("other"));
        assert_eq!(bucket.get(2), Some("g__Lactobacillus"));

        let species = joined.column("species").unwrap().str().unwrap();
        assert_eq!(species.get(0), Some("s__Gilliamella apicola"));
        assert_eq!(species.get(1), Some("s__"));

        let histogram = joined.genus_histogram().unwrap();
        assert_eq!(histogram.height(), 3);
        assert_eq!(
            histogram.get_column_names(),
            vec!["genus", "family", "count"]
        );

        joined.sort_by_genus_bucket().unwrap();
        let bucket = joined.column("genus_modified").unwrap().str().unwrap();
        assert_eq!(bucket.get(0), Some("g__Gilliamella"));
        assert_eq!(bucket.get(1), Some("g__Lactobacillus"));
        assert_eq!(bucket.get(2), Some("other"));
    }

    #[test]
    fn test_join_missing_key() {
        let bins = get_toy_bins();
        let options = JoinOptions::new("sample_name", "genome");
        assert!(bins.join_classification(&get_toy_gtdbtk(), &options).is_err());
    }

    #[test]
    fn test_filter_quality() {
        let mt = get_toy_bins();
        let filtered = mt.filter_quality(&QualityThresholds::default()).unwrap();
        // 42% complete and 7.5% contaminated bins are dropped, 5.0 is kept
        assert_eq!(filtered.height(), 2);

        let none = mt.filter_quality(&QualityThresholds::new(99.0, 0.0)).unwrap();
        assert_eq!(none.height(), 0);
    }

    #[test]
    fn test_log10_and_describe() {
        let mut mt = get_toy_bins();
        mt.log10_column("Genome size").unwrap();
        let gs = mt.column("Genome size").unwrap().f64().unwrap();
        assert!((gs.get(0).unwrap() - 6.0).abs() < 1e-12);
        assert!((gs.get(2).unwrap() - 4.0).abs() < 1e-12);

        let stats = mt.describe("Completeness").unwrap();
        assert_eq!(stats.count, 4);
        assert!((stats.mean - 70.625).abs() < 1e-12);
        assert_eq!(stats.min, 42.0);
        assert_eq!(stats.max, 97.5);
        assert!((stats.q50 - 71.5).abs() < 1e-12);

        let text = stats.to_string();
        if SAY {
            println!("{}", text);
        }
        assert!(text.starts_with("count"));
        assert!(text.ends_with("Name: Completeness, dtype: float64"));
    }

    #[test]
    fn test_describe_single_value() {
        let stats = ColumnStatistics::from_series(&Series::new("x", &[Some(3.0), None])).unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.mean, 3.0);
        assert!(stats.std.is_nan());
        assert_eq!(stats.q75, 3.0);
    }
}
