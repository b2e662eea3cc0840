//! Tables of PADLOC defence-system hits.
//!
//! PADLOC reports one row per gene of a detected defence system, with the system
//! number, the sequence id (`<genome>_<contig>`) and the system name. The functions
//! here attach taxonomy to those rows and summarise them per genome, species, genus
//! or MAG.

use crate::mag_info::SAMPLE_NAME_COLUMN;
use crate::mag_utils::{join_sorted, TableFormat};
use crate::reader;
use crate::taxonomy::{Rank, GENUS_BUCKET_COLUMN};
use anyhow::{bail, Context};
use polars::{frame::DataFrame, lazy::prelude::*, prelude::*, series::Series};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

pub const GENOME_COLUMN: &str = "genome";
pub const SEQID_COLUMN: &str = "seqid";
pub const SYSTEM_COLUMN: &str = "system";
pub const SYSTEM_NUMBER_COLUMN: &str = "system.number";
pub const COUNT_COLUMN: &str = "count";

/// The separator used when several systems, genomes or species are reported in one cell.
pub const LIST_SEPARATOR: &str = ", ";

/// The per-bin columns carried over by [systems_per_sample], when present.
const SAMPLE_METADATA_COLUMNS: [&str; 6] = [
    "bin_number",
    "country",
    "hive",
    "Completeness",
    "Contamination",
    "Genome size",
];

/// The genus and species of isolate genomes, keyed by genome identifier.
#[derive(Clone, Debug, Default)]
pub struct GenomeTaxonomy {
    taxa: HashMap<String, (String, String)>,
}

impl GenomeTaxonomy {
    /// Reads a headerless, tab separated file of `genome <tab> species name` rows,
    /// e.g. `R0001	Lactobacillus kunkeei`. The genus is the first word of the species name.
    pub fn from_path<T: AsRef<Path>>(file_path: T) -> anyhow::Result<GenomeTaxonomy> {
        let file_path = file_path.as_ref();
        let df = reader::read_table(file_path, TableFormat::TSV, false)?;
        GenomeTaxonomy::from_df(&df)
            .with_context(|| format!("Could not build the genome taxonomy from {:?}", file_path))
    }

    /// Builds the taxonomy from the first two columns of `df`.
    pub fn from_df(df: &DataFrame) -> anyhow::Result<GenomeTaxonomy> {
        if df.width() < 2 {
            bail!("Expected at least two columns (genome, species), found {}.", df.width())
        }
        let genomes = df.get_columns()[0].cast(&DataType::String)?;
        let species = df.get_columns()[1].cast(&DataType::String)?;

        let mut taxa = HashMap::with_capacity(df.height());
        for (i, (g, s)) in genomes
            .str()?
            .into_iter()
            .zip(species.str()?.into_iter())
            .enumerate()
        {
            let (Some(g), Some(s)) = (g, s) else {
                bail!("Row {} has no genome or no species.", i + 1)
            };
            let Some(genus) = s.split_whitespace().next() else {
                bail!("The species of genome {:?} is empty.", g)
            };
            if taxa
                .insert(g.to_string(), (genus.to_string(), s.to_string()))
                .is_some()
            {
                warn!("Genome {:?} is listed more than once; keeping the last entry.", g);
            }
        }
        Ok(GenomeTaxonomy { taxa })
    }

    pub fn insert<T: AsRef<str>>(&mut self, genome: T, species: T) {
        let species = species.as_ref();
        let genus = species.split_whitespace().next().unwrap_or_default();
        self.taxa.insert(
            genome.as_ref().to_string(),
            (genus.to_string(), species.to_string()),
        );
    }

    pub fn genus<T: AsRef<str>>(&self, genome: T) -> Option<&str> {
        self.taxa.get(genome.as_ref()).map(|(g, _)| g.as_str())
    }

    pub fn species<T: AsRef<str>>(&self, genome: T) -> Option<&str> {
        self.taxa.get(genome.as_ref()).map(|(_, s)| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.taxa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taxa.is_empty()
    }
}

/// Prepends `genome`, `genus` and `species` columns to a PADLOC table.
///
/// The genome of a row is the part of its `seqid` before the first `_`.
///
/// ### Returns
///
/// The annotated [DataFrame], or an error if `seqid` is missing, a seqid has no `_`,
/// or a genome is not in `taxonomy`.
pub fn annotate_padloc(padloc: &DataFrame, taxonomy: &GenomeTaxonomy) -> anyhow::Result<DataFrame> {
    let seqids = padloc
        .column(SEQID_COLUMN)
        .context("The PADLOC table has no seqid column.")?
        .cast(&DataType::String)?;

    let mut genomes = Vec::with_capacity(padloc.height());
    let mut genera = Vec::with_capacity(padloc.height());
    let mut species = Vec::with_capacity(padloc.height());

    for seqid in seqids.str()?.into_iter() {
        let seqid = seqid.unwrap_or_default();
        let Some((genome, _)) = seqid.split_once('_') else {
            bail!("Cannot extract a genome from the seqid {:?}.", seqid)
        };
        let (Some(genus), Some(sp)) = (taxonomy.genus(genome), taxonomy.species(genome)) else {
            bail!("The genome {:?} has no taxonomy.", genome)
        };
        genomes.push(genome.to_string());
        genera.push(genus.to_string());
        species.push(sp.to_string());
    }

    let mut columns = vec![
        Series::new(GENOME_COLUMN, genomes),
        Series::new(Rank::Genus.column_name(), genera),
        Series::new(Rank::Species.column_name(), species),
    ];
    columns.extend(padloc.get_columns().iter().cloned());
    Ok(DataFrame::new(columns)?)
}

/// Inner-joins the PADLOC hits of MAGs with their bin table on the shared `key` column
/// (usually `sample_name`).
pub fn merge_with_taxonomy(
    padloc: &DataFrame,
    taxonomy: &DataFrame,
    key: &str,
) -> anyhow::Result<DataFrame> {
    for (df, which) in [(padloc, "PADLOC"), (taxonomy, "taxonomy")] {
        if !df.get_column_names().contains(&key) {
            bail!("The {} table has no {:?} column to merge on.", which, key)
        }
    }

    let merged = padloc
        .clone()
        .lazy()
        .join(
            taxonomy.clone().lazy(),
            [col(key)],
            [col(key)],
            JoinArgs::new(JoinType::Inner),
        )
        .collect()?;

    if merged.height() < padloc.height() {
        warn!(
            "{} of {} PADLOC rows have no matching {:?} and were dropped.",
            padloc.height() - merged.height(),
            padloc.height(),
            key
        );
    }
    Ok(merged)
}

/// Checks that every column of `names` is present in `df`.
fn require_columns(df: &DataFrame, names: &[&str]) -> anyhow::Result<()> {
    let present = df.get_column_names();
    let missing: Vec<&str> = names
        .iter()
        .filter(|n| !present.contains(n))
        .copied()
        .collect();
    if !missing.is_empty() {
        bail!("The table is missing the column(s) {:?}.", missing)
    }
    Ok(())
}

/// Replaces the list column `name` by one string per row, joining the list elements
/// with [LIST_SEPARATOR]. If `sort` is set the elements are sorted first, and if
/// `unique` is set repeated elements are kept once.
fn collapse_list_column(
    df: &mut DataFrame,
    name: &str,
    sort: bool,
    unique: bool,
) -> anyhow::Result<()> {
    let mut joined: Vec<Option<String>> = Vec::with_capacity(df.height());
    for values in df.column(name)?.list()?.into_iter() {
        let Some(values) = values else {
            joined.push(None);
            continue;
        };
        let values = values.cast(&DataType::String)?;
        let values: Vec<&str> = values.str()?.into_iter().flatten().collect();
        let s = if sort {
            join_sorted(&values, LIST_SEPARATOR, unique)
        } else {
            values.join(LIST_SEPARATOR)
        };
        joined.push(Some(s));
    }
    df.with_column(Series::new(name, joined))?;
    Ok(())
}

/// Counts the rows of each group, sorted by the group keys.
fn group_count(df: &DataFrame, keys: &[&str]) -> anyhow::Result<DataFrame> {
    require_columns(df, keys)?;
    let counts = df
        .clone()
        .lazy()
        .group_by_stable(keys.iter().map(|k| col(k)).collect::<Vec<Expr>>())
        .agg([col(keys[0]).count().cast(DataType::Int64).alias(COUNT_COLUMN)])
        .collect()?;
    Ok(counts.sort(keys, false, false)?)
}

/// Counts how often each system occurs in each genome.
///
/// ### Returns
///
/// One row per `genome, system, system.number, genus, species` with its row count in
/// `count`, sorted by those columns.
pub fn count_systems(padloc: &DataFrame) -> anyhow::Result<DataFrame> {
    group_count(
        padloc,
        &[
            GENOME_COLUMN,
            SYSTEM_COLUMN,
            SYSTEM_NUMBER_COLUMN,
            Rank::Genus.column_name(),
            Rank::Species.column_name(),
        ],
    )
}

/// Counts how often each system occurs in each genus.
pub fn system_genus_counts(padloc: &DataFrame) -> anyhow::Result<DataFrame> {
    group_count(padloc, &[Rank::Genus.column_name(), SYSTEM_COLUMN])
}

/// Summarises a [count_systems] table per genome.
///
/// ### Returns
///
/// One row per `genome, genus, species` with
/// * `number_of_systems`: the summed counts,
/// * `defence_systems`: all systems, sorted and joined with `, `,
/// * `defence_systems_unique`: the distinct systems, sorted and joined with `, `.
pub fn systems_per_genome(counts: &DataFrame) -> anyhow::Result<DataFrame> {
    let keys = [
        GENOME_COLUMN,
        Rank::Genus.column_name(),
        Rank::Species.column_name(),
    ];
    require_columns(counts, &[SYSTEM_COLUMN, COUNT_COLUMN])?;
    require_columns(counts, &keys)?;

    let mut df = counts
        .clone()
        .lazy()
        .group_by_stable(keys.iter().map(|k| col(k)).collect::<Vec<Expr>>())
        .agg([
            col(COUNT_COLUMN).sum().alias("number_of_systems"),
            col(SYSTEM_COLUMN).alias("defence_systems"),
            col(SYSTEM_COLUMN).alias("defence_systems_unique"),
        ])
        .collect()?;

    collapse_list_column(&mut df, "defence_systems", true, false)?;
    collapse_list_column(&mut df, "defence_systems_unique", true, true)?;
    Ok(df.sort(keys, false, false)?)
}

/// Summarises a [count_systems] table per system and species.
///
/// ### Returns
///
/// One row per `system, genus, species` with the summed `count` and the distinct
/// `genomes` carrying the system.
pub fn systems_per_species(counts: &DataFrame) -> anyhow::Result<DataFrame> {
    let keys = [
        SYSTEM_COLUMN,
        Rank::Genus.column_name(),
        Rank::Species.column_name(),
    ];
    require_columns(counts, &[GENOME_COLUMN, COUNT_COLUMN])?;
    require_columns(counts, &keys)?;

    let mut df = counts
        .clone()
        .lazy()
        .group_by_stable(keys.iter().map(|k| col(k)).collect::<Vec<Expr>>())
        .agg([
            col(COUNT_COLUMN).sum().alias(COUNT_COLUMN),
            col(GENOME_COLUMN).alias("genomes"),
        ])
        .collect()?;

    collapse_list_column(&mut df, "genomes", true, true)?;
    Ok(df.sort(keys, false, false)?)
}

/// Summarises a [count_systems] table per system and genus.
///
/// ### Returns
///
/// One row per `system, genus` with the summed `count`, and the distinct `species`
/// and `genomes` carrying the system.
pub fn systems_per_genus(counts: &DataFrame) -> anyhow::Result<DataFrame> {
    let keys = [SYSTEM_COLUMN, Rank::Genus.column_name()];
    let species = Rank::Species.column_name();
    require_columns(counts, &[GENOME_COLUMN, COUNT_COLUMN, species])?;
    require_columns(counts, &keys)?;

    let mut df = counts
        .clone()
        .lazy()
        .group_by_stable(keys.iter().map(|k| col(k)).collect::<Vec<Expr>>())
        .agg([
            col(COUNT_COLUMN).sum().alias(COUNT_COLUMN),
            col(species).alias(species),
            col(GENOME_COLUMN).alias("genomes"),
        ])
        .collect()?;

    collapse_list_column(&mut df, species, true, true)?;
    collapse_list_column(&mut df, "genomes", true, true)?;
    Ok(df.sort(keys, false, false)?)
}

/// Summarises the PADLOC hits of MAGs (after [merge_with_taxonomy]) per bin.
///
/// ### Returns
///
/// One row per `sample_name` holding the first value of each bin metadata column that
/// is present (`bin_number`, `country`, `hive`, `Completeness`, `Contamination`,
/// `Genome size` written as `Genome_size`, the seven ranks and `genus_modified`), and
/// * `number_of_systems`: the number of distinct systems,
/// * `defence_systems`: all systems in input order, joined with `, `,
/// * `defence_systems_unique`: the distinct systems, sorted and joined with `, `.
pub fn systems_per_sample(merged: &DataFrame) -> anyhow::Result<DataFrame> {
    require_columns(merged, &[SAMPLE_NAME_COLUMN, SYSTEM_COLUMN])?;
    let present = merged.get_column_names();

    let mut aggs: Vec<Expr> = Vec::new();
    let metadata = SAMPLE_METADATA_COLUMNS
        .iter()
        .copied()
        .chain(Rank::ALL.iter().map(|r| r.column_name()))
        .chain(std::iter::once(GENUS_BUCKET_COLUMN));
    for name in metadata {
        if present.contains(&name) {
            aggs.push(col(name).first().alias(&name.replace(' ', "_")));
        } else {
            debug!("The column {:?} is absent and is not summarised.", name);
        }
    }
    aggs.push(
        col(SYSTEM_COLUMN)
            .n_unique()
            .cast(DataType::Int64)
            .alias("number_of_systems"),
    );
    aggs.push(col(SYSTEM_COLUMN).alias("defence_systems"));
    aggs.push(col(SYSTEM_COLUMN).alias("defence_systems_unique"));

    let mut df = merged
        .clone()
        .lazy()
        .group_by_stable([col(SAMPLE_NAME_COLUMN)])
        .agg(aggs)
        .collect()?;

    collapse_list_column(&mut df, "defence_systems", false, false)?;
    collapse_list_column(&mut df, "defence_systems_unique", true, true)?;
    Ok(df.sort([SAMPLE_NAME_COLUMN], false, false)?)
}

/// Keeps the rows of a per-genus table (see [systems_per_genus]) whose system is among
/// the `n` systems with the largest total `count`, sorted by decreasing count.
pub fn top_systems(per_genus: &DataFrame, n: usize) -> anyhow::Result<DataFrame> {
    require_columns(per_genus, &[SYSTEM_COLUMN, COUNT_COLUMN])?;

    let totals = per_genus
        .clone()
        .lazy()
        .group_by([col(SYSTEM_COLUMN)])
        .agg([col(COUNT_COLUMN).sum().alias("total")])
        .collect()?
        .sort(["total", SYSTEM_COLUMN], vec![true, false], false)?
        .head(Some(n));
    let top = totals.column(SYSTEM_COLUMN)?.clone();

    let df = per_genus
        .clone()
        .lazy()
        .filter(col(SYSTEM_COLUMN).is_in(lit(top)))
        .collect()?;
    Ok(df.sort([COUNT_COLUMN, SYSTEM_COLUMN], vec![true, false], false)?)
}
