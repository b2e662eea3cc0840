use crate::options::GenusAllowList;
use anyhow::Context;
use polars::prelude::*;
use tracing::{debug, warn};

/// The value given to a rank that has neither an explicit segment
/// nor a known ancestor.
pub const UNCLASSIFIED: &str = "Unclassified";

/// The genus bucket of every genus that is not in the allow-list.
pub const OTHER_GENUS: &str = "other";

/// The name of the column holding the [`GenusBucket`] of each row.
pub const GENUS_BUCKET_COLUMN: &str = "genus_modified";

/// The segment separator of a GTDB-style classification string.
pub const SEGMENT_SEPARATOR: char = ';';

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// One level of the taxonomic hierarchy.
///
/// The variants are declared from the most general to the most specific rank,
/// so the derived ordering is the order in which ranks are back-filled.
///
/// # Examples
///
/// ```rust
/// use magtax::taxonomy::Rank;
///
/// assert_eq!(Rank::Genus.prefix(), "g__");
/// assert_eq!(Rank::Genus.column_name(), "genus");
/// assert!(Rank::Domain < Rank::Species);
/// ```
pub enum Rank {
    Domain,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
}

/// The rank tags in matching order. A segment is assigned to the first
/// rank whose tag it starts with.
pub(crate) const RANK_PREFIXES: [(&str, Rank); 7] = [
    ("d__", Rank::Domain),
    ("p__", Rank::Phylum),
    ("c__", Rank::Class),
    ("o__", Rank::Order),
    ("f__", Rank::Family),
    ("g__", Rank::Genus),
    ("s__", Rank::Species),
];

impl Rank {
    /// All ranks, from domain to species.
    pub const ALL: [Rank; 7] = [
        Rank::Domain,
        Rank::Phylum,
        Rank::Class,
        Rank::Order,
        Rank::Family,
        Rank::Genus,
        Rank::Species,
    ];

    /// The position of the rank in [`Rank::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// The tag that marks a segment of this rank, e.g. `g__` for [`Rank::Genus`].
    pub fn prefix(&self) -> &'static str {
        RANK_PREFIXES[self.index()].0
    }

    /// The name of the output column that holds this rank.
    pub fn column_name(&self) -> &'static str {
        match self {
            Rank::Domain => "domain",
            Rank::Phylum => "phylum",
            Rank::Class => "class",
            Rank::Order => "order",
            Rank::Family => "family",
            Rank::Genus => "genus",
            Rank::Species => "species",
        }
    }

    /// Returns the rank whose tag `segment` starts with, if any.
    /// Tags are compared case-sensitively and in rank order.
    pub fn of_segment(segment: &str) -> Option<Rank> {
        RANK_PREFIXES
            .iter()
            .find(|(prefix, _)| segment.starts_with(prefix))
            .map(|(_, rank)| *rank)
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.column_name())
    }
}

impl std::str::FromStr for Rank {
    type Err = anyhow::Error;

    /// Parses a rank from its column name (`"genus"`) or its tag (`"g__"`).
    /// Both are matched exactly, like the tags of a classification string.
    fn from_str(s: &str) -> anyhow::Result<Rank> {
        match Rank::ALL
            .iter()
            .find(|r| r.column_name() == s || r.prefix() == s)
        {
            Some(r) => Ok(*r),
            None => anyhow::bail!("Cannot parse {:?} as a taxonomic rank.", s),
        }
    }
}

/// The seven resolved ranks of a single classification string.
///
/// Every field holds either the full tagged segment of that rank (e.g. `g__Gilliamella`,
/// or `s__` if the tag was present without a value), the tagged segment of the nearest
/// explicit ancestor, or [`UNCLASSIFIED`] if no ancestor was known.
///
/// A [`RankRecord`] is only created through [`resolve`] or [`RankRecord::from_classification`]
/// and is immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RankRecord {
    ranks: [String; 7],
}

impl RankRecord {
    /// Parses and back-fills `classification`.
    ///
    /// ### Arguments
    ///
    /// * `classification`: a semicolon separated classification string. Segments are not
    ///    trimmed, and segments without a known rank tag are ignored. If a rank occurs more
    ///    than once, the last segment wins.
    ///
    /// ### Returns
    ///
    /// The back-filled [`RankRecord`]. This never fails: an empty or malformed string
    /// resolves to [`UNCLASSIFIED`] in every field.
    ///
    /// ### Example
    ///
    /// ```rust
    /// use magtax::taxonomy::{RankRecord, UNCLASSIFIED};
    ///
    /// let record = RankRecord::from_classification("d__Bacteria;p__Firmicutes;g__Lactobacillus");
    /// assert_eq!(record.order(), "p__Firmicutes");
    /// assert_eq!(record.genus(), "g__Lactobacillus");
    /// assert_eq!(record.species(), "g__Lactobacillus");
    ///
    /// let empty = RankRecord::from_classification("");
    /// assert!(empty.iter().all(|v| v == UNCLASSIFIED));
    /// ```
    pub fn from_classification(classification: &str) -> RankRecord {
        let mut explicit: [Option<&str>; 7] = [None; 7];
        for segment in classification.split(SEGMENT_SEPARATOR) {
            if let Some(rank) = Rank::of_segment(segment) {
                explicit[rank.index()] = Some(segment);
            }
        }

        // fill every gap with the closest known ancestor
        let mut last_known = UNCLASSIFIED;
        let ranks = explicit.map(|field| {
            if let Some(segment) = field {
                last_known = segment;
            }
            last_known.to_string()
        });

        RankRecord { ranks }
    }

    /// The resolved value at `rank`.
    pub fn get(&self, rank: Rank) -> &str {
        &self.ranks[rank.index()]
    }

    pub fn domain(&self) -> &str {
        self.get(Rank::Domain)
    }

    pub fn phylum(&self) -> &str {
        self.get(Rank::Phylum)
    }

    pub fn class(&self) -> &str {
        self.get(Rank::Class)
    }

    pub fn order(&self) -> &str {
        self.get(Rank::Order)
    }

    pub fn family(&self) -> &str {
        self.get(Rank::Family)
    }

    pub fn genus(&self) -> &str {
        self.get(Rank::Genus)
    }

    pub fn species(&self) -> &str {
        self.get(Rank::Species)
    }

    /// Iterates over the resolved values from domain to species.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ranks.iter().map(|s| s.as_str())
    }

    /// Iterates over `(rank, value)` pairs from domain to species.
    pub fn ranks(&self) -> impl Iterator<Item = (Rank, &str)> {
        Rank::ALL.into_iter().zip(self.iter())
    }

    /// Returns `true` if no rank could be resolved at all.
    pub fn is_unclassified(&self) -> bool {
        self.iter().all(|v| v == UNCLASSIFIED)
    }
}

/// The coarse genus category of a [`RankRecord`]: its genus if the genus is in the
/// allow-list, or [`OTHER_GENUS`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GenusBucket(String);

impl GenusBucket {
    /// Buckets the genus of `record` against `allow_list` (exact, case-sensitive match
    /// on the tagged form, e.g. `g__Lactobacillus`).
    pub fn from_record(record: &RankRecord, allow_list: &GenusAllowList) -> GenusBucket {
        if allow_list.contains(record.genus()) {
            GenusBucket(record.genus().to_string())
        } else {
            GenusBucket(OTHER_GENUS.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the genus was not in the allow-list.
    pub fn is_other(&self) -> bool {
        self.0 == OTHER_GENUS
    }
}

impl AsRef<str> for GenusBucket {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for GenusBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolves a classification string into its back-filled [`RankRecord`] and the
/// [`GenusBucket`] of the resolved genus.
///
/// This is a pure function of its inputs and is total over all strings.
///
/// ### Example
///
/// ```rust
/// use magtax::options::GenusAllowList;
/// use magtax::taxonomy::resolve;
///
/// let allow_list = GenusAllowList::new(["g__Lactobacillus"]);
/// let (record, bucket) = resolve(
///     "d__Bacteria;p__Firmicutes;g__Lactobacillus;s__Lactobacillus_reuteri",
///     &allow_list,
/// );
/// assert_eq!(record.family(), "p__Firmicutes");
/// assert_eq!(bucket.as_str(), "g__Lactobacillus");
/// ```
pub fn resolve(classification: &str, allow_list: &GenusAllowList) -> (RankRecord, GenusBucket) {
    let record = RankRecord::from_classification(classification);
    let bucket = GenusBucket::from_record(&record, allow_list);
    (record, bucket)
}

/// Resolves every row of `classification_column` in `df` and appends the seven rank
/// columns followed by [`GENUS_BUCKET_COLUMN`].
///
/// ### Arguments
///
/// * `df`: The [DataFrame] to enrich. Its rows keep their order.
/// * `classification_column`: The name of the string column holding the classification.
///    Null cells are resolved as empty strings.
/// * `allow_list`: The genera that keep their own bucket.
///
/// ### Returns
///
/// The enriched [DataFrame], or an error if the column is missing or is not a string column.
/// Existing columns named like a rank are replaced.
pub fn add_taxonomy_columns(
    mut df: DataFrame,
    classification_column: &str,
    allow_list: &GenusAllowList,
) -> anyhow::Result<DataFrame> {
    let classification = df
        .column(classification_column)
        .with_context(|| {
            format!(
                "The dataframe has no {:?} column to resolve the taxonomy from.",
                classification_column
            )
        })?
        .str()
        .with_context(|| format!("The {:?} column is not a string column.", classification_column))?
        .clone();

    if classification.null_count() > 0 {
        warn!(
            "The {:?} column contains {} null values; they are treated as unclassified.",
            classification_column,
            classification.null_count()
        );
    }

    let mut rank_columns: Vec<Vec<String>> = vec![Vec::with_capacity(df.height()); Rank::ALL.len()];
    let mut buckets = Vec::with_capacity(df.height());

    for value in classification.into_iter() {
        let (record, bucket) = resolve(value.unwrap_or(""), allow_list);
        for (col_values, rank_value) in rank_columns.iter_mut().zip(record.iter()) {
            col_values.push(rank_value.to_string());
        }
        buckets.push(bucket.0);
    }

    // the eight output columns always end the frame, in rank order
    for name in Rank::ALL
        .iter()
        .map(|r| r.column_name())
        .chain(std::iter::once(GENUS_BUCKET_COLUMN))
    {
        if df.get_column_names().contains(&name) {
            debug!("Replacing the existing {:?} column.", name);
            df = df.drop(name)?;
        }
    }

    for (rank, values) in Rank::ALL.iter().zip(rank_columns) {
        df.with_column(Series::new(rank.column_name(), values))?;
    }
    df.with_column(Series::new(GENUS_BUCKET_COLUMN, buckets))?;

    Ok(df)
}
