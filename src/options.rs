use lazy_static::lazy_static;
use std::collections::HashSet;
use tracing::warn;

lazy_static! {
    /// The honey bee gut genera that keep their own genus bucket by default.
    static ref BEE_GUT_GENERA: HashSet<String> = [
        "g__Lactobacillus",
        "g__Snodgrassella",
        "g__Bombilactobacillus",
        "g__Commensalibacter",
        "g__Bartonella",
        "g__Gilliamella",
        "g__Frischella",
        "g__Bifidobacterium",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// The set of genera that are kept as their own category when bucketing genera.
///
/// Membership is an exact, case-sensitive match against the *tagged* genus, i.e.
/// `g__Lactobacillus` rather than `Lactobacillus`.
///
/// # Default
///
/// The default list holds the eight core honey bee gut genera: `g__Lactobacillus`,
/// `g__Snodgrassella`, `g__Bombilactobacillus`, `g__Commensalibacter`, `g__Bartonella`,
/// `g__Gilliamella`, `g__Frischella` and `g__Bifidobacterium`.
///
/// # Examples
///
/// ```rust
/// use magtax::options::GenusAllowList;
///
/// let default_list = GenusAllowList::default();
/// assert!(default_list.contains("g__Gilliamella"));
///
/// let custom = GenusAllowList::new(["g__Apibacter"]);
/// assert!(!custom.contains("g__Gilliamella"));
/// ```
pub struct GenusAllowList {
    genera: HashSet<String>,
}

impl Default for GenusAllowList {
    fn default() -> GenusAllowList {
        GenusAllowList {
            genera: BEE_GUT_GENERA.clone(),
        }
    }
}

impl GenusAllowList {
    /// Builds an allow-list from tagged genus names.
    pub fn new<I, S>(genera: I) -> GenusAllowList
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let genera: HashSet<String> = genera
            .into_iter()
            .map(|g| g.as_ref().to_string())
            .collect();

        if let Some(untagged) = genera.iter().find(|g| !g.starts_with("g__")) {
            warn!("The genus {:?} in the allow-list has no `g__` tag; it will never match a resolved genus.", untagged);
        }

        GenusAllowList { genera }
    }

    pub fn contains<T: AsRef<str>>(&self, genus: T) -> bool {
        self.genera.contains(genus.as_ref())
    }

    pub fn len(&self) -> usize {
        self.genera.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genera.is_empty()
    }

    /// The genera in alphabetical order.
    pub fn sorted(&self) -> Vec<&str> {
        let mut genera: Vec<&str> = self.genera.iter().map(|s| s.as_str()).collect();
        genera.sort_unstable();
        genera
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Quality thresholds used to keep or drop bins based on their CheckM metrics.
///
/// # Fields
///
/// * `min_completeness`: Bins with a completeness below this value are dropped.
/// * `max_contamination`: Bins with a contamination above this value are dropped.
/// * `completeness_column`: The name of the completeness column.
/// * `contamination_column`: The name of the contamination column.
///
/// # Default
///
/// The usual medium-quality MAG cut-off: completeness >= 50 and contamination <= 5,
/// read from the `Completeness` and `Contamination` columns written by CheckM.
pub struct QualityThresholds {
    pub min_completeness: f64,
    pub max_contamination: f64,
    pub completeness_column: String,
    pub contamination_column: String,
}

impl Default for QualityThresholds {
    fn default() -> QualityThresholds {
        QualityThresholds {
            min_completeness: 50.0,
            max_contamination: 5.0,
            completeness_column: String::from("Completeness"),
            contamination_column: String::from("Contamination"),
        }
    }
}

impl QualityThresholds {
    /// Custom thresholds on the default CheckM column names.
    pub fn new(min_completeness: f64, max_contamination: f64) -> QualityThresholds {
        QualityThresholds {
            min_completeness,
            max_contamination,
            ..Default::default()
        }
    }

    /// Returns `true` if a bin with the given metrics passes both thresholds.
    pub fn passes(&self, completeness: f64, contamination: f64) -> bool {
        completeness >= self.min_completeness && contamination <= self.max_contamination
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// The key columns used to attach a classifier summary to a table of bins.
///
/// By default, the `sample_name` of the bin table is matched against the
/// `user_genome` column of a GTDB-Tk summary.
pub struct JoinOptions {
    pub left_on: String,
    pub right_on: String,
}

impl Default for JoinOptions {
    fn default() -> JoinOptions {
        JoinOptions {
            left_on: String::from("sample_name"),
            right_on: String::from("user_genome"),
        }
    }
}

impl JoinOptions {
    pub fn new<T: AsRef<str>>(left_on: T, right_on: T) -> JoinOptions {
        JoinOptions {
            left_on: left_on.as_ref().to_string(),
            right_on: right_on.as_ref().to_string(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Where the reads of a bin were assembled and binned from.
///
/// * `Hive`: reads pooled per hive.
/// * `Sample`: reads from a single sample.
pub enum Binning {
    Hive,
    Sample,
}

impl Binning {
    /// The label stored in the `binning` column.
    pub fn label(&self) -> &'static str {
        match self {
            Binning::Hive => "hive",
            Binning::Sample => "sample",
        }
    }

    /// The label stored in the `source` column of scaffold tables.
    pub fn source_label(&self) -> &'static str {
        match self {
            Binning::Hive => "Hive",
            Binning::Sample => "Sample",
        }
    }
}

impl std::fmt::Display for Binning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for Binning {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Binning> {
        let b = match s.to_lowercase().as_str() {
            "hive" => Binning::Hive,
            "sample" => Binning::Sample,
            _ => anyhow::bail!("Cannot parse {:?} as a binning type.", s),
        };
        Ok(b)
    }
}
