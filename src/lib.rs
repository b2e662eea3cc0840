//! magtax is a small library for assembling the analysis tables of a honey bee gut
//! metagenomics study in [Rust](https://www.rust-lang.org/). It combines the CheckM quality
//! metrics of metagenome-assembled genomes (MAGs) with their
//! [GTDB-Tk](https://github.com/Ecogenomics/GTDBTk) classification, resolves every lineage
//! into seven fixed ranks, and summarises PADLOC defence-system hits and scaffold length
//! distributions. It also tidies the ATLAS sample sheet. All tables are held in
//! [Polars](https://pola.rs/) data frames.
//!
//! The core of the crate is the [taxonomy] module, which turns a semicolon separated
//! classification string such as `d__Bacteria;p__Proteobacteria;...;g__Gilliamella` into a
//! [RankRecord] with no gaps and a [GenusBucket] that keeps the genera of interest and
//! folds everything else into `other`.

pub mod atlas;
pub mod mag_info;
pub mod mag_utils;
pub mod options;
pub mod padloc;
pub mod reader;
pub mod scaffolds;
pub mod taxonomy;
pub use mag_info::{ColumnStatistics, MagTable};
pub use options::{Binning, GenusAllowList, JoinOptions, QualityThresholds};
pub use padloc::GenomeTaxonomy;
pub use taxonomy::{resolve, GenusBucket, Rank, RankRecord};
