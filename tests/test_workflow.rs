use magtax::atlas;
use magtax::mag_utils::TableFormat;
use magtax::padloc::{self, GenomeTaxonomy};
use magtax::reader::{read_lengths, read_table};
use magtax::scaffolds;
use magtax::{GenusAllowList, JoinOptions, MagTable, QualityThresholds};
use polars::prelude::*;
use std::fs;
use tempfile::TempDir;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

const HIVE_CHECKM: &str = "sample_name\tbin_number\tCompleteness\tContamination\tGenome size\tcountry
H1\t1\t98.2\t0.4\t1850000\tBE
H1\t2\t40.0\t1.0\t900000\tBE
H2\t1\t88.0\t6.5\t2100000\tNL
";

const SAMPLE_CHECKM: &str = "sample_name\tbin_number\tCompleteness\tContamination\tGenome size\tcountry
S1\t1\t75.5\t2.0\t2400000\tBE
S1\t3\t99.0\t0.0\t1600000\tBE
";

const GTDBTK_SUMMARY: &str = "user_genome\tclassification
H1_1\td__Bacteria;p__Proteobacteria;c__Gammaproteobacteria;o__Enterobacterales;f__Orbaceae;g__Gilliamella;s__Gilliamella apicola
H1_2\td__Bacteria;p__Firmicutes;c__Bacilli;o__Lactobacillales;f__Lactobacillaceae;g__Lactobacillus;s__
H2_1\td__Bacteria;p__Actinobacteriota;c__Actinomycetia;o__Bifidobacteriales;f__Bifidobacteriaceae;g__Bifidobacterium
S1_1\td__Bacteria;p__Proteobacteria;c__Gammaproteobacteria;o__Enterobacterales;f__Enterobacteriaceae;g__Frischella
S1_3\tUnclassified Bacteria
";

#[test]
fn test_mag_workflow() -> anyhow::Result<()> {
    init_logging();
    let tmp = TempDir::new()?;
    let dir = tmp.path();
    let hive_path = dir.join("hive_checkm.tsv");
    let sample_path = dir.join("sample_checkm.tsv");
    let gtdb_path = dir.join("gtdbtk.bac120.summary.tsv");
    fs::write(&hive_path, HIVE_CHECKM)?;
    fs::write(&sample_path, SAMPLE_CHECKM)?;
    fs::write(&gtdb_path, GTDBTK_SUMMARY)?;

    let hive = MagTable::from_path(&hive_path, TableFormat::TSV)?;
    let sample = MagTable::from_path(&sample_path, TableFormat::TSV)?;
    let combined = MagTable::combine(hive, sample)?;
    assert_eq!(combined.height(), 5);

    let filtered = combined.filter_quality(&QualityThresholds::default())?;
    // H1_2 fails completeness and H2_1 fails contamination
    assert_eq!(filtered.height(), 3);

    let gtdb = MagTable::from_path(&gtdb_path, TableFormat::TSV)?;
    let mut classified = filtered.join_classification(&gtdb, &JoinOptions::default())?;
    classified.add_taxonomy(&GenusAllowList::default())?;
    classified.sort_by(&["sample_name"], false, false)?;

    let genus = classified.column("genus")?.str()?.clone();
    let bucket = classified.column("genus_modified")?.str()?.clone();
    let species = classified.column("species")?.str()?.clone();
    // H1_1, S1_1, S1_3
    assert_eq!(genus.get(0), Some("g__Gilliamella"));
    assert_eq!(bucket.get(0), Some("g__Gilliamella"));
    assert_eq!(species.get(0), Some("s__Gilliamella apicola"));
    assert_eq!(bucket.get(1), Some("g__Frischella"));
    assert_eq!(species.get(1), Some("g__Frischella"));
    assert_eq!(genus.get(2), Some("Unclassified"));
    assert_eq!(bucket.get(2), Some("other"));

    let histogram = classified.genus_histogram()?;
    assert_eq!(histogram.height(), 3);

    let out_path = dir.join("combined_table.tsv");
    classified.write(&out_path, TableFormat::TSV)?;
    let reread = read_table(&out_path, TableFormat::TSV, true)?;
    assert_eq!(reread.shape(), classified.df().shape());

    let stats_path = dir.join("genome_size_stats.txt");
    classified.write_statistics("Genome size", &stats_path)?;
    let stats = fs::read_to_string(&stats_path)?;
    assert!(stats.contains("count"));
    assert!(stats.ends_with("Name: Genome size, dtype: float64"));

    Ok(())
}

#[test]
fn test_padloc_workflow() -> anyhow::Result<()> {
    init_logging();
    let tmp = TempDir::new()?;
    let dir = tmp.path();
    let taxonomy_path = dir.join("isolates.tsv");
    let padloc_path = dir.join("all_padloc.csv");
    fs::write(
        &taxonomy_path,
        "R0001\tLactobacillus kunkeei\nR0002\tGilliamella apicola\n",
    )?;
    fs::write(
        &padloc_path,
        "system.number,seqid,system,target.name\n\
         1,R0001_c1,RM_type_II,MTase_II\n\
         1,R0001_c1,RM_type_II,REase_II\n\
         2,R0002_c7,AbiE,AbiEii\n\
         3,R0002_c7,RM_type_II,MTase_II\n",
    )?;

    let taxonomy = GenomeTaxonomy::from_path(&taxonomy_path)?;
    let hits = read_table(&padloc_path, TableFormat::from_path(&padloc_path), true)?;
    let annotated = padloc::annotate_padloc(&hits, &taxonomy)?;
    let counts = padloc::count_systems(&annotated)?;
    assert_eq!(counts.height(), 3);

    let per_genome = padloc::systems_per_genome(&counts)?;
    let systems = per_genome.column("defence_systems_unique")?.str()?.clone();
    assert_eq!(systems.get(0), Some("RM_type_II"));
    assert_eq!(systems.get(1), Some("AbiE, RM_type_II"));

    let per_genus = padloc::systems_per_genus(&counts)?;
    let top = padloc::top_systems(&per_genus, 1)?;
    assert_eq!(top.height(), 2);

    Ok(())
}

#[test]
fn test_scaffold_lengths() -> anyhow::Result<()> {
    init_logging();
    let tmp = TempDir::new()?;
    let dir = tmp.path();
    let hive_path = dir.join("hive_lengths.txt");
    let sample_path = dir.join("sample_lengths.txt");
    fs::write(&hive_path, "1000\n1000\n31623\n")?;
    fs::write(&sample_path, "100\n")?;

    let hive = scaffolds::log10_lengths(&read_lengths(&hive_path)?, Some(2))?;
    let sample = scaffolds::log10_lengths(&read_lengths(&sample_path)?, Some(2))?;
    let combined = scaffolds::combine_sources(&hive, &sample)?;
    assert_eq!(combined.height(), 4);
    let logged = combined.column("log10_length")?.f64()?.clone();
    assert_eq!(logged.get(2), Some(4.5));
    assert_eq!(logged.get(3), Some(2.0));

    let freqs = scaffolds::length_frequencies(&read_lengths(&hive_path)?)?;
    let freqs = freqs.column("Frequency")?.f64()?.clone();
    assert!((freqs.get(0).unwrap_or_default() - 2f64.log10()).abs() < 1e-12);

    Ok(())
}

#[test]
fn test_atlas_sample_sheet() -> anyhow::Result<()> {
    init_logging();
    let tmp = TempDir::new()?;
    let input = tmp.path().join("samples.tsv");
    let output = tmp.path().join("samples_edited.tsv");
    fs::write(
        &input,
        "Unnamed: 0\tReads_raw_R1\tReads_raw_R2\n\
         0\treads/Hive_01/Hive_01_R1.fastq.gz\treads/Hive_01_L1/Hive_01_R2.fastq.gz\n",
    )?;

    let edited = atlas::edit_sample_sheet_file(&input, &output)?;
    assert_eq!(edited.height(), 1);

    let written = read_table(&output, TableFormat::TSV, true)?;
    assert_eq!(
        written.get_column_names(),
        vec!["Sample", "Reads_raw_R1", "Reads_raw_R2", "BinGroup"]
    );
    assert_eq!(written.column("Sample")?.str()?.get(0), Some("Hive01"));
    assert_eq!(written.column("BinGroup")?.str()?.get(0), Some("Hive_01"));
    Ok(())
}
