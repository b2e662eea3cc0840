use flate2::bufread::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::trace;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Represents the delimited text formats the analysis tables come in.
///
/// # Variants
///
/// * `TSV` - Tab separated values. CheckM, GTDB-Tk and the derived tables use this.
/// * `CSV` - Comma separated values. PADLOC writes its results in this format.
///
/// # Methods
///
/// * `separator`: Returns the field separator byte of the format.
/// * `from_path`: Guesses the format from a file extension, looking through a trailing `.gz`.
pub enum TableFormat {
    TSV,
    CSV,
}

impl TableFormat {
    /// The field separator of the format.
    pub fn separator(&self) -> u8 {
        match self {
            TableFormat::TSV => b'\t',
            TableFormat::CSV => b',',
        }
    }

    /// Guesses the format of `path` from its extension. A `.gz` suffix is skipped, and
    /// anything that is not `.csv` is treated as TSV.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use magtax::mag_utils::TableFormat;
    ///
    /// assert_eq!(TableFormat::from_path("all_padloc.csv"), TableFormat::CSV);
    /// assert_eq!(TableFormat::from_path("gtdbtk.bac120.summary.tsv.gz"), TableFormat::TSV);
    /// ```
    pub fn from_path<T: AsRef<Path>>(path: T) -> TableFormat {
        let path = path.as_ref();
        let stem_path = if path.extension().is_some_and(|e| e == "gz") {
            path.file_stem().map(Path::new).unwrap_or(path)
        } else {
            path
        };

        match stem_path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
        {
            Some(e) if e == "csv" => TableFormat::CSV,
            _ => TableFormat::TSV,
        }
    }
}

impl std::str::FromStr for TableFormat {
    type Err = anyhow::Error;

    /// Converts from a [&str] to an appropriate [TableFormat] type.
    /// The result is returned in an [`anyhow::Result<TableFormat>`]
    /// and is an error variant if there is no corresponding type for
    /// the input argument `s`.
    fn from_str(s: &str) -> anyhow::Result<TableFormat> {
        let tf = match s.to_lowercase().as_str() {
            "tsv" => TableFormat::TSV,
            "tab" => TableFormat::TSV,
            "csv" => TableFormat::CSV,
            _ => anyhow::bail!("Cannot parse the table format."),
        };
        Ok(tf)
    }
}

impl std::fmt::Display for TableFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableFormat::TSV => write!(f, "TSV"),
            TableFormat::CSV => write!(f, "CSV"),
        }
    }
}

/// Tests if the stream underlying the [BufReader] `reader` is gzipped or not by examining the
/// first 2 bytes for the magic header.  This function *requires*, but does not check, that
/// none of the stream has yet been consumed (i.e. that no read calls have yet been issued
/// to `reader`). It will fill the buffer to examine the first two bytes, but will not consume
/// them.
///
/// If the first 2 bytes could be succesfully read, this returns
/// [Ok]`(true)` if the file is a gzipped file
/// [Ok]`(false)` if it is not a gzipped file
///
/// If the first 2 bytes could not be succesfully read, then this
/// returns the relevant [std::io::Error].
pub fn is_gzipped<T: BufRead>(reader: &mut T) -> std::io::Result<bool> {
    const GZIP_MAGIC_NUMBER: [u8; 2] = [0x1f, 0x8b];

    let src = reader.fill_buf()?;
    if src.get(..2) == Some(&GZIP_MAGIC_NUMBER) {
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Reads the whole content of `r` into memory, transparently decompressing it
/// if it is gzipped.
pub fn read_all_bytes(r: impl Read) -> anyhow::Result<Vec<u8>> {
    let mut inner_rdr = BufReader::new(r);
    let mut bytes = Vec::new();
    if is_gzipped(&mut inner_rdr)? {
        trace!("auto-detected gzipped table - reading via decompression");
        MultiGzDecoder::new(inner_rdr).read_to_end(&mut bytes)?;
    } else {
        inner_rdr.read_to_end(&mut bytes)?;
    }
    Ok(bytes)
}

/// Reads the file at `p` into memory, transparently decompressing it if it is gzipped.
pub fn read_all_bytes_from_path<T: AsRef<Path>>(p: T) -> anyhow::Result<Vec<u8>> {
    let file = File::open(p.as_ref())?;
    read_all_bytes(file)
}

/// Joins `values` with `sep` after sorting them. If `unique` is set, repeated values
/// are only kept once.
pub fn join_sorted<T: AsRef<str>>(values: &[T], sep: &str, unique: bool) -> String {
    let mut v: Vec<&str> = values.iter().map(|s| s.as_ref()).collect();
    v.sort_unstable();
    if unique {
        v.dedup();
    }
    v.join(sep)
}
