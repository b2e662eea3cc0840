pub mod lengths;
pub mod table;

pub use lengths::read_lengths;
pub use table::{read_table, read_table_from_reader, write_table};
