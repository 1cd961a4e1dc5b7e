//! Data structures for CNV region tables

pub mod gene;
pub mod table;

pub use gene::{select_gene, GeneMatch, GeneTable, SortOrder};
pub use table::{RegionTable, TableSchema};
