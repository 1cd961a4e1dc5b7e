//! Reading and writing of CNV tables

pub mod csv;

pub use csv::{read_columns, read_region_table, write_gene_table};
