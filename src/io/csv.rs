//! CSV reading and writing for CNV region tables

use std::fs;
use std::path::Path;

use crate::data::{GeneTable, RegionTable, TableSchema};
use crate::error::{CnvError, Result};

/// Read a region table from a delimited text file
///
/// Spreadsheet ingestion proper happens upstream; the input here is the
/// exported sheet. The delimiter (comma or tab) is detected from the header
/// line. Required columns and start positions are validated before the table
/// is returned, so downstream gene processing never sees a malformed schema.
pub fn read_region_table<P: AsRef<Path>>(path: P, schema: &TableSchema) -> Result<RegionTable> {
    let contents = fs::read_to_string(&path)?;
    if contents.trim().is_empty() {
        return Err(CnvError::EmptyData {
            reason: format!("Input file {} is empty", path.as_ref().display()),
        });
    }

    // Detect delimiter from the header line
    let header_line = contents.lines().next().unwrap_or("");
    let delimiter = if header_line.contains('\t') { b'\t' } else { b',' };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(contents.as_bytes());

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }

    RegionTable::new(columns, rows, schema)
}

/// Read only the column names of a delimited text file
pub fn read_columns<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let contents = fs::read_to_string(&path)?;
    let header_line = contents.lines().next().ok_or_else(|| CnvError::EmptyData {
        reason: format!("Input file {} is empty", path.as_ref().display()),
    })?;
    let delimiter = if header_line.contains('\t') { b'\t' } else { b',' };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(header_line.as_bytes());
    Ok(reader.headers()?.iter().map(|h| h.to_string()).collect())
}

/// Write a gene table to a CSV file, columns and rows verbatim
///
/// The header is the full input column set in original order; rows are the
/// gene's regions in the order produced by selection (genomic order).
pub fn write_gene_table<P: AsRef<Path>>(path: P, gene_table: &GeneTable) -> Result<()> {
    let table = gene_table.table();
    let mut writer = csv::Writer::from_path(&path)?;

    writer.write_record(table.columns())?;
    for i in 0..table.n_rows() {
        writer.write_record(table.row(i))?;
    }
    writer.flush()?;

    log::debug!(
        "Wrote {} rows for gene {} to {}",
        table.n_rows(),
        gene_table.gene(),
        path.as_ref().display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{select_gene, GeneMatch, SortOrder};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_comma_delimited() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Description,Chr Start_x,S1,S2").unwrap();
        writeln!(file, "GeneX Exon1,100,1.5,0.9").unwrap();
        writeln!(file, "GeneX Exon2,50,0.4,1.0").unwrap();

        let table = read_region_table(file.path(), &TableSchema::default()).unwrap();
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.columns().len(), 4);
        assert_eq!(table.value(0, "S1"), Some("1.5"));
        assert_eq!(table.start(1), 50);
    }

    #[test]
    fn test_read_tab_delimited() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Description\tChr Start_x\tS1").unwrap();
        writeln!(file, "GeneX Exon1\t100\t1.5").unwrap();

        let table = read_region_table(file.path(), &TableSchema::default()).unwrap();
        assert_eq!(table.n_rows(), 1);
        assert_eq!(table.description(0), "GeneX Exon1");
    }

    #[test]
    fn test_quoted_description_with_comma() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Description,Chr Start_x,S1").unwrap();
        writeln!(file, "\"GeneX Exon1, promoter\",100,1.5").unwrap();

        let table = read_region_table(file.path(), &TableSchema::default()).unwrap();
        assert_eq!(table.description(0), "GeneX Exon1, promoter");
    }

    #[test]
    fn test_empty_file_rejected() {
        let file = NamedTempFile::new().unwrap();
        let result = read_region_table(file.path(), &TableSchema::default());
        assert!(matches!(result, Err(CnvError::EmptyData { .. })));
    }

    #[test]
    fn test_missing_column_reported() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Description,S1").unwrap();
        writeln!(file, "GeneX Exon1,1.5").unwrap();

        let result = read_region_table(file.path(), &TableSchema::default());
        assert!(matches!(result, Err(CnvError::MissingColumn { .. })));
    }

    #[test]
    fn test_read_columns_only() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Description,Chr Start_x,runA_S1").unwrap();
        writeln!(file, "GeneX Exon1,100,1.5").unwrap();

        let columns = read_columns(file.path()).unwrap();
        assert_eq!(columns, vec!["Description", "Chr Start_x", "runA_S1"]);
    }

    #[test]
    fn test_gene_table_round_trip() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Description,Chr Start_x,S1,S2").unwrap();
        writeln!(file, "GeneX Exon1,100,1.5,0.9").unwrap();
        writeln!(file, "GeneX Exon2,50,0.4,1.0").unwrap();
        writeln!(file, "GeneY Exon1,10,1.0,1.0").unwrap();

        let table = read_region_table(file.path(), &TableSchema::default()).unwrap();
        let gene = select_gene(&table, &GeneMatch::Description, "GeneX", SortOrder::Ascending);

        let out = NamedTempFile::new().unwrap();
        write_gene_table(out.path(), &gene).unwrap();

        let back = read_region_table(out.path(), &TableSchema::default()).unwrap();
        assert_eq!(back.n_rows(), 2);
        assert_eq!(back.columns(), table.columns());
        // Genomic sort order survives the round trip
        assert_eq!(back.description(0), "GeneX Exon2");
        assert_eq!(back.value(0, "S1"), Some("0.4"));
        assert_eq!(back.value(1, "S2"), Some("0.9"));
    }
}
