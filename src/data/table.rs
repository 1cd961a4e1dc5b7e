//! Validated in-memory representation of the CNV input table

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{CnvError, Result};

/// Names of the columns every input table must provide
///
/// Defaults follow the NextGene CNV export: region descriptions in
/// `Description`, genomic start coordinates in `Chr Start_x`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSchema {
    /// Region description column [default: "Description"]
    pub description_column: String,
    /// Genomic start position column [default: "Chr Start_x"]
    pub start_column: String,
}

impl Default for TableSchema {
    fn default() -> Self {
        Self {
            description_column: "Description".to_string(),
            start_column: "Chr Start_x".to_string(),
        }
    }
}

/// One region (genomic interval) per row, one metadata or per-sample ratio
/// column per column
///
/// Cells are kept as the raw strings read from the source so that per-gene
/// CSV output reproduces the input verbatim. The two required columns are
/// located and the start positions parsed once, at construction; everything
/// else is looked up by column name on demand.
#[derive(Debug, Clone)]
pub struct RegionTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    starts: Vec<i64>,
    description_idx: usize,
    start_idx: usize,
}

fn parse_start(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Some(v);
    }
    // Spreadsheet exports sometimes render integers as "41196312.0"
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Some(v as i64),
        _ => None,
    }
}

impl RegionTable {
    /// Build a table from a header and raw rows, validating the schema
    ///
    /// Fails fast (before any gene processing) on a missing required column,
    /// a ragged row, or a start position that does not parse as an integer.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>, schema: &TableSchema) -> Result<Self> {
        if columns.is_empty() {
            return Err(CnvError::EmptyData {
                reason: "Input table has no columns".to_string(),
            });
        }

        {
            let mut seen = HashSet::new();
            for name in &columns {
                if !seen.insert(name) {
                    log::warn!(
                        "Duplicate column name '{}'; lookups use the first occurrence",
                        name
                    );
                }
            }
        }

        let description_idx = columns
            .iter()
            .position(|c| c == &schema.description_column)
            .ok_or_else(|| CnvError::MissingColumn {
                column: schema.description_column.clone(),
            })?;
        let start_idx = columns
            .iter()
            .position(|c| c == &schema.start_column)
            .ok_or_else(|| CnvError::MissingColumn {
                column: schema.start_column.clone(),
            })?;

        let mut starts = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(CnvError::InvalidTable {
                    reason: format!(
                        "Row {} has {} columns, expected {}",
                        i + 1,
                        row.len(),
                        columns.len()
                    ),
                });
            }
            let start = parse_start(&row[start_idx]).ok_or_else(|| CnvError::InvalidTable {
                reason: format!(
                    "Row {}: start position '{}' is not an integer",
                    i + 1,
                    row[start_idx]
                ),
            })?;
            starts.push(start);
        }

        Ok(Self {
            columns,
            rows,
            starts,
            description_idx,
            start_idx,
        })
    }

    /// Column names in original order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of region rows
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name (first occurrence)
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Raw cell value by row and column index
    pub fn raw(&self, row: usize, col: usize) -> &str {
        &self.rows[row][col]
    }

    /// Raw cell value by row and column name
    pub fn value(&self, row: usize, column: &str) -> Option<&str> {
        self.column_index(column).map(|c| self.raw(row, c))
    }

    /// Region description for a row
    pub fn description(&self, row: usize) -> &str {
        &self.rows[row][self.description_idx]
    }

    /// Parsed genomic start position for a row
    pub fn start(&self, row: usize) -> i64 {
        self.starts[row]
    }

    /// Full raw row
    pub fn row(&self, row: usize) -> &[String] {
        &self.rows[row]
    }

    /// New table containing only the given rows, in the given order
    pub fn subset_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            starts: indices.iter().map(|&i| self.starts[i]).collect(),
            description_idx: self.description_idx,
            start_idx: self.start_idx,
        }
    }
}
