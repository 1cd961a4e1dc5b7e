//! Sample-pair matrix assembly for heatmap rendering

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::classify::{categorize, Category, Thresholds};
use crate::data::GeneTable;
use crate::error::{CnvError, Result};

/// Two sample columns displayed in adjacent rows under a shared group label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplePair {
    /// First sample column name (e.g. the NextGene output column)
    pub first: String,
    /// Second sample column name
    pub second: String,
    /// Group label shown next to the two rows
    pub label: String,
}

impl std::str::FromStr for SamplePair {
    type Err = CnvError;

    /// Parse the CLI form `FIRST:SECOND:LABEL` (label optional, defaults to
    /// the first sample name)
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [first, second] => Ok(Self {
                first: first.to_string(),
                second: second.to_string(),
                label: first.to_string(),
            }),
            [first, second, label] => Ok(Self {
                first: first.to_string(),
                second: second.to_string(),
                label: label.to_string(),
            }),
            _ => Err(CnvError::Config {
                reason: format!("Invalid pair spec '{}'; expected FIRST:SECOND[:LABEL]", s),
            }),
        }
    }
}

/// One heatmap row: a sample column plus the pair label it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixRow {
    pub sample: String,
    pub group: String,
}

/// Categorized 2D matrix ready for rendering
///
/// Rows are (pair label, sample) in caller order, two per pair; columns are
/// region descriptions in gene-table (genomic) order. Ratios and categories
/// are stored side by side so cells can be annotated with the literal value.
#[derive(Debug, Clone)]
pub struct HeatmapMatrix {
    rows: Vec<MatrixRow>,
    columns: Vec<String>,
    ratios: Array2<f64>,
    categories: Array2<Category>,
}

impl HeatmapMatrix {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn rows(&self) -> &[MatrixRow] {
        &self.rows
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn ratio(&self, row: usize, col: usize) -> f64 {
        self.ratios[[row, col]]
    }

    pub fn category(&self, row: usize, col: usize) -> Category {
        self.categories[[row, col]]
    }
}

fn parse_ratio(gene: &str, column: &str, row: usize, value: &str) -> f64 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        log::warn!(
            "Missing ratio in column '{}', row {} (gene {}); treating as NA",
            column,
            row + 1,
            gene
        );
        return f64::NAN;
    }
    match trimmed.parse::<f64>() {
        Ok(v) => v,
        Err(_) => {
            log::warn!(
                "{}",
                CnvError::MalformedValue {
                    column: column.to_string(),
                    row: row + 1,
                    value: trimmed.to_string(),
                }
            );
            f64::NAN
        }
    }
}

/// Build the categorized matrix for a gene table and a list of sample pairs
///
/// Emits two rows per pair, in pair order, first sample then second; column
/// order mirrors the gene table and is never resorted here. A pair naming a
/// sample column absent from the table is an error; the caller decides
/// whether that skips the pair or aborts the heatmap. Malformed ratio cells
/// become NaN and categorize as Normal.
pub fn build_matrix(
    gene_table: &GeneTable,
    pairs: &[SamplePair],
    thresholds: &Thresholds,
) -> Result<HeatmapMatrix> {
    if gene_table.is_empty() {
        return Err(CnvError::EmptyData {
            reason: format!("Gene table for '{}' has no rows", gene_table.gene()),
        });
    }
    if pairs.is_empty() {
        return Err(CnvError::EmptyData {
            reason: "No sample pairs to plot".to_string(),
        });
    }

    let table = gene_table.table();
    let n_regions = table.n_rows();
    let n_rows = pairs.len() * 2;

    let mut rows = Vec::with_capacity(n_rows);
    let mut ratios = Array2::from_elem((n_rows, n_regions), f64::NAN);
    let mut categories = Array2::from_elem((n_rows, n_regions), Category::Normal);

    for (p, pair) in pairs.iter().enumerate() {
        for (s, sample) in [&pair.first, &pair.second].into_iter().enumerate() {
            let col = table
                .column_index(sample)
                .ok_or_else(|| CnvError::MissingSampleColumn {
                    sample: sample.clone(),
                    gene: gene_table.gene().to_string(),
                })?;
            let r = p * 2 + s;
            for region in 0..n_regions {
                let ratio = parse_ratio(gene_table.gene(), sample, region, table.raw(region, col));
                ratios[[r, region]] = ratio;
                categories[[r, region]] = categorize(ratio, thresholds);
            }
            rows.push(MatrixRow {
                sample: sample.clone(),
                group: pair.label.clone(),
            });
        }
    }

    Ok(HeatmapMatrix {
        rows,
        columns: gene_table.descriptions(),
        ratios,
        categories,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{select_gene, GeneMatch, RegionTable, SortOrder, TableSchema};

    fn toy_gene_table() -> GeneTable {
        let columns = vec![
            "Description".to_string(),
            "Chr Start_x".to_string(),
            "S1".to_string(),
            "S2".to_string(),
        ];
        let rows = vec![
            vec![
                "Exon1".to_string(),
                "100".to_string(),
                "1.5".to_string(),
                "0.9".to_string(),
            ],
            vec![
                "Exon2".to_string(),
                "50".to_string(),
                "0.4".to_string(),
                "1.0".to_string(),
            ],
        ];
        let table = RegionTable::new(columns, rows, &TableSchema::default()).unwrap();
        select_gene(&table, &GeneMatch::Description, "Exon", SortOrder::Ascending)
    }

    fn pair(first: &str, second: &str, label: &str) -> SamplePair {
        SamplePair {
            first: first.to_string(),
            second: second.to_string(),
            label: label.to_string(),
        }
    }

    #[test]
    fn test_matrix_shape_and_categories() {
        let gene = toy_gene_table();
        let pairs = vec![pair("S1", "S2", "Case A")];
        let matrix = build_matrix(&gene, &pairs, &Thresholds::default()).unwrap();

        assert_eq!(matrix.n_rows(), 2);
        assert_eq!(matrix.n_columns(), 2);
        // Columns follow the sorted gene table: Exon2 (pos 50) first
        assert_eq!(matrix.columns(), &["Exon2".to_string(), "Exon1".to_string()]);
        // S1: Exon2=0.4 Loss, Exon1=1.5 Gain; S2: 1.0 and 0.9 Normal
        assert_eq!(matrix.category(0, 0), Category::Loss);
        assert_eq!(matrix.category(0, 1), Category::Gain);
        assert_eq!(matrix.category(1, 0), Category::Normal);
        assert_eq!(matrix.category(1, 1), Category::Normal);
        assert_eq!(matrix.ratio(0, 1), 1.5);
    }

    #[test]
    fn test_pair_labels_on_adjacent_rows() {
        let gene = toy_gene_table();
        let pairs = vec![pair("S1", "S2", "Case A"), pair("S2", "S1", "Case B")];
        let matrix = build_matrix(&gene, &pairs, &Thresholds::default()).unwrap();

        assert_eq!(matrix.n_rows(), 4);
        assert_eq!(matrix.rows()[0].group, "Case A");
        assert_eq!(matrix.rows()[1].group, "Case A");
        assert_eq!(matrix.rows()[2].group, "Case B");
        assert_eq!(matrix.rows()[3].group, "Case B");
        assert_eq!(matrix.rows()[2].sample, "S2");
    }

    #[test]
    fn test_missing_sample_column() {
        let gene = toy_gene_table();
        let pairs = vec![pair("S1", "S9", "Case A")];
        let result = build_matrix(&gene, &pairs, &Thresholds::default());
        assert!(matches!(
            result,
            Err(CnvError::MissingSampleColumn { sample, .. }) if sample == "S9"
        ));
    }

    #[test]
    fn test_malformed_ratio_becomes_nan_normal() {
        let columns = vec![
            "Description".to_string(),
            "Chr Start_x".to_string(),
            "S1".to_string(),
        ];
        let rows = vec![vec![
            "Exon1".to_string(),
            "10".to_string(),
            "n/a".to_string(),
        ]];
        let table = RegionTable::new(columns, rows, &TableSchema::default()).unwrap();
        let gene = select_gene(&table, &GeneMatch::Description, "Exon", SortOrder::Ascending);
        let pairs = vec![pair("S1", "S1", "Case A")];

        let matrix = build_matrix(&gene, &pairs, &Thresholds::default()).unwrap();
        assert!(matrix.ratio(0, 0).is_nan());
        assert_eq!(matrix.category(0, 0), Category::Normal);
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let gene = toy_gene_table();
        assert!(matches!(
            build_matrix(&gene, &[], &Thresholds::default()),
            Err(CnvError::EmptyData { .. })
        ));
    }

    #[test]
    fn test_pair_spec_parsing() {
        let p: SamplePair = "a_Output:a_S5:Patient A".parse().unwrap();
        assert_eq!(p.first, "a_Output");
        assert_eq!(p.label, "Patient A");

        let p: SamplePair = "x:y".parse().unwrap();
        assert_eq!(p.label, "x");

        assert!("justone".parse::<SamplePair>().is_err());
    }
}
