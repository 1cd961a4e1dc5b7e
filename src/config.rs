//! Pipeline configuration
//!
//! All knobs live in one explicit struct handed to the pipeline; there is no
//! process-wide mutable state. Every field has a documented default and the
//! whole struct round-trips through JSON, so a run can be pinned to a config
//! file and reproduced exactly.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::classify::Thresholds;
use crate::data::{GeneMatch, SortOrder, TableSchema};
use crate::error::{CnvError, Result};
use crate::matrix::SamplePair;
use crate::render::ColorMap;

/// Column naming convention used to discover comparison pairs
///
/// Defaults are the NextGene export convention: for each run prefix there is
/// one `<prefix>_marked_duplicates_removed_Output.pjt` column and one
/// `<prefix>_S<n>...` column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PairConvention {
    /// Suffix identifying the first column of a pair
    pub output_suffix: String,
    /// Marker whose first occurrence ends the prefix of the second column
    pub sample_marker: String,
}

impl Default for PairConvention {
    fn default() -> Self {
        Self {
            output_suffix: "_marked_duplicates_removed_Output.pjt".to_string(),
            sample_marker: "_S".to_string(),
        }
    }
}

/// Discover comparison pairs from column names by shared prefix
///
/// A prefix contributes a pair only when both its output column and its
/// sample column are present. Pairs come out in first-seen column order,
/// labeled by the prefix.
pub fn detect_pairs(columns: &[String], convention: &PairConvention) -> Vec<SamplePair> {
    struct Group {
        prefix: String,
        output: Option<String>,
        sample: Option<String>,
    }

    fn group_index(groups: &mut Vec<Group>, prefix: &str) -> usize {
        if let Some(i) = groups.iter().position(|g| g.prefix == prefix) {
            i
        } else {
            groups.push(Group {
                prefix: prefix.to_string(),
                output: None,
                sample: None,
            });
            groups.len() - 1
        }
    }

    let mut groups: Vec<Group> = Vec::new();
    for col in columns {
        if let Some(prefix) = col.strip_suffix(&convention.output_suffix) {
            let i = group_index(&mut groups, prefix);
            groups[i].output = Some(col.clone());
        } else if let Some(idx) = col.find(&convention.sample_marker) {
            let prefix = col[..idx].to_string();
            let i = group_index(&mut groups, &prefix);
            groups[i].sample = Some(col.clone());
        }
    }

    groups
        .into_iter()
        .filter_map(|g| match (g.output, g.sample) {
            (Some(first), Some(second)) => Some(SamplePair {
                first,
                second,
                label: g.prefix,
            }),
            _ => None,
        })
        .collect()
}

/// What to do when a configured sample column is missing from the gene table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingSamplePolicy {
    /// Skip the pair with a warning and keep going [default]
    #[default]
    Skip,
    /// Abort the heatmap
    Abort,
}

/// Full configuration for one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Path to the exported CNV table (CSV or TSV)
    pub input: PathBuf,
    /// Genes of interest, processed in this order
    pub genes: Vec<String>,
    /// Directory for per-gene CSVs and the heatmap [default: "."]
    pub output_dir: PathBuf,
    /// Names of the required table columns
    pub schema: TableSchema,
    /// Dedicated gene column for exact matching; when unset, genes are
    /// matched by case-insensitive substring on the description column
    pub gene_column: Option<String>,
    /// Genes sorted by descending start position instead of ascending
    pub descending_genes: Vec<String>,
    /// Gene whose table feeds the heatmap [default: first gene with rows]
    pub heatmap_gene: Option<String>,
    /// Heatmap file name [default: "cnv_heatmap_with_grouped_comparisons.png"]
    pub heatmap_file: String,
    /// Heatmap title [default: "CNV gain/loss heatmap (<gene>)"]
    pub title: Option<String>,
    /// Explicit comparison pairs; when empty, pairs are detected from the
    /// column naming convention
    pub sample_pairs: Vec<SamplePair>,
    /// Column naming convention for pair detection
    pub pair_convention: PairConvention,
    /// Gain/loss classification thresholds
    pub thresholds: Thresholds,
    /// Category colors
    pub colors: ColorMap,
    /// Policy for pairs whose sample column is missing
    pub missing_sample: MissingSamplePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            genes: Vec::new(),
            output_dir: PathBuf::from("."),
            schema: TableSchema::default(),
            gene_column: None,
            descending_genes: Vec::new(),
            heatmap_gene: None,
            heatmap_file: "cnv_heatmap_with_grouped_comparisons.png".to_string(),
            title: None,
            sample_pairs: Vec::new(),
            pair_convention: PairConvention::default(),
            thresholds: Thresholds::default(),
            colors: ColorMap::default(),
            missing_sample: MissingSamplePolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Check the configuration before any processing starts
    pub fn validate(&self) -> Result<()> {
        if self.input.as_os_str().is_empty() {
            return Err(CnvError::Config {
                reason: "No input file configured".to_string(),
            });
        }
        if self.genes.is_empty() {
            return Err(CnvError::Config {
                reason: "No genes of interest configured".to_string(),
            });
        }
        if self.heatmap_file.is_empty() {
            return Err(CnvError::Config {
                reason: "Heatmap file name must not be empty".to_string(),
            });
        }
        self.thresholds.validate()
    }

    /// Gene matching policy implied by the configuration
    pub fn matcher(&self) -> GeneMatch {
        match &self.gene_column {
            Some(column) => GeneMatch::Column(column.clone()),
            None => GeneMatch::Description,
        }
    }

    /// Sort direction for a gene
    pub fn sort_order(&self, gene: &str) -> SortOrder {
        if self.descending_genes.iter().any(|g| g == gene) {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }
}
