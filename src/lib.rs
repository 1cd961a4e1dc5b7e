//! cnv_heatmap: per-gene CNV tables and gain/loss heatmaps
//!
//! This crate shapes a cohort CNV export (rows = genomic regions, columns =
//! metadata plus one ratio column per sample) into per-gene filtered/sorted
//! CSV tables, classifies each ratio as a gain, loss, or normal call against
//! fixed thresholds, and renders one annotated heatmap grouping rows by
//! comparison pair.
//!
//! # Example
//!
//! ```ignore
//! use cnv_heatmap::prelude::*;
//!
//! let config = PipelineConfig {
//!     input: "cnv_export.csv".into(),
//!     genes: vec!["ATM".into(), "PALB2".into(), "BRCA1".into(), "BRCA2".into()],
//!     output_dir: "out".into(),
//!     ..Default::default()
//! };
//!
//! let summary = run_pipeline(&config)?;
//! println!("{} gene tables written", summary.genes_written.len());
//! ```

pub mod classify;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod io;
pub mod matrix;
pub mod render;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::classify::{categorize, Category, Thresholds};
    pub use crate::config::{detect_pairs, MissingSamplePolicy, PairConvention, PipelineConfig};
    pub use crate::data::{select_gene, GeneMatch, GeneTable, RegionTable, SortOrder, TableSchema};
    pub use crate::error::{CnvError, Result};
    pub use crate::io::{read_region_table, write_gene_table};
    pub use crate::matrix::{build_matrix, HeatmapMatrix, SamplePair};
    pub use crate::render::{render_heatmap, Color, ColorMap};
    pub use crate::{run_pipeline, PipelineSummary};
}

use std::fs;
use std::path::PathBuf;

use log::{info, warn};
use rayon::prelude::*;

use crate::config::{detect_pairs, MissingSamplePolicy, PipelineConfig};
use crate::data::{select_gene, GeneTable, RegionTable};
use crate::error::{CnvError, Result};
use crate::io::{read_region_table, write_gene_table};
use crate::matrix::{build_matrix, SamplePair};
use crate::render::render_heatmap;

/// Outcome of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    /// Genes whose CSV table was written, in configuration order
    pub genes_written: Vec<String>,
    /// Genes skipped because no rows matched
    pub genes_skipped: Vec<String>,
    /// Path of the rendered heatmap, if one was produced
    pub heatmap: Option<PathBuf>,
}

/// Select and write the per-gene tables
///
/// Genes are independent and share only the read-only input table, so the
/// loop runs in parallel. A gene with no matching rows is skipped with a
/// warning and reported as `None`; order follows the configuration.
pub fn write_gene_tables(
    config: &PipelineConfig,
    table: &RegionTable,
) -> Result<Vec<(String, Option<GeneTable>)>> {
    // A configured gene column is required once configured; a typo must not
    // silently skip every gene.
    if let Some(column) = &config.gene_column {
        if table.column_index(column).is_none() {
            return Err(CnvError::MissingColumn {
                column: column.clone(),
            });
        }
    }
    let matcher = config.matcher();

    config
        .genes
        .par_iter()
        .map(|gene| {
            let gene_table = select_gene(table, &matcher, gene, config.sort_order(gene));
            if gene_table.is_empty() {
                warn!(
                    "{}; skipping CSV and heatmap for this gene",
                    CnvError::GeneNotFound { gene: gene.clone() }
                );
                return Ok((gene.clone(), None));
            }

            let path = config.output_dir.join(format!("{}_dataframe.csv", gene));
            write_gene_table(&path, &gene_table)?;
            info!(
                "Wrote {} regions for {} to {}",
                gene_table.n_rows(),
                gene,
                path.display()
            );
            Ok((gene.clone(), Some(gene_table)))
        })
        .collect()
}

/// Resolve the comparison pairs to plot for a gene table
///
/// Explicit pairs from the configuration win; otherwise pairs are detected
/// from the column naming convention. Pairs naming a missing sample column
/// are skipped or abort the heatmap per the configured policy.
pub fn resolve_pairs(config: &PipelineConfig, gene_table: &GeneTable) -> Result<Vec<SamplePair>> {
    let candidates = if config.sample_pairs.is_empty() {
        let detected = detect_pairs(gene_table.table().columns(), &config.pair_convention);
        info!("Detected {} comparison pairs from column names", detected.len());
        detected
    } else {
        config.sample_pairs.clone()
    };

    let mut kept = Vec::with_capacity(candidates.len());
    for pair in candidates {
        let missing = [&pair.first, &pair.second]
            .into_iter()
            .find(|s| gene_table.table().column_index(s).is_none());
        match missing {
            Some(sample) => {
                let err = CnvError::MissingSampleColumn {
                    sample: sample.clone(),
                    gene: gene_table.gene().to_string(),
                };
                match config.missing_sample {
                    MissingSamplePolicy::Abort => return Err(err),
                    MissingSamplePolicy::Skip => {
                        warn!("{}; skipping pair '{}'", err, pair.label);
                    }
                }
            }
            None => kept.push(pair),
        }
    }
    Ok(kept)
}

/// Run the complete pipeline: per-gene CSV tables plus one heatmap
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineSummary> {
    config.validate()?;

    // Step 1: load and validate the input table
    info!("Loading CNV table from {}", config.input.display());
    let table = read_region_table(&config.input, &config.schema)?;
    info!(
        "  {} regions, {} columns",
        table.n_rows(),
        table.columns().len()
    );
    fs::create_dir_all(&config.output_dir)?;

    // Step 2: per-gene selection and CSV output
    let results = write_gene_tables(config, &table)?;

    let mut genes_written = Vec::new();
    let mut genes_skipped = Vec::new();
    for (gene, gene_table) in &results {
        match gene_table {
            Some(_) => genes_written.push(gene.clone()),
            None => genes_skipped.push(gene.clone()),
        }
    }

    // Step 3: pick the gene table feeding the heatmap
    let heatmap_table = match &config.heatmap_gene {
        Some(gene) => {
            if !config.genes.contains(gene) {
                return Err(CnvError::Config {
                    reason: format!("Heatmap gene '{}' is not among the configured genes", gene),
                });
            }
            match results.iter().find(|(g, _)| g == gene) {
                Some((_, Some(gene_table))) => Some(gene_table),
                _ => {
                    warn!("Heatmap gene '{}' matched no rows; skipping heatmap", gene);
                    None
                }
            }
        }
        None => results.iter().find_map(|(_, t)| t.as_ref()),
    };
    let Some(heatmap_table) = heatmap_table else {
        return Ok(PipelineSummary {
            genes_written,
            genes_skipped,
            heatmap: None,
        });
    };

    // Step 4: pairs, matrix, render
    let pairs = resolve_pairs(config, heatmap_table)?;
    if pairs.is_empty() {
        warn!("No comparison pairs found; skipping heatmap");
        return Ok(PipelineSummary {
            genes_written,
            genes_skipped,
            heatmap: None,
        });
    }

    let matrix = build_matrix(heatmap_table, &pairs, &config.thresholds)?;
    let title = config
        .title
        .clone()
        .unwrap_or_else(|| format!("CNV gain/loss heatmap ({})", heatmap_table.gene()));
    let path = config.output_dir.join(&config.heatmap_file);
    render_heatmap(&matrix, &config.colors, &config.thresholds, &title, &path)?;
    info!("Heatmap saved to {}", path.display());

    Ok(PipelineSummary {
        genes_written,
        genes_skipped,
        heatmap: Some(path),
    })
}

/// Per-category cell counts of a matrix, for console summaries
pub fn category_counts(matrix: &matrix::HeatmapMatrix) -> (usize, usize, usize) {
    use crate::classify::Category;

    let mut gains = 0;
    let mut losses = 0;
    let mut normals = 0;
    for i in 0..matrix.n_rows() {
        for j in 0..matrix.n_columns() {
            match matrix.category(i, j) {
                Category::Gain => gains += 1,
                Category::Loss => losses += 1,
                Category::Normal => normals += 1,
            }
        }
    }
    (gains, losses, normals)
}
