//! cnv_heatmap command-line interface

use std::path::Path;

use clap::Parser;
use log::{info, LevelFilter};

use cnv_heatmap::category_counts;
use cnv_heatmap::cli::{Cli, Commands};
use cnv_heatmap::prelude::*;
use cnv_heatmap::resolve_pairs;

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Commands::Run {
            input,
            output_dir,
            genes,
            config,
            pairs,
            gene_column,
            heatmap_gene,
            gain_threshold,
            loss_threshold,
            descending,
            strict_pairs,
            threads,
        } => run_full(
            input,
            output_dir,
            genes,
            config.as_deref(),
            pairs,
            gene_column,
            heatmap_gene,
            gain_threshold,
            loss_threshold,
            descending,
            strict_pairs,
            threads,
        ),
        Commands::Select {
            input,
            output_dir,
            genes,
            gene_column,
            descending,
        } => run_select(&input, &output_dir, genes, gene_column, descending),
        Commands::Heatmap {
            input,
            output,
            pairs,
            gene,
            gain_threshold,
            loss_threshold,
            title,
            description_column,
            start_column,
            strict_pairs,
        } => run_heatmap(
            &input,
            &output,
            pairs,
            gene,
            gain_threshold,
            loss_threshold,
            title,
            description_column,
            start_column,
            strict_pairs,
        ),
        Commands::Pairs { input } => run_pairs(&input),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn run_full(
    input: Option<String>,
    output_dir: Option<String>,
    genes: Vec<String>,
    config_path: Option<&str>,
    pairs: Vec<SamplePair>,
    gene_column: Option<String>,
    heatmap_gene: Option<String>,
    gain_threshold: Option<f64>,
    loss_threshold: Option<f64>,
    descending: Vec<String>,
    strict_pairs: bool,
    threads: usize,
) -> Result<()> {
    // Configure thread pool
    if threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .ok();
    }

    let mut config = match config_path {
        Some(path) => {
            info!("Loading configuration from {}", path);
            PipelineConfig::from_file(path)?
        }
        None => PipelineConfig::default(),
    };

    // Command-line flags override the configuration file
    if let Some(input) = input {
        config.input = input.into();
    }
    if let Some(output_dir) = output_dir {
        config.output_dir = output_dir.into();
    }
    if !genes.is_empty() {
        config.genes = genes;
    }
    if !pairs.is_empty() {
        config.sample_pairs = pairs;
    }
    if let Some(gene_column) = gene_column {
        config.gene_column = Some(gene_column);
    }
    if let Some(heatmap_gene) = heatmap_gene {
        config.heatmap_gene = Some(heatmap_gene);
    }
    if let Some(gain) = gain_threshold {
        config.thresholds.gain = gain;
    }
    if let Some(loss) = loss_threshold {
        config.thresholds.loss = loss;
    }
    if !descending.is_empty() {
        config.descending_genes = descending;
    }
    if strict_pairs {
        config.missing_sample = MissingSamplePolicy::Abort;
    }

    let summary = run_pipeline(&config)?;
    info!(
        "Done! {} gene tables written, {} genes skipped, heatmap: {}",
        summary.genes_written.len(),
        summary.genes_skipped.len(),
        match &summary.heatmap {
            Some(path) => path.display().to_string(),
            None => "none".to_string(),
        }
    );
    Ok(())
}

fn run_select(
    input: &str,
    output_dir: &str,
    genes: Vec<String>,
    gene_column: Option<String>,
    descending: Vec<String>,
) -> Result<()> {
    let config = PipelineConfig {
        input: input.into(),
        output_dir: output_dir.into(),
        genes,
        gene_column,
        descending_genes: descending,
        ..Default::default()
    };
    config.validate()?;

    info!("Loading CNV table from {}", input);
    let table = read_region_table(&config.input, &config.schema)?;
    info!(
        "  {} regions, {} columns",
        table.n_rows(),
        table.columns().len()
    );

    std::fs::create_dir_all(&config.output_dir)?;
    let results = cnv_heatmap::write_gene_tables(&config, &table)?;
    let written = results.iter().filter(|(_, t)| t.is_some()).count();
    info!(
        "Done! {} gene tables written, {} genes skipped",
        written,
        results.len() - written
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_heatmap(
    input: &str,
    output: &str,
    pairs: Vec<SamplePair>,
    gene: Option<String>,
    gain_threshold: f64,
    loss_threshold: f64,
    title: Option<String>,
    description_column: String,
    start_column: String,
    strict_pairs: bool,
) -> Result<()> {
    let thresholds = Thresholds {
        gain: gain_threshold,
        loss: loss_threshold,
    };
    thresholds.validate()?;

    let schema = TableSchema {
        description_column,
        start_column,
    };
    info!("Loading gene table from {}", input);
    let table = read_region_table(input, &schema)?;

    // "out/PALB2_dataframe.csv" names the gene unless told otherwise
    let gene_name = gene.unwrap_or_else(|| {
        let stem = Path::new(input)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        stem.strip_suffix("_dataframe").unwrap_or(&stem).to_string()
    });
    let gene_table = GeneTable::from_table(&gene_name, table);
    if gene_table.is_empty() {
        return Err(CnvError::GeneNotFound { gene: gene_name });
    }

    let config = PipelineConfig {
        sample_pairs: pairs,
        thresholds,
        missing_sample: if strict_pairs {
            MissingSamplePolicy::Abort
        } else {
            MissingSamplePolicy::Skip
        },
        ..Default::default()
    };
    let pairs = resolve_pairs(&config, &gene_table)?;
    if pairs.is_empty() {
        return Err(CnvError::EmptyData {
            reason: "No comparison pairs found based on the naming convention".to_string(),
        });
    }

    let matrix = build_matrix(&gene_table, &pairs, &thresholds)?;
    let (gains, losses, normals) = category_counts(&matrix);
    info!(
        "{} pairs x {} regions: {} gains, {} losses, {} normal cells",
        pairs.len(),
        matrix.n_columns(),
        gains,
        losses,
        normals
    );

    let title =
        title.unwrap_or_else(|| format!("CNV gain/loss heatmap ({})", gene_table.gene()));
    render_heatmap(
        &matrix,
        &config.colors,
        &thresholds,
        &title,
        Path::new(output),
    )?;
    info!("Heatmap saved to {}", output);
    Ok(())
}

fn run_pairs(input: &str) -> Result<()> {
    let columns = cnv_heatmap::io::read_columns(input)?;
    let pairs = detect_pairs(&columns, &PairConvention::default());

    if pairs.is_empty() {
        println!("No comparison pairs found based on the naming convention.");
        return Ok(());
    }

    println!("Identified comparison pairs:");
    for pair in &pairs {
        println!("  {}: {} / {}", pair.label, pair.first, pair.second);
    }
    Ok(())
}
