//! Command-line interface for cnv_heatmap

use clap::{Parser, Subcommand};

use crate::matrix::SamplePair;

#[derive(Parser)]
#[command(name = "cnv_heatmap")]
#[command(version)]
#[command(about = "Per-gene CNV ratio tables and gain/loss heatmaps")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline: per-gene CSVs plus one heatmap
    #[command(
        long_about = "Run the full pipeline.\n\n\
            Selects the rows of each gene of interest, sorts them by genomic\n\
            start position, writes one <gene>_dataframe.csv per gene, then\n\
            renders a heatmap of gain/loss/normal calls for the comparison\n\
            pairs of one gene's table.",
        after_long_help = "\
Examples:
  # Pairs detected from the column naming convention
  cnv_heatmap run -i cnv_export.csv -o out -g ATM -g PALB2 -g BRCA1 -g BRCA2

  # Explicit pairs and a dedicated gene column
  cnv_heatmap run -i cnv_export.csv -o out -g BRCA2 --gene-column Gene \\
    --pair runA_Output.pjt:runA_S1:PatientA

  # Everything pinned in a config file, thresholds overridden
  cnv_heatmap run --config pipeline.json --gain-threshold 1.4"
    )]
    Run {
        /// Path to the exported CNV table (CSV or TSV)
        #[arg(short, long)]
        input: Option<String>,

        /// Output directory [default: .]
        #[arg(short, long)]
        output_dir: Option<String>,

        /// Gene of interest (repeatable)
        #[arg(short, long = "gene", value_name = "GENE")]
        genes: Vec<String>,

        /// Path to a JSON configuration file; flags override its values
        #[arg(long)]
        config: Option<String>,

        /// Comparison pair as FIRST:SECOND[:LABEL] (repeatable)
        #[arg(long = "pair", value_name = "PAIR")]
        pairs: Vec<SamplePair>,

        /// Dedicated gene column for exact matching
        #[arg(long,
            long_help = "Dedicated gene column for exact, case-sensitive matching.\n\
                Without this, genes are matched by case-insensitive substring\n\
                on the description column.")]
        gene_column: Option<String>,

        /// Gene whose table feeds the heatmap [default: first gene with rows]
        #[arg(long)]
        heatmap_gene: Option<String>,

        /// Gain threshold (inclusive) [default: 1.3]
        #[arg(long)]
        gain_threshold: Option<f64>,

        /// Loss threshold (inclusive) [default: 0.7]
        #[arg(long)]
        loss_threshold: Option<f64>,

        /// Sort this gene by descending start position (repeatable)
        #[arg(long = "descending", value_name = "GENE")]
        descending: Vec<String>,

        /// Abort the heatmap when a pair's sample column is missing
        #[arg(long,
            long_help = "Abort the heatmap when a pair names a sample column the\n\
                table does not have. By default such pairs are skipped with a\n\
                warning and the remaining pairs are plotted.")]
        strict_pairs: bool,

        /// Number of threads (0 = auto) [default: 0]
        #[arg(short = 't', long, default_value = "0")]
        threads: usize,
    },

    /// Write per-gene CSV tables only
    #[command(after_long_help = "\
Examples:
  cnv_heatmap select -i cnv_export.csv -o out -g ATM -g BRCA2")]
    Select {
        /// Path to the exported CNV table (CSV or TSV)
        #[arg(short, long)]
        input: String,

        /// Output directory [default: .]
        #[arg(short, long, default_value = ".")]
        output_dir: String,

        /// Gene of interest (repeatable)
        #[arg(short, long = "gene", value_name = "GENE")]
        genes: Vec<String>,

        /// Dedicated gene column for exact matching
        #[arg(long)]
        gene_column: Option<String>,

        /// Sort this gene by descending start position (repeatable)
        #[arg(long = "descending", value_name = "GENE")]
        descending: Vec<String>,
    },

    /// Render a heatmap from a previously written gene CSV
    #[command(
        long_about = "Render a heatmap from one per-gene CSV.\n\n\
            Rows are taken in file order (the CSV is already sorted by the\n\
            select step). Pairs are detected from the column naming convention\n\
            unless given explicitly.",
        after_long_help = "\
Examples:
  cnv_heatmap heatmap -i out/PALB2_dataframe.csv -o out/palb2_heatmap.png
  cnv_heatmap heatmap -i out/PALB2_dataframe.csv -o heatmap.png \\
    --pair runA_Output.pjt:runA_S1:PatientA --strict-pairs"
    )]
    Heatmap {
        /// Path to a per-gene CSV written by the select step
        #[arg(short, long)]
        input: String,

        /// Output PNG path [default: cnv_heatmap_with_grouped_comparisons.png]
        #[arg(short, long, default_value = "cnv_heatmap_with_grouped_comparisons.png")]
        output: String,

        /// Comparison pair as FIRST:SECOND[:LABEL] (repeatable)
        #[arg(long = "pair", value_name = "PAIR")]
        pairs: Vec<SamplePair>,

        /// Gene name for the title [default: derived from the file name]
        #[arg(long)]
        gene: Option<String>,

        /// Gain threshold (inclusive) [default: 1.3]
        #[arg(long, default_value = "1.3")]
        gain_threshold: f64,

        /// Loss threshold (inclusive) [default: 0.7]
        #[arg(long, default_value = "0.7")]
        loss_threshold: f64,

        /// Heatmap title [default: "CNV gain/loss heatmap (<gene>)"]
        #[arg(long)]
        title: Option<String>,

        /// Region description column [default: "Description"]
        #[arg(long, default_value = "Description")]
        description_column: String,

        /// Genomic start position column [default: "Chr Start_x"]
        #[arg(long, default_value = "Chr Start_x")]
        start_column: String,

        /// Abort when a pair's sample column is missing
        #[arg(long)]
        strict_pairs: bool,
    },

    /// Print comparison pairs detected from a table's column names
    Pairs {
        /// Path to a CNV table or per-gene CSV
        #[arg(short, long)]
        input: String,
    },
}
