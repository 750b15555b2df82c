use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sciscrape",
    about = "Fetch, stage and score bibliographic data about academic papers",
    version
)]
pub struct Cli {
    /// Configuration file (defaults to ./config_setup.json, then the user config dir)
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,
    /// Log at debug level
    #[arg(long, global = true)]
    pub debug: bool,
    /// Print the table as CSV instead of writing it to the export directory
    #[arg(long, global = true)]
    pub no_export: bool,
    /// Keep cell values as fetched
    #[arg(long, global = true)]
    pub no_downcast: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score every PDF in a directory against the configured word lists
    Docs {
        /// Directory of PDFs (defaults to source_dir)
        dir: Option<PathBuf>,
    },
    /// Score one abstract per line of a text file
    Abstracts {
        /// File of abstracts, one per line
        file: PathBuf,
    },
    /// Look up bibliographic records for every value in a CSV column
    Lookup {
        /// Input CSV (defaults to source_file)
        file: Option<PathBuf>,
        /// Column holding the queries
        #[arg(long, default_value = "doi")]
        column: String,
        /// Bibliographic source
        #[arg(long, value_enum, default_value_t = Source::Dimensions)]
        source: Source,
        /// Treat each query as a publication id and fetch the papers citing it
        #[arg(long)]
        citation_subset: bool,
        /// Second round run against the looked-up records
        #[arg(long, value_enum, default_value_t = Stage::None)]
        stage: Stage,
    },
    /// Download the PDF for every DOI in a CSV column
    Download {
        /// Input CSV (defaults to source_file)
        file: Option<PathBuf>,
        /// Column holding the DOIs
        #[arg(long, default_value = "doi")]
        column: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Source {
    Dimensions,
    SemanticScholar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Stage {
    /// Score each record's abstract
    Abstracts,
    /// Look up every paper each record cites
    Citations,
    None,
}
