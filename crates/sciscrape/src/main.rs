mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use sciscrape_core::fetch::{ScrapeFetcher, StagingFetcher};
use sciscrape_core::serialize;
use sciscrape_core::source::{DocumentMode, SourceCapability};
use sciscrape_core::{SciScraper, ScrapeConfig};

use cli::{Cli, Commands, Source, Stage};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = match &cli.config {
        Some(path) => ScrapeConfig::load(path)?,
        None => ScrapeConfig::discover()?,
    };

    let (scraper, target) = build(cli.command, &config)?;
    let outcome = scraper
        .with_downcast(!cli.no_downcast)
        .with_export(!cli.no_export)
        .run(&target)
        .await
        .with_context(|| format!("scrape of {} failed", target.display()))?;

    let mut stdout = std::io::stdout().lock();
    match outcome.export_path {
        Some(path) => writeln!(
            stdout,
            "Exported {} rows to {}",
            outcome.table.len(),
            path.display()
        )?,
        None => outcome.table.write_csv(&mut stdout)?,
    }
    Ok(())
}

fn init_tracing(debug: bool) {
    let default = if debug {
        "sciscrape=debug,sciscrape_core=debug"
    } else {
        "sciscrape=info,sciscrape_core=info"
    };
    let filter = if debug {
        EnvFilter::new(default)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Assemble the run for one command and the target it reads.
fn build(command: Commands, config: &ScrapeConfig) -> Result<(SciScraper, PathBuf)> {
    let today = ScrapeConfig::today();

    let (fetcher, stager, target) = match command {
        Commands::Docs { dir } => {
            let scorer = config.doc_scraper(DocumentMode::Pdf)?;
            let fetcher = ScrapeFetcher::new(Box::new(scorer), serialize::pdf_directory())
                .with_titles(serialize::pdf_titles());
            (fetcher, None, dir.unwrap_or_else(|| config.source_dir.clone()))
        }
        Commands::Abstracts { file } => {
            let scorer = config.doc_scraper(DocumentMode::Abstract)?;
            (ScrapeFetcher::new(Box::new(scorer), serialize::lines()), None, file)
        }
        Commands::Lookup {
            file,
            column,
            source,
            citation_subset,
            stage,
        } => {
            let transport = config.transport()?;
            let primary: Box<dyn SourceCapability> = match source {
                Source::Dimensions => Box::new(config.dimensions_scraper(&transport, citation_subset)),
                Source::SemanticScholar => Box::new(config.semantic_scholar_scraper(&transport)),
            };
            let stager = match stage {
                Stage::Abstracts => Some(StagingFetcher::new(
                    Box::new(config.doc_scraper(DocumentMode::Abstract)?),
                    serialize::stage_abstracts(),
                )),
                Stage::Citations => Some(StagingFetcher::new(
                    Box::new(config.dimensions_scraper(&transport, false)),
                    serialize::stage_citations(),
                )),
                Stage::None => None,
            };
            let fetcher = ScrapeFetcher::new(primary, serialize::csv_column(column));
            (fetcher, stager, file.unwrap_or_else(|| config.source_file.clone()))
        }
        Commands::Download { file, column } => {
            let transport = config.transport()?;
            let downloader = config.downloader(&transport)?;
            let fetcher = ScrapeFetcher::new(Box::new(downloader), serialize::csv_column(column));
            (fetcher, None, file.unwrap_or_else(|| config.source_file.clone()))
        }
    };

    let mut scraper = SciScraper::new(fetcher, &config.export_dir, today);
    if let Some(stager) = stager {
        scraper = scraper.with_stager(stager);
    }
    Ok((scraper, target))
}
