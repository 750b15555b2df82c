use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fetch::{ScrapeFetcher, StagingFetcher};
use crate::table::Table;

/// Rows shown in the preview logged after assembly.
const PREVIEW_ROWS: usize = 10;

#[derive(Debug)]
pub struct ScrapeOutcome {
    pub table: Table,
    pub export_path: Option<PathBuf>,
}

/// One full run: scrape, optionally stage, tidy, and export.
pub struct SciScraper {
    scraper: ScrapeFetcher,
    stager: Option<StagingFetcher>,
    downcast: bool,
    export: bool,
    export_dir: PathBuf,
    today: String,
}

impl SciScraper {
    pub fn new(scraper: ScrapeFetcher, export_dir: impl Into<PathBuf>, today: impl Into<String>) -> Self {
        Self {
            scraper,
            stager: None,
            downcast: true,
            export: true,
            export_dir: export_dir.into(),
            today: today.into(),
        }
    }

    #[must_use]
    pub fn with_stager(mut self, stager: StagingFetcher) -> Self {
        self.stager = Some(stager);
        self
    }

    #[must_use]
    pub const fn with_downcast(mut self, downcast: bool) -> Self {
        self.downcast = downcast;
        self
    }

    #[must_use]
    pub const fn with_export(mut self, export: bool) -> Self {
        self.export = export;
        self
    }

    pub async fn run(&self, target: &Path) -> Result<ScrapeOutcome> {
        let mut table = self.scraper.run(target).await?;
        tracing::info!(rows = table.len(), "Scrape complete");

        if let Some(stager) = &self.stager {
            table = stager.run(table).await?;
            tracing::info!(rows = table.len(), "Staging complete");
        }

        table.remove_empty_columns();
        if self.downcast {
            table.downcast();
        }
        preview(&table);

        let export_path = if self.export {
            Some(table.export(&self.export_dir, &self.today)?)
        } else {
            None
        };

        Ok(ScrapeOutcome { table, export_path })
    }
}

fn preview(table: &Table) {
    tracing::info!(rows = table.len(), columns = ?table.columns(), "Assembled table");
    for (idx, row) in table.head(PREVIEW_ROWS).iter().enumerate() {
        tracing::info!(row = idx, values = %serde_json::Value::Object(row.clone()), "Preview");
    }
}
