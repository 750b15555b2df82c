//! Pipeline drivers.
//!
//! A [`Fetcher`] feeds queries to one source strictly in order, one request
//! in flight. [`ScrapeFetcher`] runs the first round from a target path;
//! [`StagingFetcher`] derives a second round from the resulting table.

mod staged;

pub use staged::StagedQuerySet;

use futures::stream::{self, Stream, StreamExt};
use serde_json::Value;
use std::path::Path;

use crate::error::Result;
use crate::result::{Record, ScrapeResult};
use crate::serialize::{SerializationStrategy, StagingStrategy};
use crate::source::{Obtained, SourceCapability};
use crate::table::{Table, TableError};

/// Column naming the prior row each branching result came from.
pub const PROVENANCE_COLUMN: &str = "source_titles";

pub struct Fetcher {
    source: Box<dyn SourceCapability>,
}

impl Fetcher {
    pub fn new(source: Box<dyn SourceCapability>) -> Self {
        Self { source }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    async fn obtain(&self, position: usize, total: usize, query: &str) -> Obtained {
        if query.trim().is_empty() {
            tracing::debug!(source = self.source.name(), position = position + 1, "Skipping blank query");
            return Obtained::Nothing;
        }
        tracing::debug!(
            source = self.source.name(),
            position = position + 1,
            total,
            query,
            "Fetching"
        );
        let obtained = self.source.obtain(query).await;
        if obtained.is_nothing() {
            tracing::debug!(source = self.source.name(), query, "No result");
        }
        obtained
    }

    /// Results in query order, absent results dropped and multiple results
    /// flattened. Nothing is requested until the stream is polled.
    pub fn fetch(&self, queries: Vec<String>) -> impl Stream<Item = ScrapeResult> + Send + '_ {
        let total = queries.len();
        stream::iter(queries.into_iter().enumerate())
            .then(move |(position, query)| async move {
                self.obtain(position, total, &query).await
            })
            .flat_map(stream::iter)
    }

    /// One slot per query, empty where the source produced nothing or the
    /// query was blank.
    pub async fn fetch_aligned(&self, queries: &[String]) -> Vec<Vec<ScrapeResult>> {
        let mut slots = Vec::with_capacity(queries.len());
        for (position, query) in queries.iter().enumerate() {
            slots.push(self.obtain(position, queries.len(), query).await.into_vec());
        }
        slots
    }
}

/// First round: target path to queries to table.
pub struct ScrapeFetcher {
    fetcher: Fetcher,
    serializer: SerializationStrategy,
    title_serializer: Option<SerializationStrategy>,
}

impl ScrapeFetcher {
    pub fn new(source: Box<dyn SourceCapability>, serializer: SerializationStrategy) -> Self {
        Self {
            fetcher: Fetcher::new(source),
            serializer,
            title_serializer: None,
        }
    }

    /// Fill the `title` column from a second serializer of the same target.
    /// A query with no result drops its title along with it.
    #[must_use]
    pub fn with_titles(mut self, title_serializer: SerializationStrategy) -> Self {
        self.title_serializer = Some(title_serializer);
        self
    }

    pub async fn run(&self, target: &Path) -> Result<Table> {
        let queries = (self.serializer)(target)?;
        tracing::info!(
            source = self.fetcher.source_name(),
            target = %target.display(),
            queries = queries.len(),
            "Starting scrape"
        );

        let Some(title_serializer) = &self.title_serializer else {
            let results: Vec<ScrapeResult> = self.fetcher.fetch(queries).collect().await;
            return Table::from_results(&results);
        };

        let titles = title_serializer(target)?;
        if titles.len() != queries.len() {
            return Err(TableError::LengthMismatch {
                name: "title".to_string(),
                expected: queries.len(),
                actual: titles.len(),
            }
            .into());
        }

        let slots = self.fetcher.fetch_aligned(&queries).await;
        titled_table(slots, titles)
    }
}

fn titled_table(slots: Vec<Vec<ScrapeResult>>, titles: Vec<String>) -> Result<Table> {
    let mut rows = Vec::new();
    for (slot, title) in slots.into_iter().zip(titles) {
        for result in slot {
            let mut row = result.to_record()?;
            row.insert("title".to_string(), Value::from(title.clone()));
            rows.push(row);
        }
    }
    Ok(Table::from_records(rows))
}

/// Second round: derive queries from a prior table and fetch them.
pub struct StagingFetcher {
    fetcher: Fetcher,
    stager: StagingStrategy,
}

impl StagingFetcher {
    pub fn new(source: Box<dyn SourceCapability>, stager: StagingStrategy) -> Self {
        Self {
            fetcher: Fetcher::new(source),
            stager,
        }
    }

    /// Flat sets extend `prior` row by row; branching sets replace it with
    /// one table of new results tagged by provenance.
    pub async fn run(&self, prior: Table) -> Result<Table> {
        let staged = (self.stager)(&prior)?;
        staged.validate()?;
        tracing::info!(
            source = self.fetcher.source_name(),
            queries = staged.len(),
            "Starting staged fetch"
        );

        match staged {
            StagedQuerySet::Flat(queries) => {
                let slots = self.fetcher.fetch_aligned(&queries).await;
                let extension = Table::from_aligned(&slots)?;
                Ok(prior.join_columns(extension)?)
            }
            StagedQuerySet::Branching {
                queries,
                provenance,
            } => {
                let slots = self.fetcher.fetch_aligned(&queries).await;
                branch_table(slots, provenance)
            }
        }
    }
}

/// Every result row carries the provenance of the query that produced it;
/// a query with no result still contributes its provenance row.
fn branch_table(slots: Vec<Vec<ScrapeResult>>, provenance: Vec<String>) -> Result<Table> {
    let mut rows = Vec::with_capacity(slots.len());

    for (slot, origin) in slots.into_iter().zip(provenance) {
        if slot.is_empty() {
            let mut row = Record::new();
            row.insert(PROVENANCE_COLUMN.to_string(), Value::from(origin));
            rows.push(row);
            continue;
        }
        for result in slot {
            let mut row = result.to_record()?;
            row.insert(PROVENANCE_COLUMN.to_string(), Value::from(origin.clone()));
            rows.push(row);
        }
    }

    let mut table = Table::from_records(rows);
    table.move_column_last(PROVENANCE_COLUMN);
    Ok(table)
}
