//! Serializers turn a target path into queries; stagers derive a second
//! round of queries from an assembled table.

use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fetch::StagedQuerySet;
use crate::table::{read_csv_column, Table};

pub type SerializationStrategy = Box<dyn Fn(&Path) -> Result<Vec<String>> + Send + Sync>;

pub type StagingStrategy = Box<dyn Fn(&Table) -> Result<StagedQuerySet> + Send + Sync>;

/// One query per non-blank line.
#[must_use]
pub fn lines() -> SerializationStrategy {
    Box::new(|path: &Path| -> Result<Vec<String>> {
        let text = std::fs::read_to_string(path)?;
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    })
}

/// Non-blank values of one column of a comma-separated file.
#[must_use]
pub fn csv_column(column: impl Into<String>) -> SerializationStrategy {
    let column = column.into();
    Box::new(move |path: &Path| -> Result<Vec<String>> {
        Ok(read_csv_column(path, &column)?
            .into_iter()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .collect())
    })
}

/// Every `*.pdf` in a directory, sorted by path.
#[must_use]
pub fn pdf_directory() -> SerializationStrategy {
    Box::new(|dir: &Path| -> Result<Vec<String>> {
        Ok(pdf_paths(dir)?
            .into_iter()
            .map(|path| path.display().to_string())
            .collect())
    })
}

/// File stems of [`pdf_directory`], in the same order.
#[must_use]
pub fn pdf_titles() -> SerializationStrategy {
    Box::new(|dir: &Path| -> Result<Vec<String>> {
        Ok(pdf_paths(dir)?
            .iter()
            .filter_map(|path| path.file_stem())
            .map(|stem| stem.to_string_lossy().into_owned())
            .collect())
    })
}

fn pdf_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    tracing::debug!(dir = %dir.display(), files = paths.len(), "Found PDFs");
    Ok(paths)
}

/// Flat: each row's abstract, empty where the row has none.
#[must_use]
pub fn stage_abstracts() -> StagingStrategy {
    Box::new(|table: &Table| Ok(StagedQuerySet::Flat(column_text(table, "abstract"))))
}

/// Flat: each row's DOI, empty where the row has none.
#[must_use]
pub fn stage_dois() -> StagingStrategy {
    Box::new(|table: &Table| Ok(StagedQuerySet::Flat(column_text(table, "doi"))))
}

/// Branching: every citation id of every row, tagged with that row's title.
#[must_use]
pub fn stage_citations() -> StagingStrategy {
    Box::new(|table: &Table| -> Result<StagedQuerySet> {
        let mut queries = Vec::new();
        let mut provenance = Vec::new();

        for row in table.rows() {
            let Some(Value::Array(citations)) = row.get("citations") else {
                continue;
            };
            let title = row.get("title").and_then(Value::as_str).unwrap_or_default();

            for id in citations.iter().filter_map(Value::as_str) {
                queries.push(id.to_string());
                provenance.push(title.to_string());
            }
        }

        Ok(StagedQuerySet::Branching {
            queries,
            provenance,
        })
    })
}

fn column_text(table: &Table, name: &str) -> Vec<String> {
    table
        .column(name)
        .into_iter()
        .map(|cell| match cell {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Record;
    use serde_json::json;
    use tempfile::TempDir;

    fn table(rows: Vec<Value>) -> Table {
        Table::from_records(
            rows.into_iter()
                .filter_map(|v| match v {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect::<Vec<Record>>(),
        )
    }

    #[test]
    fn test_lines_skips_blanks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("queries.txt");
        std::fs::write(&path, "protein folding\n\n  10.1000/x  \n").unwrap();

        let queries = lines()(path.as_path()).unwrap();

        assert_eq!(queries, vec!["protein folding", "10.1000/x"]);
    }

    #[test]
    fn test_csv_column() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("in.csv");
        std::fs::write(&path, "title,doi\na,10.1/a\nb,\nc,10.1/c\n").unwrap();

        let queries = csv_column("doi")(path.as_path()).unwrap();

        assert_eq!(queries, vec!["10.1/a", "10.1/c"]);
    }

    #[test]
    fn test_pdf_directory_and_titles_align() {
        let dir = TempDir::new().unwrap();
        for name in ["b.pdf", "a.PDF", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"%PDF").unwrap();
        }

        let paths = pdf_directory()(dir.path()).unwrap();
        let titles = pdf_titles()(dir.path()).unwrap();

        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("a.PDF"));
        assert_eq!(titles, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        assert!(pdf_directory()(Path::new("/nonexistent/sciscrape")).is_err());
    }

    #[test]
    fn test_stage_abstracts_one_query_per_row() {
        let t = table(vec![
            json!({"title": "a", "abstract": "We fold."}),
            json!({"title": "b"}),
            json!({"title": "c", "abstract": null}),
        ]);

        let staged = stage_abstracts()(&t).unwrap();

        assert_eq!(
            staged,
            StagedQuerySet::Flat(vec!["We fold.".into(), String::new(), String::new()])
        );
    }

    #[test]
    fn test_stage_citations_tags_provenance() {
        let t = table(vec![
            json!({"title": "Parent A", "citations": ["pub.1", "pub.2"]}),
            json!({"title": "Parent B", "citations": []}),
            json!({"title": "Parent C", "citations": ["pub.3"]}),
        ]);

        let staged = stage_citations()(&t).unwrap();

        assert_eq!(
            staged,
            StagedQuerySet::Branching {
                queries: vec!["pub.1".into(), "pub.2".into(), "pub.3".into()],
                provenance: vec!["Parent A".into(), "Parent A".into(), "Parent C".into()],
            }
        );
        assert!(staged.validate().is_ok());
    }

    #[test]
    fn test_stage_dois() {
        let t = table(vec![json!({"doi": "10.1/a"}), json!({"doi": ""})]);

        assert_eq!(stage_dois()(&t).unwrap().len(), 2);
    }
}
