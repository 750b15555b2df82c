use serde_json::Value;

use crate::error::{Error, Result};

/// Queries derived from a prior table for a second round of fetching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedQuerySet {
    /// One query per prior row; results extend those rows.
    Flat(Vec<String>),
    /// A new set of queries, each tagged with the prior row it came from.
    Branching {
        queries: Vec<String>,
        provenance: Vec<String>,
    },
}

impl StagedQuerySet {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Flat(queries) | Self::Branching { queries, .. } => queries.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Branching sets must carry exactly one provenance entry per query.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Branching {
                queries,
                provenance,
            } if queries.len() != provenance.len() => Err(Error::StagingLengthMismatch {
                queries: queries.len(),
                provenance: provenance.len(),
            }),
            _ => Ok(()),
        }
    }
}

/// Accepts an array of strings (flat) or an array of exactly two string
/// arrays (queries, provenance). Any other shape is rejected.
impl TryFrom<Value> for StagedQuerySet {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        let items = match value {
            Value::Array(items) => items,
            other => return Err(malformed(&other)),
        };

        if items.iter().all(Value::is_string) {
            return Ok(Self::Flat(strings(&items)));
        }

        match items.as_slice() {
            [Value::Array(queries), Value::Array(provenance)]
                if queries.iter().all(Value::is_string)
                    && provenance.iter().all(Value::is_string) =>
            {
                let staged = Self::Branching {
                    queries: strings(queries),
                    provenance: strings(provenance),
                };
                staged.validate()?;
                Ok(staged)
            }
            _ => Err(malformed(&Value::Array(items))),
        }
    }
}

fn strings(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| v.as_str().map(String::from))
        .collect()
}

fn malformed(value: &Value) -> Error {
    let shape = match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array of mixed values",
        Value::Object(_) => "an object",
    };
    Error::MalformedStagedQueries(format!(
        "expected a list of queries or a (queries, provenance) pair, got {shape}"
    ))
}
