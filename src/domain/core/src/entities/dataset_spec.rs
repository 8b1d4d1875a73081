// Copyright Kamu Data, Inc. and contributors. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Name of a registered dataset. Doubles as the `{dataset}` path segment of
/// the partition prefix, so the character set is restricted to what is safe
/// in both SQL identifiers and object store keys.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatasetName(String);

impl DatasetName {
    pub fn new_unchecked(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn is_valid(s: &str) -> bool {
        !s.is_empty()
            && s.chars().next().is_some_and(|c| c.is_ascii_lowercase())
            && s.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    }
}

impl FromStr for DatasetName {
    type Err = InvalidDatasetNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if Self::is_valid(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidDatasetNameError {
                name: s.to_string(),
            })
        }
    }
}

impl fmt::Display for DatasetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DatasetName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Error, Debug)]
#[error("Invalid dataset name: '{name}'")]
pub struct InvalidDatasetNameError {
    pub name: String,
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Extraction specification of one registered dataset. Immutable; identity is
/// [`DatasetSpec::name`].
#[derive(Clone, Debug)]
pub struct DatasetSpec {
    pub name: DatasetName,
    pub query: QueryTemplate,
    /// Column bounding the incremental window. `None` means every run takes a
    /// full snapshot.
    pub watermark_column: Option<String>,
}

impl DatasetSpec {
    pub fn snapshot(name: &str, query: QueryTemplate) -> Self {
        Self {
            name: DatasetName::new_unchecked(name),
            query,
            watermark_column: None,
        }
    }

    pub fn incremental(name: &str, query: QueryTemplate, watermark_column: &str) -> Self {
        Self {
            name: DatasetName::new_unchecked(name),
            query,
            watermark_column: Some(watermark_column.to_string()),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// Declarative form of a dataset's extraction query. Rendering keeps the
/// projection order - it becomes the column order of the landed file.
#[derive(Clone, Debug)]
pub struct QueryTemplate {
    /// Select list, verbatim (may contain casts and JSONB operators)
    pub projection: String,
    /// Schema-qualified relation to select from
    pub relation: String,
    /// Static predicate applied on every run
    pub filter: Option<String>,
}

impl QueryTemplate {
    pub fn new(projection: &str, relation: &str) -> Self {
        Self {
            projection: projection.to_string(),
            relation: relation.to_string(),
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: &str) -> Self {
        self.filter = Some(filter.to_string());
        self
    }

    pub fn render(&self, watermark_predicate: Option<String>) -> String {
        let mut predicates: Vec<String> = Vec::new();
        if let Some(filter) = &self.filter {
            predicates.push(filter.clone());
        }
        if let Some(watermark) = watermark_predicate {
            predicates.push(watermark);
        }

        if predicates.is_empty() {
            format!("SELECT {} FROM {}", self.projection, self.relation)
        } else {
            format!(
                "SELECT {} FROM {} WHERE {}",
                self.projection,
                self.relation,
                predicates.join(" AND "),
            )
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

/// How the lower bound of an incremental window is computed.
///
/// The default strategy delegates the bound to the source: the predicate
/// embeds a sub-query over the job log. Window correctness then relies on the
/// job-log writer recording its start marker before the extraction snapshot
/// is taken; rows mutated between marker write and snapshot are only picked
/// up by the next run's wider window.
#[derive(Clone, Debug)]
pub enum WatermarkStrategy {
    /// Bound is `max(step_datetime)` of the start marker in the job log,
    /// computed server-side within the extraction query itself
    JobLogHighWater {
        job_relation: String,
        start_marker: String,
    },
    /// Bound is a timestamp supplied by the caller
    Since(DateTime<Utc>),
}

impl Default for WatermarkStrategy {
    fn default() -> Self {
        Self::JobLogHighWater {
            job_relation: "strix.job".to_string(),
            start_marker: "job start".to_string(),
        }
    }
}

impl WatermarkStrategy {
    pub fn render_predicate(&self, column: &str) -> String {
        match self {
            Self::JobLogHighWater {
                job_relation,
                start_marker,
            } => format!(
                "{column} >= (SELECT max(j1.step_datetime) FROM {job_relation} j1 WHERE j1.step \
                 = '{start_marker}')"
            ),
            Self::Since(bound) => format!(
                "{column} >= TIMESTAMPTZ '{}'",
                bound.to_rfc3339_opts(SecondsFormat::Secs, true)
            ),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn dataset_name_validation() {
        assert!("vehicles".parse::<DatasetName>().is_ok());
        assert!("job_log2".parse::<DatasetName>().is_ok());
        assert!("".parse::<DatasetName>().is_err());
        assert!("Vehicles".parse::<DatasetName>().is_err());
        assert!("1vehicles".parse::<DatasetName>().is_err());
        assert!("vehi cles".parse::<DatasetName>().is_err());
    }

    #[test]
    fn renders_plain_snapshot_query() {
        let q = QueryTemplate::new("id, make, model", "strix.vvehicle");
        assert_eq!(q.render(None), "SELECT id, make, model FROM strix.vvehicle");
    }

    #[test]
    fn renders_filter_and_watermark_joined_with_and() {
        let q = QueryTemplate::new("id", "strix.thing")
            .with_filter("(thing.data ->> 'type') = 'mrn:things:flex'");
        let rendered = q.render(Some(
            WatermarkStrategy::default().render_predicate("thing.last_update_datetime"),
        ));
        assert_eq!(
            rendered,
            "SELECT id FROM strix.thing WHERE (thing.data ->> 'type') = 'mrn:things:flex' AND \
             thing.last_update_datetime >= (SELECT max(j1.step_datetime) FROM strix.job j1 WHERE \
             j1.step = 'job start')"
        );
    }

    #[test]
    fn renders_explicit_bound() {
        let bound = Utc.with_ymd_and_hms(2024, 1, 15, 6, 30, 0).unwrap();
        let predicate = WatermarkStrategy::Since(bound).render_predicate("last_update_datetime");
        assert_eq!(
            predicate,
            "last_update_datetime >= TIMESTAMPTZ '2024-01-15T06:30:00Z'"
        );
    }
}
