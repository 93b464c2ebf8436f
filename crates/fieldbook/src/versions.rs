//! Schema rows grouped by name, for listing screens and JSON APIs.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::Schema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaSummary {
    pub name: String,
    /// Title of the most recent version
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionSummary {
    pub name: String,
    pub title: String,
    pub publish_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaVersions {
    pub schema: SchemaSummary,
    /// Oldest first
    pub versions: Vec<VersionSummary>,
}

/// Groups schema rows by name. Groups come out ordered by name.
pub fn group_versions(schemas: &[Schema]) -> Vec<SchemaVersions> {
    let mut groups: BTreeMap<&str, Vec<&Schema>> = BTreeMap::new();
    for schema in schemas {
        groups.entry(schema.name.as_str()).or_default().push(schema);
    }

    groups
        .into_iter()
        .filter_map(|(name, mut rows)| {
            rows.sort_by_key(|s| s.publish_date);
            let latest = rows.last()?;
            Some(SchemaVersions {
                schema: SchemaSummary {
                    name: name.to_string(),
                    title: latest.title.clone(),
                },
                versions: rows
                    .iter()
                    .map(|s| VersionSummary {
                        name: s.name.clone(),
                        title: s.title.clone(),
                        publish_date: s.publish_date,
                    })
                    .collect(),
            })
        })
        .collect()
}
