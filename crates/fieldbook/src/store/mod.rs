//! # Catalog Layer
//!
//! Schemas and workflow states are owned by an external persistence engine.
//! This module defines the narrow [`Catalog`] interface the rest of the crate
//! reads them through.
//!
//! ## Lookup Contract
//!
//! - [`Catalog::find_schemas`] returns rows for one schema name, filtered by
//!   [`SchemaFilter`], ordered by publish date ascending.
//! - [`Catalog::find_states`] returns state rows whose name is in the given
//!   set, ordered by title.
//! - [`one_schema`] and [`one_state`] enforce "exactly one row": zero rows is
//!   `NoResultFound`, several is `MultipleResultsFound`. Callers propagate both.
//!
//! ## Implementations
//!
//! - [`memory::MemoryCatalog`]: in-memory rows, used by tests and embedders
//!   that keep schemas in process.

use chrono::NaiveDate;

use crate::error::{FieldbookError, Result};
use crate::model::{Schema, State};
use crate::workflow::StateName;

pub mod memory;

/// Row filter for [`Catalog::find_schemas`]. All set conditions must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaFilter {
    pub version: Option<NaiveDate>,
    pub versions_in: Option<Vec<NaiveDate>>,
    pub active_only: bool,
}

impl SchemaFilter {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn version(version: NaiveDate) -> Self {
        Self {
            version: Some(version),
            ..Self::default()
        }
    }

    pub fn versions_in(mut self, versions: Vec<NaiveDate>) -> Self {
        self.versions_in = Some(versions);
        self
    }

    pub fn active_only(mut self) -> Self {
        self.active_only = true;
        self
    }

    pub fn matches(&self, schema: &Schema) -> bool {
        if let Some(version) = self.version {
            if schema.publish_date != version {
                return false;
            }
        }
        if let Some(versions) = &self.versions_in {
            if !versions.contains(&schema.publish_date) {
                return false;
            }
        }
        !(self.active_only && schema.is_retracted())
    }
}

/// Read access to schema and state rows.
pub trait Catalog {
    /// Schema rows named `name` that satisfy `filter`, oldest version first.
    fn find_schemas(&self, name: &str, filter: &SchemaFilter) -> Result<Vec<Schema>>;

    /// State rows whose name is in `names`, ordered by title.
    fn find_states(&self, names: &[StateName]) -> Result<Vec<State>>;
}

/// Exactly one schema row for `name` at `version`.
pub fn one_schema<C: Catalog + ?Sized>(catalog: &C, name: &str, version: NaiveDate) -> Result<Schema> {
    let rows = catalog.find_schemas(name, &SchemaFilter::version(version))?;
    exactly_one(rows, || format!("schema '{}' version {}", name, version))
}

/// Exactly one state row named `name`.
pub fn one_state<C: Catalog + ?Sized>(catalog: &C, name: StateName) -> Result<State> {
    let rows = catalog.find_states(&[name])?;
    exactly_one(rows, || format!("state '{}'", name))
}

fn exactly_one<T>(mut rows: Vec<T>, describe: impl FnOnce() -> String) -> Result<T> {
    match rows.len() {
        0 => Err(FieldbookError::NoResultFound(describe())),
        1 => Ok(rows.remove(0)),
        _ => Err(FieldbookError::MultipleResultsFound(describe())),
    }
}
