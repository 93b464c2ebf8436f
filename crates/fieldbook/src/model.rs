//! # Domain Model
//!
//! [`Schema`] rows are versioned snapshots of an attribute tree. Several rows
//! may share a `name`; the `publish_date` tells them apart and doubles as the
//! version identifier. At most one non-retracted row per name is current, but
//! older rows stay queryable by name and date.
//!
//! An [`Entity`] is one data-collection instance bound to a specific schema
//! version. Leaf values are kept flat by leaf name; leaf names are unique
//! across a schema version, so sections only matter when building records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::attributes::{walk_leaves, Attribute, AttributeDef, LeafRef, Value};
use crate::error::Result;
use crate::workflow::StateName;

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub name: String,
    pub title: String,
    pub publish_date: NaiveDate,
    /// `None` while the version is active
    pub retract_date: Option<NaiveDate>,
    pub attributes: Vec<Attribute>,
}

impl Schema {
    pub fn new(name: impl Into<String>, title: impl Into<String>, publish_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            publish_date,
            retract_date: None,
            attributes: Vec::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: Vec<Attribute>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn retracted(mut self, on: NaiveDate) -> Self {
        self.retract_date = Some(on);
        self
    }

    pub fn is_retracted(&self) -> bool {
        self.retract_date.is_some()
    }

    /// The version identifier as exchanged in records and forms.
    pub fn version(&self) -> String {
        self.publish_date.to_string()
    }

    /// Leaf attributes in definition order, each with its section path.
    pub fn for_each_leaf<F>(&self, mut visit: F)
    where
        F: FnMut(LeafRef<'_>),
    {
        walk_leaves(&self.attributes, &mut visit);
    }

    /// Loads a schema from its JSON definition.
    ///
    /// Fails with `UnknownAttributeType` if any attribute, at any depth,
    /// declares a type this crate does not know.
    pub fn from_json(json: &str) -> Result<Self> {
        let def: SchemaDef = serde_json::from_str(json)?;
        Schema::try_from(def)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchemaDef {
    pub name: String,
    pub title: String,
    pub publish_date: NaiveDate,
    #[serde(default)]
    pub retract_date: Option<NaiveDate>,
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
}

impl TryFrom<SchemaDef> for Schema {
    type Error = crate::error::FieldbookError;

    fn try_from(def: SchemaDef) -> Result<Self> {
        let attributes = def
            .attributes
            .into_iter()
            .map(Attribute::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Schema {
            name: def.name,
            title: def.title,
            publish_date: def.publish_date,
            retract_date: def.retract_date,
            attributes,
        })
    }
}

/// A workflow state row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub name: StateName,
    pub title: String,
}

impl State {
    pub fn new(name: StateName, title: impl Into<String>) -> Self {
        Self {
            name,
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub schema: Schema,
    /// `None` until the entity is first saved, which reads as `pending-entry`
    pub state: Option<State>,
    pub not_done: bool,
    pub collect_date: Option<NaiveDate>,
    values: BTreeMap<String, Value>,
}

impl Entity {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            state: None,
            not_done: false,
            collect_date: None,
            values: BTreeMap::new(),
        }
    }

    pub fn state_name(&self) -> Option<StateName> {
        self.state.as_ref().map(|s| s.name)
    }

    pub fn is_complete(&self) -> bool {
        self.state_name() == Some(StateName::Complete)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Sets a leaf value; `None` clears it.
    pub fn set(&mut self, name: &str, value: Option<Value>) {
        match value {
            Some(value) => {
                self.values.insert(name.to_string(), value);
            }
            None => {
                self.values.remove(name);
            }
        }
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }
}
