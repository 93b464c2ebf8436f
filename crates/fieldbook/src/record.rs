//! The nested record exchanged between forms and the entity binder.
//!
//! A [`Record`] mirrors the attribute tree: leaves sit under the key of each
//! enclosing section. Two reserved blocks ride alongside the fields, the
//! metadata block and the workflow block; they are typed here instead of
//! living under magic keys, but forms still read them from the reserved
//! input groups [`METADATA_KEY`] and [`WORKFLOW_KEY`].

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::attributes::Value;
use crate::input::Upload;
use crate::workflow::StateName;

pub const METADATA_KEY: &str = "_metadata";
pub const WORKFLOW_KEY: &str = "_workflow";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataBlock {
    /// Only filled in by serialization; ignored when applied
    pub state: Option<StateName>,
    pub not_done: bool,
    pub collect_date: Option<NaiveDate>,
    /// Schema publish date, as a string
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowBlock {
    pub state: Option<StateName>,
}

pub type Fields = BTreeMap<String, Entry>;

#[derive(Debug)]
pub enum Entry {
    Value(Option<Value>),
    /// A fresh attachment waiting to be stored
    Upload(Upload),
    Section(Fields),
}

impl Entry {
    pub fn value(&self) -> Option<&Value> {
        match self {
            Entry::Value(value) => value.as_ref(),
            _ => None,
        }
    }
}

impl From<Value> for Entry {
    fn from(value: Value) -> Self {
        Entry::Value(Some(value))
    }
}

#[derive(Debug, Default)]
pub struct Record {
    pub metadata: Option<MetadataBlock>,
    pub workflow: Option<WorkflowBlock>,
    pub fields: Fields,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// The field map for a section path, if every section on it is present.
    pub fn section(&self, path: &[&str]) -> Option<&Fields> {
        let mut fields = &self.fields;
        for key in path {
            match fields.get(*key) {
                Some(Entry::Section(inner)) => fields = inner,
                _ => return None,
            }
        }
        Some(fields)
    }

    fn section_mut(&mut self, path: &[&str]) -> Option<&mut Fields> {
        let mut fields = &mut self.fields;
        for key in path {
            match fields.get_mut(*key) {
                Some(Entry::Section(inner)) => fields = inner,
                _ => return None,
            }
        }
        Some(fields)
    }

    pub fn leaf(&self, path: &[&str], name: &str) -> Option<&Entry> {
        self.section(path).and_then(|fields| fields.get(name))
    }

    /// Removes a leaf entry. `None` means the key was absent, which patch
    /// updates read as "leave unchanged".
    pub fn take_leaf(&mut self, path: &[&str], name: &str) -> Option<Entry> {
        self.section_mut(path).and_then(|fields| fields.remove(name))
    }

    /// Inserts a leaf, creating enclosing sections as needed.
    pub fn insert_leaf(&mut self, path: &[&str], name: &str, entry: Entry) {
        let mut fields = &mut self.fields;
        for key in path {
            let slot = fields
                .entry((*key).to_string())
                .or_insert_with(|| Entry::Section(Fields::new()));
            if !matches!(slot, Entry::Section(_)) {
                *slot = Entry::Section(Fields::new());
            }
            let Entry::Section(inner) = slot else {
                return;
            };
            fields = inner;
        }
        fields.insert(name.to_string(), entry);
    }
}
