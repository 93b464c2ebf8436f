//! # Entity Data Binder
//!
//! Moves data between an [`Entity`] and the nested [`Record`] that forms
//! produce and consume.
//!
//! - [`entity_data`] serializes an entity for editing.
//! - [`apply_data`] writes an edited record back.
//!
//! ## Apply Rules
//!
//! | Step | Rule |
//! |------|------|
//! | 1 | An empty upload path fails before anything else happens. |
//! | 2 | The next state is the workflow block's choice, or `pending-review` without one. |
//! | 3 | A changed state is looked up and assigned, even for complete entities. |
//! | 4 | An entity that *was* complete keeps all of its data. |
//! | 5 | The metadata block updates `not_done`, `collect_date` and the schema version. |
//! | 6 | `not_done` or a move to `pending-entry` clears every leaf. |
//! | 7 | Otherwise each leaf present in the record is written; absent keys are left alone. |
//!
//! Replacing or clearing an attachment deletes the old file.

use chrono::NaiveDate;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::attributes::{AttributeKind, Value};
use crate::blob::{BlobFs, BlobStore, MimeSniffer};
use crate::error::{FieldbookError, Result};
use crate::model::Entity;
use crate::record::{Entry, MetadataBlock, Record};
use crate::store::{one_schema, one_state, Catalog};
use crate::workflow::StateName;

/// Serializes `entity` into a nested record with a metadata block.
pub fn entity_data(entity: &Entity) -> Record {
    let mut record = Record::new();
    record.metadata = Some(MetadataBlock {
        state: entity.state_name(),
        not_done: entity.not_done,
        collect_date: entity.collect_date,
        version: entity.schema.version(),
    });

    entity.schema.for_each_leaf(|leaf| {
        let path: Vec<&str> = leaf.path.iter().map(|a| a.name.as_str()).collect();
        record.insert_leaf(&path, leaf.name(), Entry::Value(entity.get(leaf.name()).cloned()));
    });

    record
}

struct LeafSlot {
    path: Vec<String>,
    name: String,
    is_blob: bool,
}

/// Applies an edited record to `entity`, storing uploads under `upload_path`.
pub fn apply_data<C, F, S>(
    catalog: &C,
    blobs: &BlobStore<F, S>,
    entity: &mut Entity,
    mut record: Record,
    upload_path: &Path,
) -> Result<()>
where
    C: Catalog + ?Sized,
    F: BlobFs,
    S: MimeSniffer,
{
    if upload_path.as_os_str().is_empty() {
        return Err(FieldbookError::MissingUploadPath);
    }

    let previous = entity.state_name();
    let next = match record.workflow {
        Some(block) => block
            .state
            .ok_or_else(|| FieldbookError::NoResultFound("state ''".to_string()))?,
        None => StateName::PendingReview,
    };

    if previous != Some(next) {
        debug!(?previous, %next, "Reassigning entity state");
        entity.state = Some(one_state(catalog, next)?);
    }

    if previous == Some(StateName::Complete) {
        return Ok(());
    }

    if let Some(metadata) = record.metadata.take() {
        entity.not_done = next != StateName::PendingEntry && metadata.not_done;
        entity.collect_date = metadata.collect_date;
        let version = NaiveDate::from_str(&metadata.version).map_err(|_| {
            FieldbookError::NoResultFound(format!(
                "schema '{}' version '{}'",
                entity.schema.name, metadata.version
            ))
        })?;
        entity.schema = one_schema(catalog, &entity.schema.name, version)?;
    }

    let clear_data = entity.not_done || next == StateName::PendingEntry;

    let mut slots = Vec::new();
    entity.schema.for_each_leaf(|leaf| {
        slots.push(LeafSlot {
            path: leaf.path.iter().map(|a| a.name.clone()).collect(),
            name: leaf.name().to_string(),
            is_blob: matches!(leaf.attribute.kind, AttributeKind::Blob),
        })
    });

    for slot in slots {
        if clear_data {
            replace_value(blobs, entity, &slot.name, None)?;
            continue;
        }

        let path: Vec<&str> = slot.path.iter().map(String::as_str).collect();
        let Some(entry) = record.take_leaf(&path, &slot.name) else {
            continue;
        };

        if slot.is_blob {
            apply_blob(blobs, entity, &slot.name, entry, upload_path)?;
        } else {
            let value = match entry {
                Entry::Value(value) => value,
                Entry::Upload(_) | Entry::Section(_) => None,
            };
            entity.set(&slot.name, value);
        }
    }

    Ok(())
}

fn apply_blob<F: BlobFs, S: MimeSniffer>(
    blobs: &BlobStore<F, S>,
    entity: &mut Entity,
    name: &str,
    entry: Entry,
    upload_path: &Path,
) -> Result<()> {
    let value = match entry {
        Entry::Upload(mut upload) => Some(Value::Blob(blobs.store(&mut upload, upload_path)?)),
        // Resubmitted descriptor, e.g. from entity_data
        Entry::Value(Some(Value::Blob(info)))
            if entity.get(name).and_then(Value::as_blob) == Some(&info) =>
        {
            return Ok(());
        }
        _ => None,
    };
    replace_value(blobs, entity, name, value)
}

/// Sets a leaf and deletes the attachment it referenced before, if any.
fn replace_value<F: BlobFs, S: MimeSniffer>(
    blobs: &BlobStore<F, S>,
    entity: &mut Entity,
    name: &str,
    value: Option<Value>,
) -> Result<()> {
    let old = entity.get(name).and_then(Value::as_blob).cloned();
    entity.set(name, value);
    if let Some(old) = old {
        blobs.remove(&old)?;
    }
    Ok(())
}
