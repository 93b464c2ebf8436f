//! Attribute value types.
//!
//! This module defines the runtime representation of a stored leaf value.
//! An absent value is modelled as `Option::None` by callers, never as an
//! empty variant.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Descriptor of a durably stored attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobInfo {
    /// Client-supplied file name, without any directory part
    pub file_name: String,
    /// Where the bytes live on disk
    pub path: PathBuf,
    /// Detected from the stored bytes
    pub mime_type: String,
}

impl BlobInfo {
    pub fn new(file_name: impl Into<String>, path: impl Into<PathBuf>, mime_type: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            path: path.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// A stored leaf value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Integer(i64),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// Single selection, stored as the option's opaque token
    Choice(String),
    /// Multiple selections, in submission order
    Choices(Vec<String>),
    Blob(BlobInfo),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Choice(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Integer(i) => Some(Decimal::from(*i)),
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&BlobInfo> {
        match self {
            Value::Blob(info) => Some(info),
            _ => None,
        }
    }

    /// Number of characters or selections, for length-bounded values.
    pub fn length(&self) -> Option<usize> {
        match self {
            Value::Text(s) | Value::Choice(s) => Some(s.chars().count()),
            Value::Choices(items) => Some(items.len()),
            _ => None,
        }
    }
}
