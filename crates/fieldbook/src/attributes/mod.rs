//! # Attribute Tree
//!
//! A schema version owns an ordered tree of attributes. Sections group other
//! attributes; every other attribute is a leaf that collects one value.
//!
//! | Type | Value | Settings |
//! |------|-------|----------|
//! | `section` | none | ordered children |
//! | `number` | `Integer` or `Decimal` | `decimal_places` |
//! | `string` | `Text` | `widget` (phone/email) |
//! | `text` | `Text` | |
//! | `date` | `Date` | |
//! | `datetime` | `DateTime` | |
//! | `choice` | `Choice` or `Choices` | options, `is_collection` |
//! | `blob` | `Blob` | |
//!
//! Definitions are loaded from [`AttributeDef`] records; after that the type
//! is a closed enum and every consumer matches on it exhaustively.

mod def;
mod tree;
mod value;

pub use def::{AttributeDef, ChoiceDef};
pub use tree::{walk_leaves, Attribute, AttributeKind, ChoiceOption, LeafRef, StringWidget};
pub use value::{BlobInfo, Value};
