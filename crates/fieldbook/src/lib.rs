//! # Fieldbook Architecture
//!
//! Fieldbook turns versioned, declarative data-collection schemas into forms,
//! validates submissions against them, and writes the results back onto
//! entities. It is a **library**: it never renders markup, never runs queries
//! and never installs a logger. Those are the embedder's job and reach the
//! crate through small traits.
//!
//! ## Data Flow
//!
//! ```text
//! ┌──────────────────┐    ┌────────────────┐    ┌───────────────┐
//! │ Attribute tree   │──► │ Field synthesis│──► │ Form assembly │
//! │ (attributes/)    │    │ (fields/)      │    │ (forms/)      │
//! └──────────────────┘    └────────────────┘    └───────┬───────┘
//!                                                       │ Submission
//!                                                       ▼
//! ┌──────────────────┐    ┌────────────────┐    ┌───────────────┐
//! │ Entity           │◄── │ Entity binder  │◄── │ Record        │
//! │ (model.rs)       │    │ (binder.rs)    │    │ (record.rs)   │
//! └──────────────────┘    └───────┬────────┘    └───────────────┘
//!                                 │ uploads
//!                                 ▼
//!                         ┌────────────────┐
//!                         │ Blob store     │
//!                         │ (blob/)        │
//!                         └────────────────┘
//! ```
//!
//! ## Workflow
//!
//! Entities move through `pending-entry`, `pending-review`,
//! `pending-correction` and `complete` (see [`workflow`]). Forms only offer
//! the transitions the table allows, and a complete entity is read-only: the
//! binder still records a state change but leaves its data untouched.
//!
//! ## Collaborators
//!
//! | Trait | Purpose | Provided |
//! |-------|---------|----------|
//! | [`store::Catalog`] | schema and state lookups | [`store::memory::MemoryCatalog`] |
//! | [`blob::BlobFs`] | attachment file I/O | [`blob::OsFs`] |
//! | [`blob::MimeSniffer`] | MIME detection | [`blob::MagicSniffer`] |
//! | [`forms::RenderSink`] | markup generation | none |
//!
//! ## Module Overview
//!
//! - [`attributes`]: attribute tree and stored value types
//! - [`fields`]: attribute → field descriptor compilation, validators
//! - [`forms`]: composite forms, submission handling, render hand-off
//! - [`binder`]: `entity_data` / `apply_data`
//! - [`blob`]: atomic attachment storage
//! - [`versions`]: schema rows grouped for listings
//! - [`config`]: settings loaded with `confique`

pub mod attributes;
pub mod binder;
pub mod blob;
pub mod config;
pub mod error;
pub mod fields;
pub mod forms;
pub mod input;
pub mod model;
pub mod record;
pub mod store;
pub mod versions;
pub mod workflow;

#[cfg(test)]
pub(crate) mod test_utils;

pub use binder::{apply_data, entity_data};
pub use error::{FieldbookError, Result};
pub use forms::{make_form, make_longform, Form, FormOptions, Submission};
