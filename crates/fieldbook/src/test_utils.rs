use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::attributes::{Attribute, AttributeKind, ChoiceOption, StringWidget};
use crate::blob::BlobStore;
use crate::input::{FormInput, Input};
use crate::model::Schema;
use crate::record::METADATA_KEY;
use crate::store::memory::MemoryCatalog;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn vitals_attributes() -> Vec<Attribute> {
    vec![
        Attribute::new("pulse", "Pulse", AttributeKind::Number { decimal_places: Some(0) })
            .required()
            .bounded(Some(30), Some(250)),
        Attribute::section(
            "contact",
            "Contact",
            vec![
                Attribute::new(
                    "phone",
                    "Phone",
                    AttributeKind::String {
                        widget: Some(StringWidget::Phone),
                    },
                ),
                Attribute::new(
                    "email",
                    "Email",
                    AttributeKind::String {
                        widget: Some(StringWidget::Email),
                    },
                ),
            ],
        ),
        Attribute::new(
            "symptoms",
            "Symptoms",
            AttributeKind::Choice {
                options: vec![
                    ChoiceOption::new("001", "Fever"),
                    ChoiceOption::new("002", "Cough"),
                ],
                is_collection: true,
            },
        ),
        Attribute::new("scan", "Scan", AttributeKind::Blob),
    ]
}

/// `vitals`, published 2015-01-01.
pub fn sample_schema() -> Schema {
    Schema::new("vitals", "Vitals", date(2015, 1, 1)).with_attributes(vitals_attributes())
}

/// Default states plus three `vitals` rows: 2013 (retracted), 2014 and 2015.
pub fn sample_catalog() -> MemoryCatalog {
    let mut catalog = MemoryCatalog::with_default_states();
    catalog.add_schema(
        Schema::new("vitals", "Vitals (2013)", date(2013, 1, 1))
            .with_attributes(vitals_attributes())
            .retracted(date(2013, 6, 1)),
    );
    catalog.add_schema(
        Schema::new("vitals", "Vitals (2014)", date(2014, 1, 1)).with_attributes(vitals_attributes()),
    );
    catalog.add_schema(sample_schema());
    catalog
}

/// A metadata input group with a collect date and version.
pub fn metadata_input(collect_date: &str, version: &str) -> FormInput {
    FormInput::new().with(
        METADATA_KEY,
        Input::Group(
            FormInput::new()
                .with("collect_date", Input::text(collect_date))
                .with("version", Input::text(version)),
        ),
    )
}

pub struct TestEnv {
    // Keeps the directory alive for the duration of the test
    pub _temp_dir: TempDir,
    pub catalog: MemoryCatalog,
    pub blobs: BlobStore,
    pub upload_root: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let upload_root = temp_dir.path().join("uploads");
        Self {
            _temp_dir: temp_dir,
            catalog: sample_catalog(),
            blobs: BlobStore::default(),
            upload_root,
        }
    }

    pub fn uploads(&self) -> &Path {
        &self.upload_root
    }
}
