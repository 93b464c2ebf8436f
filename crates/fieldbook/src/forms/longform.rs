//! Several schemas entered on one page.

use std::collections::BTreeMap;

use super::{make_form, Form, FormOptions, Submission};
use crate::error::Result;
use crate::input::FormInput;
use crate::model::Schema;
use crate::store::Catalog;

/// Sub-forms keyed by schema name, each without metadata or workflow.
#[derive(Debug, Clone)]
pub struct LongForm {
    pub forms: BTreeMap<String, Form>,
}

impl LongForm {
    pub fn get(&self, schema_name: &str) -> Option<&Form> {
        self.forms.get(schema_name)
    }

    /// Submits each sub-form with the input group under its schema name.
    pub fn submit(&self, mut input: FormInput) -> BTreeMap<String, Submission> {
        self.forms
            .iter()
            .map(|(name, form)| (name.clone(), form.submit(input.take_group(name))))
            .collect()
    }
}

pub fn make_longform<C: Catalog + ?Sized>(catalog: &C, schemas: &[Schema]) -> Result<LongForm> {
    let options = FormOptions::default().without_metadata();
    let forms = schemas
        .iter()
        .map(|schema| Ok((schema.name.clone(), make_form(catalog, schema, None, None, &options)?)))
        .collect::<Result<BTreeMap<_, _>>>()?;
    Ok(LongForm { forms })
}
