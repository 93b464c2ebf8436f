//! # Form Assembly
//!
//! A [`Form`] composes three parts:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ _workflow  (only when transitions are asked) │
//! │   state: "", <offered states by title>       │
//! ├──────────────────────────────────────────────┤
//! │ _metadata  (unless suppressed)               │
//! │   not_done, collect_date, version            │
//! ├──────────────────────────────────────────────┤
//! │ fields     (the schema's attribute tree)     │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Version Selection
//!
//! The version selector offers the caller's allowed versions plus the
//! schema's own, deduplicated and sorted, restricted to non-retracted rows
//! that exist in the catalog. When the requested and resolved sets differ the
//! inconsistency is logged and the resolved set wins.
//!
//! If submitted input already names a version, the form is built for that
//! version instead of the one passed in.
//!
//! ## Validation
//!
//! See [`Form::submit`] for the short-circuit rules.

mod longform;
mod render;
mod submit;

pub use longform::{make_longform, LongForm};
pub use render::{render_flags, render_form, FormView, RenderFlags, RenderOptions, RenderSink};
pub use submit::{FieldErrors, Submission};

use chrono::NaiveDate;
use std::str::FromStr;
use tracing::warn;

use crate::error::{FieldbookError, Result};
use crate::fields::{make_field, FieldDescriptor, FieldKind, FormNode, Validator, Widget};
use crate::input::FormInput;
use crate::model::{Entity, Schema};
use crate::record::METADATA_KEY;
use crate::store::{one_schema, Catalog, SchemaFilter};
use crate::workflow::{StateName, TransitionMode};

/// Earliest acceptable collection date.
pub const COLLECT_DATE_FLOOR: NaiveDate = match NaiveDate::from_ymd_opt(1900, 1, 1) {
    Some(date) => date,
    None => panic!("invalid collect date floor"),
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormOptions {
    pub show_metadata: bool,
    pub transition: TransitionMode,
    /// Versions the user may switch to, besides the schema's own
    pub allowed_versions: Vec<NaiveDate>,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            show_metadata: true,
            transition: TransitionMode::None,
            allowed_versions: Vec::new(),
        }
    }
}

impl FormOptions {
    pub fn without_metadata(mut self) -> Self {
        self.show_metadata = false;
        self
    }

    pub fn transition(mut self, mode: TransitionMode) -> Self {
        self.transition = mode;
        self
    }

    pub fn allow_versions(mut self, versions: Vec<NaiveDate>) -> Self {
        self.allowed_versions = versions;
        self
    }
}

#[derive(Debug, Clone)]
pub struct MetadataForm {
    pub not_done: FieldDescriptor,
    pub collect_date: FieldDescriptor,
    pub version: FieldDescriptor,
}

#[derive(Debug, Clone)]
pub struct WorkflowForm {
    pub state: FieldDescriptor,
}

impl WorkflowForm {
    /// Offered state tokens, without the blank option.
    pub fn offered(&self) -> Vec<&str> {
        match &self.state.kind {
            FieldKind::Select { choices, .. } => choices
                .iter()
                .map(|(token, _)| token.as_str())
                .filter(|token| !token.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// A composed, immutable form for one schema version.
#[derive(Debug, Clone)]
pub struct Form {
    pub schema: Schema,
    /// State of the entity being edited, if any
    pub entity_state: Option<StateName>,
    pub metadata: Option<MetadataForm>,
    pub workflow: Option<WorkflowForm>,
    pub fields: Vec<FormNode>,
}

impl Form {
    /// Version tokens offered by the metadata sub-form.
    pub fn version_choices(&self) -> Vec<&str> {
        match self.metadata.as_ref().map(|m| &m.version.kind) {
            Some(FieldKind::Select { choices, .. }) => {
                choices.iter().map(|(token, _)| token.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Builds the composite form for `schema`.
///
/// `input`, when given, is only inspected for a metadata version override.
pub fn make_form<C: Catalog + ?Sized>(
    catalog: &C,
    schema: &Schema,
    entity: Option<&Entity>,
    input: Option<&FormInput>,
    options: &FormOptions,
) -> Result<Form> {
    let mut schema = schema.clone();
    let mut metadata = None;

    if options.show_metadata {
        if let Some(requested) = requested_version(input)? {
            schema = one_schema(catalog, &schema.name, requested)?;
        }
        metadata = Some(metadata_form(catalog, &schema, &options.allowed_versions)?);
    }

    let entity_state = entity.and_then(Entity::state_name);
    let workflow = workflow_form(catalog, options.transition.offered(entity_state))?;

    let fields = schema
        .attributes
        .iter()
        .map(make_field)
        .collect::<Result<Vec<_>>>()?;

    Ok(Form {
        schema,
        entity_state,
        metadata,
        workflow,
        fields,
    })
}

fn requested_version(input: Option<&FormInput>) -> Result<Option<NaiveDate>> {
    let Some(raw) = input
        .and_then(|i| i.group(METADATA_KEY))
        .and_then(|m| m.text("version"))
        .map(str::trim)
        .filter(|v| !v.is_empty())
    else {
        return Ok(None);
    };
    NaiveDate::from_str(raw)
        .map(Some)
        .map_err(|_| FieldbookError::NoResultFound(format!("schema version '{}'", raw)))
}

fn metadata_form<C: Catalog + ?Sized>(
    catalog: &C,
    schema: &Schema,
    allowed_versions: &[NaiveDate],
) -> Result<MetadataForm> {
    let mut requested: Vec<NaiveDate> = allowed_versions.to_vec();
    requested.push(schema.publish_date);
    requested.sort();
    requested.dedup();

    let resolved: Vec<String> = catalog
        .find_schemas(
            &schema.name,
            &SchemaFilter::any().versions_in(requested.clone()).active_only(),
        )?
        .iter()
        .map(Schema::version)
        .collect();

    if requested.len() != resolved.len() {
        let requested: Vec<String> = requested.iter().map(NaiveDate::to_string).collect();
        warn!(
            schema = %schema.name,
            ?requested,
            ?resolved,
            "Inconsistent versions"
        );
    }

    Ok(MetadataForm {
        not_done: FieldDescriptor {
            name: "not_done".into(),
            label: "Not Collected".into(),
            description: None,
            kind: FieldKind::Boolean,
            filters: vec![],
            validators: vec![],
            widget: Widget::Checkbox,
        },
        collect_date: FieldDescriptor {
            name: "collect_date".into(),
            label: "Collect Date".into(),
            description: None,
            kind: FieldKind::Date,
            filters: vec![],
            validators: vec![
                Validator::required(),
                Validator::DateRange {
                    min: COLLECT_DATE_FLOOR,
                },
            ],
            widget: Widget::Date,
        },
        version: FieldDescriptor {
            name: "version".into(),
            label: "Version".into(),
            description: None,
            kind: FieldKind::Select {
                choices: resolved.iter().map(|v| (v.clone(), v.clone())).collect(),
                multiple: false,
            },
            filters: vec![],
            validators: vec![Validator::required()],
            widget: Widget::Select { multiple: false },
        },
    })
}

fn workflow_form<C: Catalog + ?Sized>(catalog: &C, offered: Vec<StateName>) -> Result<Option<WorkflowForm>> {
    if offered.is_empty() {
        return Ok(None);
    }

    let mut choices = vec![(String::new(), String::new())];
    choices.extend(
        catalog
            .find_states(&offered)?
            .into_iter()
            .map(|state| (state.name.to_string(), state.title)),
    );

    Ok(Some(WorkflowForm {
        state: FieldDescriptor {
            name: "state".into(),
            label: "Set state to...".into(),
            description: None,
            kind: FieldKind::Select {
                choices,
                multiple: false,
            },
            filters: vec![],
            validators: vec![Validator::InputRequired {
                message: Some("Please select a state".into()),
            }],
            widget: Widget::Select { multiple: false },
        },
    }))
}
