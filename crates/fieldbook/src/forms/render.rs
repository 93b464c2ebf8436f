//! Hand-off to a renderer.
//!
//! Markup is not produced here. [`render_form`] computes the disabled flags
//! and passes a [`FormView`] to whatever [`RenderSink`] the embedder provides.

use serde::Serialize;
use std::collections::BTreeMap;

use super::Form;
use crate::error::Result;
use crate::model::{Entity, Schema};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RenderFlags {
    pub disabled: bool,
    pub metadata_disabled: bool,
    pub fields_disabled: bool,
}

/// Disabled flags for rendering `entity`.
///
/// A complete entity locks the whole form; a not-collected one locks only the
/// data fields.
pub fn render_flags(entity: Option<&Entity>, disabled: bool) -> RenderFlags {
    let metadata_disabled = disabled || entity.is_some_and(Entity::is_complete);
    let fields_disabled = disabled || metadata_disabled || entity.is_some_and(|e| e.not_done);
    RenderFlags {
        disabled,
        metadata_disabled,
        fields_disabled,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub cancel_url: Option<String>,
    pub disabled: bool,
    pub show_footer: bool,
    /// Extra attributes for the form element
    pub attr: BTreeMap<String, String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            cancel_url: None,
            disabled: false,
            show_footer: true,
            attr: BTreeMap::new(),
        }
    }
}

/// Everything a renderer needs for one form.
#[derive(Debug, Clone, Copy)]
pub struct FormView<'a> {
    pub form: &'a Form,
    pub schema: &'a Schema,
    pub entity: Option<&'a Entity>,
    pub flags: RenderFlags,
    pub options: &'a RenderOptions,
}

pub trait RenderSink {
    type Output;

    fn render(&mut self, view: &FormView<'_>) -> Result<Self::Output>;
}

pub fn render_form<S: RenderSink>(
    sink: &mut S,
    form: &Form,
    entity: Option<&Entity>,
    options: &RenderOptions,
) -> Result<S::Output> {
    let view = FormView {
        form,
        schema: &form.schema,
        entity,
        flags: render_flags(entity, options.disabled),
        options,
    };
    sink.render(&view)
}
