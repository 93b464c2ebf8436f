//! HTML5 constraint hints derived from a field's validators.
//!
//! Renderers use these to mirror server-side rules in the browser. They are
//! hints only; the validator chain stays authoritative.

use rust_decimal::Decimal;
use serde::Serialize;

use super::{FieldDescriptor, Validator, Widget};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldAttributes {
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minlength: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxlength: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

pub fn field_attributes(field: &FieldDescriptor) -> FieldAttributes {
    let mut attrs = FieldAttributes {
        required: field.is_required(),
        ..FieldAttributes::default()
    };

    for validator in &field.validators {
        match validator {
            Validator::Length { min, max, .. } => {
                attrs.minlength = *min;
                attrs.maxlength = *max;
            }
            Validator::NumberRange { min, max, .. } => {
                attrs.min = *min;
                attrs.max = *max;
            }
            Validator::Regexp(regex) => {
                // Browsers anchor the pattern themselves
                let pattern = regex.as_str();
                let pattern = pattern
                    .strip_prefix("^(?:")
                    .and_then(|p| p.strip_suffix(')'))
                    .unwrap_or(pattern);
                attrs.pattern = Some(pattern.to_string());
            }
            Validator::InputRequired { .. } | Validator::Optional | Validator::DateRange { .. } => {}
        }
    }

    if let Widget::Number { step } = &field.widget {
        attrs.step = *step;
    }

    attrs
}
