//! # Field Synthesis
//!
//! Turns attributes into field descriptors: a label, a filter pipeline, a
//! validator list and presentation hints. The resulting [`FormNode`] tree has
//! the same shape as the attribute tree (sections become nested nodes).
//!
//! Fields are immutable once built. Processing a submission happens in two
//! steps:
//!
//! 1. [`FieldDescriptor::bind`] filters and coerces the raw input into a
//!    [`Bound`] value. Coercion problems are remembered, not reported.
//! 2. [`FieldDescriptor::check`] runs the validator chain over a bound value
//!    and returns the error messages. Forms skip this step when a
//!    short-circuit rule applies.

mod filter;
mod html;
mod synth;
mod validators;

pub use filter::{strip_whitespace, Filter};
pub use html::{field_attributes, FieldAttributes};
pub use synth::{make_field, DATE_FLOOR, LONG_LIST_THRESHOLD};
pub use validators::{anchored, Validator, REQUIRED_MESSAGE};

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::attributes::Value;
use crate::input::{Input, Upload};
use crate::record::Entry;

/// What kind of value a field collects.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Integer,
    /// `places` is the declared precision, used for display rounding
    Decimal {
        places: Option<u32>,
    },
    Text,
    Date,
    DateTime,
    Select {
        /// `(token, label)` pairs in display order
        choices: Vec<(String, String)>,
        multiple: bool,
    },
    Boolean,
    File,
}

/// Presentation hint for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    TextInput,
    Tel,
    Email,
    TextArea,
    Number { step: Option<Decimal> },
    Date,
    DateTime,
    /// Drop-down list, used for long option lists
    Select { multiple: bool },
    RadioList,
    CheckboxList,
    Checkbox,
    File,
}

#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    pub description: Option<String>,
    pub kind: FieldKind,
    pub filters: Vec<Filter>,
    pub validators: Vec<Validator>,
    pub widget: Widget,
}

#[derive(Debug, Clone)]
pub struct SectionNode {
    pub name: String,
    pub label: String,
    pub description: Option<String>,
    pub children: Vec<FormNode>,
}

/// One node of a synthesized form tree.
#[derive(Debug, Clone)]
pub enum FormNode {
    Leaf(FieldDescriptor),
    Section(SectionNode),
}

impl FormNode {
    pub fn name(&self) -> &str {
        match self {
            FormNode::Leaf(field) => &field.name,
            FormNode::Section(section) => &section.name,
        }
    }

    pub fn as_leaf(&self) -> Option<&FieldDescriptor> {
        match self {
            FormNode::Leaf(field) => Some(field),
            FormNode::Section(_) => None,
        }
    }

    pub fn as_section(&self) -> Option<&SectionNode> {
        match self {
            FormNode::Section(section) => Some(section),
            FormNode::Leaf(_) => None,
        }
    }
}

/// Coerced field data.
#[derive(Debug)]
pub enum FieldData {
    Empty,
    Value(Value),
    Flag(bool),
    Upload(Upload),
}

impl FieldData {
    pub fn value(&self) -> Option<&Value> {
        match self {
            FieldData::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_entry(self) -> Entry {
        match self {
            FieldData::Empty | FieldData::Flag(_) => Entry::Value(None),
            FieldData::Value(value) => Entry::Value(Some(value)),
            FieldData::Upload(upload) => Entry::Upload(upload),
        }
    }
}

/// A field's submission after filtering and coercion.
#[derive(Debug)]
pub struct Bound {
    /// Nothing but whitespace (or nothing at all) was submitted
    pub blank: bool,
    /// Filtered first raw string, for pattern checks
    pub raw: Option<String>,
    pub data: FieldData,
    /// Coercion failure, reported only if the field is validated
    pub error: Option<String>,
}

impl FieldDescriptor {
    pub fn is_required(&self) -> bool {
        self.validators
            .iter()
            .any(|v| matches!(v, Validator::InputRequired { .. }))
    }

    /// Filters and coerces raw input.
    pub fn bind(&self, input: Option<Input>) -> Bound {
        let blank = input.as_ref().map_or(true, Input::is_blank);
        match input {
            Some(Input::File(upload)) => Bound {
                blank: false,
                raw: Some(upload.file_name.clone()),
                data: match self.kind {
                    FieldKind::File => FieldData::Upload(upload),
                    _ => FieldData::Empty,
                },
                error: match self.kind {
                    FieldKind::File => None,
                    _ => Some("Not a valid value.".to_string()),
                },
            },
            Some(Input::Many(items)) if matches!(self.kind, FieldKind::Select { multiple: true, .. }) => {
                self.bind_many(blank, items)
            }
            other => {
                let raw = other.as_ref().and_then(Input::first_text).map(str::to_string);
                let raw = self.filters.iter().fold(raw, |acc, f| f.apply(acc));
                match self.coerce(raw.as_deref()) {
                    Ok(data) => Bound {
                        blank,
                        raw,
                        data,
                        error: None,
                    },
                    Err(message) => Bound {
                        blank,
                        raw,
                        data: FieldData::Empty,
                        error: Some(message),
                    },
                }
            }
        }
    }

    fn bind_many(&self, blank: bool, items: Vec<String>) -> Bound {
        let raw = items.first().cloned();
        let items: Vec<String> = items.into_iter().filter(|s| !s.is_empty()).collect();
        let mut error = None;
        if let FieldKind::Select { choices, .. } = &self.kind {
            if let Some(bad) = items.iter().find(|v| !choices.iter().any(|(token, _)| token == *v)) {
                error = Some(format!("'{}' is not a valid choice for this field.", bad));
            }
        }
        let data = if items.is_empty() || error.is_some() {
            FieldData::Empty
        } else {
            FieldData::Value(Value::Choices(items))
        };
        Bound {
            blank,
            raw,
            data,
            error,
        }
    }

    fn coerce(&self, raw: Option<&str>) -> Result<FieldData, String> {
        if let FieldKind::Boolean = self.kind {
            return Ok(FieldData::Flag(raw.is_some_and(is_truthy)));
        }
        let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
            return Ok(FieldData::Empty);
        };
        let value = match &self.kind {
            FieldKind::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| "Not a valid integer value.".to_string())?,
            FieldKind::Decimal { .. } => Decimal::from_str(raw.trim())
                .map(Value::Decimal)
                .map_err(|_| "Not a valid decimal value.".to_string())?,
            FieldKind::Text => Value::Text(raw.to_string()),
            FieldKind::Date => parse_date(raw)
                .map(Value::Date)
                .ok_or_else(|| "Not a valid date value.".to_string())?,
            FieldKind::DateTime => parse_datetime(raw)
                .map(Value::DateTime)
                .ok_or_else(|| "Not a valid datetime value.".to_string())?,
            FieldKind::Select { choices, multiple } => {
                if !choices.iter().any(|(token, _)| token == raw) {
                    return Err("Not a valid choice.".to_string());
                }
                if *multiple {
                    Value::Choices(vec![raw.to_string()])
                } else {
                    Value::Choice(raw.to_string())
                }
            }
            FieldKind::File | FieldKind::Boolean => return Ok(FieldData::Empty),
        };
        Ok(FieldData::Value(value))
    }

    /// Runs the validator chain and returns the error messages.
    pub fn check(&self, bound: &Bound) -> Vec<String> {
        if bound.blank {
            for validator in &self.validators {
                match validator {
                    Validator::InputRequired { message } => {
                        return vec![message.clone().unwrap_or_else(|| REQUIRED_MESSAGE.to_string())];
                    }
                    Validator::Optional => return Vec::new(),
                    _ => {}
                }
            }
        }
        if let Some(error) = &bound.error {
            return vec![error.clone()];
        }
        self.validators
            .iter()
            .filter(|v| !v.is_gate())
            .filter_map(|v| v.check(bound.data.value(), bound.raw.as_deref()).err())
            .collect()
    }

    /// Renders a stored value the way the field displays it.
    ///
    /// Decimals are quantized to the declared places, rounding away from zero.
    pub fn display_value(&self, value: &Value) -> String {
        match (value, &self.kind) {
            (Value::Decimal(d), FieldKind::Decimal { places: Some(places) }) => d
                .round_dp_with_strategy(*places, RoundingStrategy::AwayFromZero)
                .to_string(),
            (Value::Integer(i), _) => i.to_string(),
            (Value::Decimal(d), _) => d.to_string(),
            (Value::Text(s), _) | (Value::Choice(s), _) => s.clone(),
            (Value::Date(d), _) => d.format("%Y-%m-%d").to_string(),
            (Value::DateTime(ts), _) => ts.format("%Y-%m-%dT%H:%M:%S").to_string(),
            (Value::Choices(items), _) => items.join(", "),
            (Value::Blob(info), _) => info.file_name.clone(),
        }
    }
}

fn is_truthy(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "" | "false" | "0" | "n" | "no" | "off"
    )
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    const FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
    let raw = raw.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    let raw = raw.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| parse_date(raw).map(|d| d.and_time(chrono::NaiveTime::MIN)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(kind: FieldKind, validators: Vec<Validator>) -> FieldDescriptor {
        FieldDescriptor {
            name: "f".into(),
            label: "F".into(),
            description: None,
            kind,
            filters: vec![Filter::StripWhitespace],
            validators,
            widget: Widget::TextInput,
        }
    }

    #[test]
    fn blank_required_field_reports_required() {
        let f = field(FieldKind::Text, vec![Validator::required()]);
        let bound = f.bind(Some(Input::text("   ")));
        assert_eq!(f.check(&bound), vec![REQUIRED_MESSAGE.to_string()]);
    }

    #[test]
    fn missing_optional_field_passes() {
        let f = field(
            FieldKind::Integer,
            vec![
                Validator::Optional,
                Validator::NumberRange {
                    min: Some(Decimal::from(1)),
                    max: None,
                    message: None,
                },
            ],
        );
        let bound = f.bind(None);
        assert!(f.check(&bound).is_empty());
        assert!(matches!(bound.data, FieldData::Empty));
    }

    #[test]
    fn coercion_error_is_reported_on_check() {
        let f = field(FieldKind::Integer, vec![Validator::Optional]);
        let bound = f.bind(Some(Input::text("seven")));
        assert_eq!(f.check(&bound), vec!["Not a valid integer value."]);
    }

    #[test]
    fn text_is_stripped() {
        let f = field(FieldKind::Text, vec![Validator::Optional]);
        let bound = f.bind(Some(Input::text("  hi  ")));
        assert_eq!(bound.data.value(), Some(&Value::text("hi")));
    }

    #[test]
    fn whitespace_text_becomes_no_value() {
        let f = field(FieldKind::Text, vec![Validator::Optional]);
        let bound = f.bind(Some(Input::text("   ")));
        assert!(matches!(bound.data, FieldData::Empty));
    }

    #[test]
    fn dates_accept_common_formats() {
        let f = field(FieldKind::Date, vec![Validator::Optional]);
        let expected = Value::Date(NaiveDate::from_ymd_opt(2015, 4, 2).unwrap());
        assert_eq!(f.bind(Some(Input::text("2015-04-02"))).data.value(), Some(&expected));
        assert_eq!(f.bind(Some(Input::text("04/02/2015"))).data.value(), Some(&expected));
    }

    #[test]
    fn datetimes_accept_html5_format() {
        let f = field(FieldKind::DateTime, vec![Validator::Optional]);
        let bound = f.bind(Some(Input::text("2015-04-02T13:30")));
        let expected = NaiveDate::from_ymd_opt(2015, 4, 2)
            .unwrap()
            .and_hms_opt(13, 30, 0)
            .unwrap();
        assert_eq!(bound.data.value(), Some(&Value::DateTime(expected)));
    }

    #[test]
    fn select_rejects_unknown_token() {
        let f = field(
            FieldKind::Select {
                choices: vec![("001".into(), "Yes".into())],
                multiple: false,
            },
            vec![Validator::Optional],
        );
        assert_eq!(
            f.check(&f.bind(Some(Input::text("999")))),
            vec!["Not a valid choice."]
        );
        assert_eq!(
            f.bind(Some(Input::text("001"))).data.value(),
            Some(&Value::Choice("001".into()))
        );
    }

    #[test]
    fn empty_token_coerces_to_no_selection() {
        let f = field(
            FieldKind::Select {
                choices: vec![(String::new(), String::new()), ("001".into(), "Yes".into())],
                multiple: false,
            },
            vec![Validator::Optional],
        );
        let bound = f.bind(Some(Input::text("")));
        assert!(matches!(bound.data, FieldData::Empty));
    }

    #[test]
    fn multi_select_collects_tokens() {
        let f = field(
            FieldKind::Select {
                choices: vec![("a".into(), "A".into()), ("b".into(), "B".into())],
                multiple: true,
            },
            vec![Validator::Optional],
        );
        let bound = f.bind(Some(Input::many(["a", "b"])));
        assert_eq!(
            bound.data.value(),
            Some(&Value::Choices(vec!["a".into(), "b".into()]))
        );
        let bad = f.bind(Some(Input::many(["a", "z"])));
        assert_eq!(f.check(&bad), vec!["'z' is not a valid choice for this field."]);
    }

    #[test]
    fn file_field_keeps_upload() {
        let f = field(FieldKind::File, vec![Validator::required()]);
        let bound = f.bind(Some(Input::File(Upload::from_bytes("a.pdf", "x"))));
        assert!(f.check(&bound).is_empty());
        assert!(matches!(bound.data, FieldData::Upload(_)));
        let missing = f.bind(None);
        assert_eq!(f.check(&missing), vec![REQUIRED_MESSAGE.to_string()]);
    }

    #[test]
    fn boolean_reads_checkbox_values() {
        let f = field(FieldKind::Boolean, vec![]);
        assert!(matches!(f.bind(Some(Input::text("y"))).data, FieldData::Flag(true)));
        assert!(matches!(f.bind(Some(Input::text("false"))).data, FieldData::Flag(false)));
        assert!(matches!(f.bind(None).data, FieldData::Flag(false)));
    }

    #[test]
    fn display_value_rounds_away_from_zero() {
        let f = field(FieldKind::Decimal { places: Some(2) }, vec![]);
        assert_eq!(f.display_value(&Value::Decimal(Decimal::new(12341, 4))), "1.24");
        assert_eq!(f.display_value(&Value::Decimal(Decimal::new(-12341, 4))), "-1.24");
    }
}
