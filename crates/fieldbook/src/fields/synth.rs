//! Attribute → field descriptor.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use super::validators::anchored;
use super::{FieldDescriptor, FieldKind, Filter, FormNode, SectionNode, Validator, Widget};
use crate::attributes::{Attribute, AttributeKind, StringWidget};
use crate::error::{FieldbookError, Result};

/// Choice lists longer than this render as a drop-down.
pub const LONG_LIST_THRESHOLD: usize = 10;

/// Earliest acceptable date or timestamp for `date` and `datetime` attributes.
pub const DATE_FLOOR: NaiveDate = match NaiveDate::from_ymd_opt(1899, 12, 31) {
    Some(date) => date,
    None => panic!("invalid date floor"),
};

/// Converts one attribute into a form node.
///
/// Sections recurse into their children and carry no validators. Fails only
/// when an attribute's pattern does not compile.
pub fn make_field(attribute: &Attribute) -> Result<FormNode> {
    let (kind, widget, mut validators, filters) = match &attribute.kind {
        AttributeKind::Section { children } => {
            let children = children.iter().map(make_field).collect::<Result<Vec<_>>>()?;
            return Ok(FormNode::Section(SectionNode {
                name: attribute.name.clone(),
                label: attribute.title.clone(),
                description: attribute.description.clone(),
                children,
            }));
        }

        AttributeKind::Number { decimal_places } => match decimal_places {
            Some(0) => (FieldKind::Integer, Widget::Number { step: None }, vec![], vec![]),
            places => (
                FieldKind::Decimal { places: *places },
                Widget::Number {
                    step: places.filter(|p| *p > 0).and_then(decimal_step),
                },
                vec![],
                vec![],
            ),
        },

        AttributeKind::String { widget } => (
            FieldKind::Text,
            match widget {
                Some(StringWidget::Phone) => Widget::Tel,
                Some(StringWidget::Email) => Widget::Email,
                None => Widget::TextInput,
            },
            vec![],
            vec![Filter::StripWhitespace],
        ),

        AttributeKind::Text => (
            FieldKind::Text,
            Widget::TextArea,
            vec![],
            vec![Filter::StripWhitespace],
        ),

        AttributeKind::Date => (
            FieldKind::Date,
            Widget::Date,
            vec![Validator::DateRange { min: DATE_FLOOR }],
            vec![],
        ),

        AttributeKind::DateTime => (
            FieldKind::DateTime,
            Widget::DateTime,
            vec![Validator::DateRange { min: DATE_FLOOR }],
            vec![],
        ),

        AttributeKind::Choice {
            options,
            is_collection,
        } => {
            let long_list = options.len() > LONG_LIST_THRESHOLD;
            let mut choices: Vec<(String, String)> = options
                .iter()
                .map(|option| {
                    let label = if long_list {
                        format!("{} - [ {} ]", option.title, option.name)
                    } else {
                        option.title.clone()
                    };
                    (option.name.clone(), label)
                })
                .collect();

            // Force an explicit pick on long single-select lists
            if long_list && !is_collection {
                choices.insert(0, (String::new(), String::new()));
            }

            let widget = match (long_list, is_collection) {
                (true, multiple) => Widget::Select { multiple: *multiple },
                (false, true) => Widget::CheckboxList,
                (false, false) => Widget::RadioList,
            };
            (
                FieldKind::Select {
                    choices,
                    multiple: *is_collection,
                },
                widget,
                vec![],
                vec![],
            )
        }

        AttributeKind::Blob => (FieldKind::File, Widget::File, vec![], vec![]),
    };

    validators.push(if attribute.is_required {
        Validator::required()
    } else {
        Validator::Optional
    });

    if let Some(bound) = bound_validator(attribute) {
        validators.push(bound);
    }

    if let Some(pattern) = &attribute.pattern {
        let regex = anchored(pattern).map_err(|source| FieldbookError::InvalidPattern {
            attribute: attribute.name.clone(),
            source,
        })?;
        validators.push(Validator::Regexp(regex));
    }

    Ok(FormNode::Leaf(FieldDescriptor {
        name: attribute.name.clone(),
        label: attribute.title.clone(),
        description: attribute.description.clone(),
        kind,
        filters,
        validators,
        widget,
    }))
}

/// `1 / 10^places`, rounded half-up to `places`.
fn decimal_step(places: u32) -> Option<Decimal> {
    let ten = Decimal::from(10u32);
    let mut divisor = Decimal::ONE;
    for _ in 0..places {
        divisor = divisor.checked_mul(ten)?;
    }
    Decimal::ONE
        .checked_div(divisor)
        .map(|step| step.round_dp_with_strategy(places, RoundingStrategy::MidpointAwayFromZero))
        .filter(|step| !step.is_zero())
}

/// Length bound for strings and multi-selects, value bound for numbers.
fn bound_validator(attribute: &Attribute) -> Option<Validator> {
    let (min, max) = (attribute.value_min, attribute.value_max);
    if min.is_none() && max.is_none() {
        return None;
    }

    match &attribute.kind {
        AttributeKind::String { .. } => {
            let (min, max) = (length_bound(min), length_bound(max));
            let message = match (min, max) {
                (Some(n), Some(m)) if n == m => Some(format!("Field must be exactly {} characters long.", n)),
                (Some(n), None) => Some(format!("Field must be at least {} characters long.", n)),
                (None, Some(m)) => Some(format!("Field must be at most {} characters long.", m)),
                _ => None,
            };
            Some(Validator::Length { min, max, message })
        }
        AttributeKind::Choice {
            is_collection: true,
            ..
        } => {
            let (min, max) = (length_bound(min), length_bound(max));
            let message = match (min, max) {
                (Some(n), Some(m)) if n == m => Some(format!("Field must have exactly {} selected.", n)),
                (Some(n), None) => Some(format!("Field must have at least {} selected.", n)),
                (None, Some(m)) => Some(format!("Field must have at most {} selected.", m)),
                _ => None,
            };
            Some(Validator::Length { min, max, message })
        }
        AttributeKind::Number { .. } => {
            let message = match (min, max) {
                (Some(n), Some(m)) if n == m => Some(format!("Number must be {}.", n)),
                _ => None,
            };
            Some(Validator::NumberRange {
                min: min.map(Decimal::from),
                max: max.map(Decimal::from),
                message,
            })
        }
        _ => None,
    }
}

/// Negative length bounds mean "no bound".
fn length_bound(bound: Option<i64>) -> Option<usize> {
    bound.and_then(|b| usize::try_from(b).ok())
}
