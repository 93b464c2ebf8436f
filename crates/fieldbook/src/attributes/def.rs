//! Raw attribute definitions as authored outside this crate.
//!
//! Definitions arrive as loosely typed records where `type` is a free string.
//! [`Attribute::try_from`] turns them into the closed [`AttributeKind`] form;
//! an unrecognized type aborts the conversion with
//! [`FieldbookError::UnknownAttributeType`].

use serde::Deserialize;

use super::tree::{Attribute, AttributeKind, ChoiceOption, StringWidget};
use crate::error::{FieldbookError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceDef {
    pub name: String,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttributeDef {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub is_collection: bool,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub value_min: Option<i64>,
    #[serde(default)]
    pub value_max: Option<i64>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub decimal_places: Option<u32>,
    #[serde(default)]
    pub widget: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChoiceDef>,
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
}

impl TryFrom<AttributeDef> for Attribute {
    type Error = FieldbookError;

    fn try_from(def: AttributeDef) -> Result<Self> {
        let kind = match def.type_name.as_str() {
            "section" => AttributeKind::Section {
                children: def
                    .attributes
                    .into_iter()
                    .map(Attribute::try_from)
                    .collect::<Result<Vec<_>>>()?,
            },
            "number" => AttributeKind::Number {
                decimal_places: def.decimal_places,
            },
            "string" => AttributeKind::String {
                widget: match def.widget.as_deref() {
                    Some("phone") => Some(StringWidget::Phone),
                    Some("email") => Some(StringWidget::Email),
                    _ => None,
                },
            },
            "text" => AttributeKind::Text,
            "date" => AttributeKind::Date,
            "datetime" => AttributeKind::DateTime,
            "choice" => AttributeKind::Choice {
                options: def
                    .choices
                    .into_iter()
                    .map(|c| ChoiceOption::new(c.name, c.title))
                    .collect(),
                is_collection: def.is_collection,
            },
            "blob" => AttributeKind::Blob,
            other => return Err(FieldbookError::UnknownAttributeType(other.to_string())),
        };

        Ok(Attribute {
            name: def.name,
            title: def.title,
            description: def.description,
            kind,
            is_required: def.is_required,
            value_min: def.value_min,
            value_max: def.value_max,
            pattern: def.pattern.filter(|p| !p.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Attribute> {
        let def: AttributeDef = serde_json::from_str(json).unwrap();
        Attribute::try_from(def)
    }

    #[test]
    fn converts_choice_with_options() {
        let attr = parse(
            r#"{"name": "color", "title": "Color", "type": "choice", "is_collection": true,
                "choices": [{"name": "001", "title": "Red"}, {"name": "002", "title": "Blue"}]}"#,
        )
        .unwrap();
        match attr.kind {
            AttributeKind::Choice {
                options,
                is_collection,
            } => {
                assert!(is_collection);
                assert_eq!(options.len(), 2);
                assert_eq!(options[1].title, "Blue");
            }
            other => panic!("Expected choice, got {:?}", other),
        }
    }

    #[test]
    fn converts_nested_sections() {
        let attr = parse(
            r#"{"name": "vitals", "title": "Vitals", "type": "section",
                "attributes": [{"name": "weight", "title": "Weight", "type": "number", "decimal_places": 1}]}"#,
        )
        .unwrap();
        assert!(attr.is_section());
        assert_eq!(
            attr.children()[0].kind,
            AttributeKind::Number {
                decimal_places: Some(1)
            }
        );
    }

    #[test]
    fn string_widget_hints_are_recognized() {
        let attr = parse(r#"{"name": "mail", "title": "Mail", "type": "string", "widget": "email"}"#)
            .unwrap();
        assert_eq!(
            attr.kind,
            AttributeKind::String {
                widget: Some(StringWidget::Email)
            }
        );
    }

    #[test]
    fn unknown_type_is_fatal() {
        let err = parse(r#"{"name": "x", "title": "X", "type": "hologram"}"#).unwrap_err();
        assert!(matches!(err, FieldbookError::UnknownAttributeType(t) if t == "hologram"));
    }

    #[test]
    fn unknown_type_inside_section_is_fatal() {
        let err = parse(
            r#"{"name": "s", "title": "S", "type": "section",
                "attributes": [{"name": "x", "title": "X", "type": "object"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, FieldbookError::UnknownAttributeType(_)));
    }

    #[test]
    fn empty_pattern_is_dropped() {
        let attr = parse(r#"{"name": "s", "title": "S", "type": "text", "pattern": ""}"#).unwrap();
        assert_eq!(attr.pattern, None);
    }
}
