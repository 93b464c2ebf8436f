//! Attribute definitions.
//!
//! An [`Attribute`] is one node of a schema's attribute tree: either a section
//! holding ordered children, or a leaf that collects one value. The leaf type
//! and its type-specific settings live in [`AttributeKind`], so code that
//! dispatches on the type is an exhaustive `match`.

use serde::Serialize;

/// Presentation hint for `string` attributes. Does not affect validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StringWidget {
    Phone,
    Email,
}

/// One selectable option of a `choice` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    /// Opaque token stored as the value
    pub name: String,
    pub title: String,
}

impl ChoiceOption {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
        }
    }
}

/// The type of an attribute along with the settings only that type uses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AttributeKind {
    Section {
        children: Vec<Attribute>,
    },

    /// `decimal_places == Some(0)` collects integers. Any other setting
    /// collects decimals; a positive count also sets the input step.
    Number {
        decimal_places: Option<u32>,
    },

    String {
        widget: Option<StringWidget>,
    },

    Text,

    Date,

    #[serde(rename = "datetime")]
    DateTime,

    Choice {
        options: Vec<ChoiceOption>,
        is_collection: bool,
    },

    Blob,
}

impl AttributeKind {
    /// The type name as it appears in attribute definitions.
    pub fn type_name(&self) -> &'static str {
        match self {
            AttributeKind::Section { .. } => "section",
            AttributeKind::Number { .. } => "number",
            AttributeKind::String { .. } => "string",
            AttributeKind::Text => "text",
            AttributeKind::Date => "date",
            AttributeKind::DateTime => "datetime",
            AttributeKind::Choice { .. } => "choice",
            AttributeKind::Blob => "blob",
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            AttributeKind::Choice {
                is_collection: true,
                ..
            }
        )
    }
}

/// A field or section definition within a schema version.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    /// Unique within the parent scope
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(flatten)]
    pub kind: AttributeKind,
    pub is_required: bool,
    /// Length bound for strings and multi-select choices, value bound for numbers
    pub value_min: Option<i64>,
    pub value_max: Option<i64>,
    pub pattern: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, title: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            description: None,
            kind,
            is_required: false,
            value_min: None,
            value_max: None,
            pattern: None,
        }
    }

    pub fn section(name: impl Into<String>, title: impl Into<String>, children: Vec<Attribute>) -> Self {
        Self::new(name, title, AttributeKind::Section { children })
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn bounded(mut self, min: Option<i64>, max: Option<i64>) -> Self {
        self.value_min = min;
        self.value_max = max;
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn is_section(&self) -> bool {
        matches!(self.kind, AttributeKind::Section { .. })
    }

    /// Direct children of a section; empty for leaves.
    pub fn children(&self) -> &[Attribute] {
        match &self.kind {
            AttributeKind::Section { children } => children,
            _ => &[],
        }
    }
}

/// A leaf attribute paired with the chain of sections that contain it.
#[derive(Debug, Clone, Copy)]
pub struct LeafRef<'a> {
    /// Enclosing sections, outermost first. Empty at the root.
    pub path: &'a [&'a Attribute],
    pub attribute: &'a Attribute,
}

impl<'a> LeafRef<'a> {
    /// The immediately enclosing section, if any.
    pub fn parent(&self) -> Option<&'a Attribute> {
        self.path.last().copied()
    }

    pub fn name(&self) -> &'a str {
        &self.attribute.name
    }
}

/// Visits every leaf of `attributes` in definition order.
///
/// The callback receives the section path alongside the leaf so callers can
/// place the leaf in a nested record.
pub fn walk_leaves<'a, F>(attributes: &'a [Attribute], visit: &mut F)
where
    F: FnMut(LeafRef<'_>),
{
    let mut path: Vec<&'a Attribute> = Vec::new();
    walk(attributes, &mut path, visit);
}

fn walk<'a, F>(attributes: &'a [Attribute], path: &mut Vec<&'a Attribute>, visit: &mut F)
where
    F: FnMut(LeafRef<'_>),
{
    for attribute in attributes {
        if attribute.is_section() {
            path.push(attribute);
            walk(attribute.children(), path, visit);
            path.pop();
        } else {
            visit(LeafRef {
                path: path.as_slice(),
                attribute,
            });
        }
    }
}
