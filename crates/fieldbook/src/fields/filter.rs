//! Input filters, applied to the raw string before coercion.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Trims surrounding whitespace; an all-whitespace value becomes no value.
    StripWhitespace,
}

impl Filter {
    pub fn apply(&self, value: Option<String>) -> Option<String> {
        match self {
            Filter::StripWhitespace => strip_whitespace(value),
        }
    }
}

pub fn strip_whitespace(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
