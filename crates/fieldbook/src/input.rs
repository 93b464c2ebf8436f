//! Raw submitted form data.
//!
//! [`FormInput`] mirrors what a browser posts: every field is a string, a list
//! of strings (multi-selects), a nested group (sections, sub-forms) or an
//! uploaded file. Nothing here is coerced or validated; that is the job of
//! [`crate::forms::Form::submit`].

use std::collections::BTreeMap;
use std::fmt;
use std::io::{Cursor, Read};

/// An uploaded byte stream with the file name the client reported.
pub struct Upload {
    pub file_name: String,
    source: Box<dyn Read>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, source: impl Read + 'static) -> Self {
        Self {
            file_name: file_name.into(),
            source: Box::new(source),
        }
    }

    pub fn from_bytes(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(file_name, Cursor::new(bytes.into()))
    }

    pub fn reader(&mut self) -> &mut dyn Read {
        self.source.as_mut()
    }
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Upload")
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum Input {
    Text(String),
    Many(Vec<String>),
    Group(FormInput),
    File(Upload),
}

impl Input {
    pub fn text(value: impl Into<String>) -> Self {
        Input::Text(value.into())
    }

    pub fn many<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Input::Many(values.into_iter().map(Into::into).collect())
    }

    /// The first raw string, if the input carries any.
    pub fn first_text(&self) -> Option<&str> {
        match self {
            Input::Text(s) => Some(s),
            Input::Many(items) => items.first().map(String::as_str),
            Input::Group(_) | Input::File(_) => None,
        }
    }

    /// True when nothing but whitespace was submitted.
    pub fn is_blank(&self) -> bool {
        match self {
            Input::Text(_) | Input::Many(_) => {
                self.first_text().map_or(true, |s| s.trim().is_empty())
            }
            Input::Group(_) | Input::File(_) => false,
        }
    }
}

#[derive(Debug, Default)]
pub struct FormInput {
    entries: BTreeMap<String, Input>,
}

impl FormInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, input: Input) -> Self {
        self.insert(key, input);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, input: Input) {
        self.entries.insert(key.into(), input);
    }

    pub fn get(&self, key: &str) -> Option<&Input> {
        self.entries.get(key)
    }

    pub fn take(&mut self, key: &str) -> Option<Input> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn group(&self, key: &str) -> Option<&FormInput> {
        match self.entries.get(key) {
            Some(Input::Group(group)) => Some(group),
            _ => None,
        }
    }

    /// Removes and returns a nested group; a missing or non-group entry
    /// yields an empty group.
    pub fn take_group(&mut self, key: &str) -> FormInput {
        match self.entries.remove(key) {
            Some(Input::Group(group)) => group,
            _ => FormInput::default(),
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(Input::first_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_is_blank() {
        assert!(Input::text("   ").is_blank());
        assert!(Input::text("").is_blank());
        assert!(!Input::text(" x ").is_blank());
    }

    #[test]
    fn empty_multi_select_is_blank() {
        assert!(Input::Many(vec![]).is_blank());
        assert!(Input::many([""]).is_blank());
        assert!(!Input::many(["a", "b"]).is_blank());
    }

    #[test]
    fn uploads_are_never_blank() {
        assert!(!Input::File(Upload::from_bytes("a.txt", "hi")).is_blank());
    }

    #[test]
    fn take_group_defaults_to_empty() {
        let mut input = FormInput::new().with("x", Input::text("1"));
        let group = input.take_group("missing");
        assert!(group.get("anything").is_none());
        let group = input.take_group("x");
        assert!(group.get("x").is_none());
    }

    #[test]
    fn upload_reader_yields_bytes() {
        let mut upload = Upload::from_bytes("a.txt", "hello");
        let mut out = String::new();
        upload.reader().read_to_string(&mut out).unwrap();
        assert_eq!(out, "hello");
        assert!(format!("{:?}", upload).contains("a.txt"));
    }
}
