//! Binding and validating a submission against a [`Form`].

use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

use super::{Form, MetadataForm, WorkflowForm};
use crate::attributes::Value;
use crate::fields::{Bound, FieldData, FieldDescriptor, FormNode};
use crate::input::FormInput;
use crate::record::{MetadataBlock, Record, WorkflowBlock, METADATA_KEY, WORKFLOW_KEY};
use crate::workflow::StateName;

/// Error messages keyed by dotted field path, e.g. `_metadata.collect_date`
/// or `contact.phone`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, path: &str) -> Option<&[String]> {
        self.0.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    fn record(&mut self, path: String, messages: Vec<String>) {
        if !messages.is_empty() {
            self.0.insert(path, messages);
        }
    }
}

/// The outcome of [`Form::submit`]. The record is built even when invalid.
#[derive(Debug)]
pub struct Submission {
    pub record: Record,
    pub errors: FieldErrors,
}

impl Submission {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Which parts of a submission get validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    WorkflowOnly,
    MetadataOnly,
    Everything,
}

struct BoundLeaf<'a> {
    path: Vec<&'a str>,
    field: &'a FieldDescriptor,
    bound: Bound,
}

struct BoundMetadata<'a> {
    form: &'a MetadataForm,
    not_done: Bound,
    collect_date: Bound,
    version: Bound,
}

impl Form {
    /// Binds `input` and validates it.
    ///
    /// Validation short-circuits in this order:
    ///
    /// 1. With a workflow sub-form, its state choice is checked first. A
    ///    choice of `pending-entry` ends validation there.
    /// 2. An entity that is already `complete` is not validated further.
    /// 3. A `not_done` submission only validates the metadata sub-form.
    /// 4. Otherwise every field is validated.
    pub fn submit(&self, mut input: FormInput) -> Submission {
        let workflow = self
            .workflow
            .as_ref()
            .map(|wf| (wf, wf.state.bind(input.take_group(WORKFLOW_KEY).take("state"))));
        let metadata = self.metadata.as_ref().map(|form| {
            let mut group = input.take_group(METADATA_KEY);
            BoundMetadata {
                form,
                not_done: form.not_done.bind(group.take("not_done")),
                collect_date: form.collect_date.bind(group.take("collect_date")),
                version: form.version.bind(group.take("version")),
            }
        });
        let mut leaves = Vec::new();
        bind_nodes(&self.fields, &mut input, &mut Vec::new(), &mut leaves);

        let chosen = workflow.as_ref().and_then(|(_, bound)| chosen_state(bound));
        let not_done = metadata
            .as_ref()
            .is_some_and(|m| matches!(m.not_done.data, FieldData::Flag(true)));

        let scope = if chosen == Some(StateName::PendingEntry)
            || self.entity_state == Some(StateName::Complete)
        {
            Scope::WorkflowOnly
        } else if not_done {
            Scope::MetadataOnly
        } else {
            Scope::Everything
        };

        let mut errors = FieldErrors::default();
        if let Some((wf, bound)) = &workflow {
            check_workflow(wf, bound, &mut errors);
        }
        if scope != Scope::WorkflowOnly {
            if let Some(m) = &metadata {
                check_metadata(m, &mut errors);
            }
        }
        if scope == Scope::Everything {
            for leaf in &leaves {
                let mut path = leaf.path.join(".");
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(&leaf.field.name);
                errors.record(path, leaf.field.check(&leaf.bound));
            }
        }

        let mut record = Record::new();
        record.workflow = workflow.map(|_| WorkflowBlock { state: chosen });
        record.metadata = metadata.map(|m| MetadataBlock {
            state: None,
            not_done,
            collect_date: match m.collect_date.data.value() {
                Some(Value::Date(date)) => Some(*date),
                _ => None,
            },
            version: match m.version.data.value() {
                Some(Value::Choice(token)) => token.clone(),
                _ => String::new(),
            },
        });
        for leaf in leaves {
            let name = leaf.field.name.as_str();
            record.insert_leaf(&leaf.path, name, leaf.bound.data.into_entry());
        }

        Submission { record, errors }
    }
}

fn bind_nodes<'a>(
    nodes: &'a [FormNode],
    input: &mut FormInput,
    path: &mut Vec<&'a str>,
    out: &mut Vec<BoundLeaf<'a>>,
) {
    for node in nodes {
        match node {
            FormNode::Leaf(field) => out.push(BoundLeaf {
                path: path.clone(),
                field,
                bound: field.bind(input.take(&field.name)),
            }),
            FormNode::Section(section) => {
                let mut group = input.take_group(&section.name);
                path.push(&section.name);
                bind_nodes(&section.children, &mut group, path, out);
                path.pop();
            }
        }
    }
}

fn chosen_state(bound: &Bound) -> Option<StateName> {
    match bound.data.value() {
        Some(Value::Choice(token)) => StateName::from_str(token).ok(),
        _ => None,
    }
}

fn check_workflow(form: &WorkflowForm, bound: &Bound, errors: &mut FieldErrors) {
    errors.record(format!("{}.{}", WORKFLOW_KEY, form.state.name), form.state.check(bound));
}

fn check_metadata(m: &BoundMetadata<'_>, errors: &mut FieldErrors) {
    let pairs = [
        (&m.form.not_done, &m.not_done),
        (&m.form.collect_date, &m.collect_date),
        (&m.form.version, &m.version),
    ];
    for (field, bound) in pairs {
        errors.record(format!("{}.{}", METADATA_KEY, field.name), field.check(bound));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{make_form, FormOptions};
    use crate::input::Input;
    use crate::model::{Entity, State};
    use crate::record::Entry;
    use crate::test_utils::{date, metadata_input, sample_catalog, sample_schema};
    use crate::workflow::TransitionMode;

    fn form(options: FormOptions, entity: Option<&Entity>) -> Form {
        make_form(&sample_catalog(), &sample_schema(), entity, None, &options).unwrap()
    }

    #[test]
    fn valid_submission_builds_record() {
        let input = metadata_input("2015-03-01", "2015-01-01")
            .with("pulse", Input::text("72"))
            .with(
                "contact",
                Input::Group(FormInput::new().with("phone", Input::text(" 555-1234 "))),
            );
        let submission = form(FormOptions::default(), None).submit(input);

        assert!(submission.is_valid(), "{:?}", submission.errors);
        let record = submission.record;
        let metadata = record.metadata.as_ref().unwrap();
        assert_eq!(metadata.collect_date, Some(date(2015, 3, 1)));
        assert_eq!(metadata.version, "2015-01-01");
        assert_eq!(
            record.leaf(&[], "pulse").and_then(Entry::value),
            Some(&Value::Integer(72))
        );
        assert_eq!(
            record.leaf(&["contact"], "phone").and_then(Entry::value),
            Some(&Value::text("555-1234"))
        );
    }

    #[test]
    fn missing_required_field_is_reported_by_path() {
        let input = metadata_input("2015-03-01", "2015-01-01");
        let submission = form(FormOptions::default(), None).submit(input);
        assert!(!submission.is_valid());
        assert_eq!(
            submission.errors.get("pulse"),
            Some(&["This field is required.".to_string()][..])
        );
    }

    #[test]
    fn out_of_range_value_fails() {
        let input = metadata_input("2015-03-01", "2015-01-01").with("pulse", Input::text("400"));
        let submission = form(FormOptions::default(), None).submit(input);
        assert!(submission.errors.contains("pulse"));
    }

    #[test]
    fn not_done_only_validates_metadata() {
        let mut meta = FormInput::new()
            .with("not_done", Input::text("y"))
            .with("version", Input::text("2015-01-01"));
        meta.insert("collect_date", Input::text("2015-03-01"));
        let input = FormInput::new().with(METADATA_KEY, Input::Group(meta));

        let submission = form(FormOptions::default(), None).submit(input);
        assert!(submission.is_valid(), "{:?}", submission.errors);
        assert!(submission.record.metadata.unwrap().not_done);
    }

    #[test]
    fn not_done_still_requires_collect_date() {
        let meta = FormInput::new()
            .with("not_done", Input::text("y"))
            .with("version", Input::text("2015-01-01"));
        let input = FormInput::new().with(METADATA_KEY, Input::Group(meta));
        let submission = form(FormOptions::default(), None).submit(input);
        assert!(submission.errors.contains("_metadata.collect_date"));
        assert!(!submission.errors.contains("pulse"));
    }

    #[test]
    fn collect_date_floor_enforced() {
        let input = metadata_input("1899-06-01", "2015-01-01").with("pulse", Input::text("72"));
        let submission = form(FormOptions::default(), None).submit(input);
        assert!(submission.errors.contains("_metadata.collect_date"));
    }

    #[test]
    fn version_outside_choices_fails() {
        let input = metadata_input("2015-03-01", "2013-01-01").with("pulse", Input::text("72"));
        let submission = form(FormOptions::default(), None).submit(input);
        assert_eq!(
            submission.errors.get("_metadata.version"),
            Some(&["Not a valid choice.".to_string()][..])
        );
    }

    #[test]
    fn pending_entry_choice_skips_everything_else() {
        let options = FormOptions::default().transition(TransitionMode::All);
        let input = FormInput::new().with(
            WORKFLOW_KEY,
            Input::Group(FormInput::new().with("state", Input::text("pending-entry"))),
        );
        let submission = form(options, None).submit(input);
        assert!(submission.is_valid(), "{:?}", submission.errors);
        assert_eq!(
            submission.record.workflow,
            Some(WorkflowBlock {
                state: Some(StateName::PendingEntry)
            })
        );
    }

    #[test]
    fn workflow_state_is_required() {
        let options = FormOptions::default().transition(TransitionMode::Available);
        let input = metadata_input("2015-03-01", "2015-01-01").with("pulse", Input::text("72"));
        let submission = form(options, None).submit(input);
        assert_eq!(
            submission.errors.get("_workflow.state"),
            Some(&["Please select a state".to_string()][..])
        );
    }

    #[test]
    fn restricted_transition_rejects_unoffered_state() {
        let mut entity = Entity::new(sample_schema());
        entity.state = Some(State::new(StateName::PendingEntry, "Pending Entry"));
        let options = FormOptions::default().transition(TransitionMode::Available);
        let input = metadata_input("2015-03-01", "2015-01-01")
            .with("pulse", Input::text("72"))
            .with(
                WORKFLOW_KEY,
                Input::Group(FormInput::new().with("state", Input::text("complete"))),
            );
        let submission = form(options, Some(&entity)).submit(input);
        assert!(submission.errors.contains("_workflow.state"));
    }

    #[test]
    fn complete_entity_skips_field_validation() {
        let mut entity = Entity::new(sample_schema());
        entity.state = Some(State::new(StateName::Complete, "Complete"));
        let submission = form(FormOptions::default(), Some(&entity)).submit(FormInput::new());
        assert!(submission.is_valid());
    }

    #[test]
    fn invalid_submission_still_carries_record() {
        let input = metadata_input("2015-03-01", "2015-01-01").with("pulse", Input::text("abc"));
        let submission = form(FormOptions::default(), None).submit(input);
        assert!(!submission.is_valid());
        assert!(matches!(
            submission.record.leaf(&[], "pulse"),
            Some(Entry::Value(None))
        ));
    }
}
