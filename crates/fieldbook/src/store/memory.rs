use super::{Catalog, SchemaFilter};
use crate::error::Result;
use crate::model::{Schema, State};
use crate::workflow::StateName;

/// In-memory catalog.
///
/// Rows are cloned out on every lookup, mirroring a database that hands back
/// fresh rows per query.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    schemas: Vec<Schema>,
    states: Vec<State>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog seeded with the four workflow states.
    pub fn with_default_states() -> Self {
        let mut catalog = Self::new();
        catalog.add_state(State::new(StateName::PendingEntry, "Pending Entry"));
        catalog.add_state(State::new(StateName::PendingReview, "Pending Review"));
        catalog.add_state(State::new(StateName::PendingCorrection, "Pending Correction"));
        catalog.add_state(State::new(StateName::Complete, "Complete"));
        catalog
    }

    pub fn add_schema(&mut self, schema: Schema) {
        self.schemas.push(schema);
    }

    pub fn add_state(&mut self, state: State) {
        self.states.push(state);
    }

    /// Marks every row of `name` at `version` as retracted.
    pub fn retract(&mut self, name: &str, version: chrono::NaiveDate, on: chrono::NaiveDate) {
        for schema in self
            .schemas
            .iter_mut()
            .filter(|s| s.name == name && s.publish_date == version)
        {
            schema.retract_date = Some(on);
        }
    }
}

impl Catalog for MemoryCatalog {
    fn find_schemas(&self, name: &str, filter: &SchemaFilter) -> Result<Vec<Schema>> {
        let mut rows: Vec<Schema> = self
            .schemas
            .iter()
            .filter(|s| s.name == name && filter.matches(s))
            .cloned()
            .collect();
        rows.sort_by_key(|s| s.publish_date);
        Ok(rows)
    }

    fn find_states(&self, names: &[StateName]) -> Result<Vec<State>> {
        let mut rows: Vec<State> = self
            .states
            .iter()
            .filter(|s| names.contains(&s.name))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldbookError;
    use crate::store::{one_schema, one_state};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn schemas_are_ordered_by_version() {
        let mut catalog = MemoryCatalog::new();
        catalog.add_schema(Schema::new("s", "S2", date(2016, 1, 1)));
        catalog.add_schema(Schema::new("s", "S1", date(2015, 1, 1)));
        catalog.add_schema(Schema::new("other", "O", date(2014, 1, 1)));

        let rows = catalog.find_schemas("s", &SchemaFilter::any()).unwrap();
        let titles: Vec<_> = rows.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["S1", "S2"]);
    }

    #[test]
    fn states_are_ordered_by_title() {
        let catalog = MemoryCatalog::with_default_states();
        let rows = catalog.find_states(&StateName::ALL).unwrap();
        let titles: Vec<_> = rows.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Complete",
                "Pending Correction",
                "Pending Entry",
                "Pending Review"
            ]
        );
    }

    #[test]
    fn one_state_finds_row() {
        let catalog = MemoryCatalog::with_default_states();
        let state = one_state(&catalog, StateName::PendingReview).unwrap();
        assert_eq!(state.title, "Pending Review");
    }

    #[test]
    fn one_state_missing_row_propagates() {
        let catalog = MemoryCatalog::new();
        let err = one_state(&catalog, StateName::Complete).unwrap_err();
        assert!(matches!(err, FieldbookError::NoResultFound(_)));
    }

    #[test]
    fn one_schema_rejects_duplicates() {
        let mut catalog = MemoryCatalog::new();
        catalog.add_schema(Schema::new("s", "A", date(2015, 1, 1)));
        catalog.add_schema(Schema::new("s", "B", date(2015, 1, 1)));
        let err = one_schema(&catalog, "s", date(2015, 1, 1)).unwrap_err();
        assert!(matches!(err, FieldbookError::MultipleResultsFound(_)));
    }

    #[test]
    fn retract_marks_version() {
        let mut catalog = MemoryCatalog::new();
        catalog.add_schema(Schema::new("s", "S", date(2015, 1, 1)));
        catalog.retract("s", date(2015, 1, 1), date(2015, 2, 1));
        let active = catalog
            .find_schemas("s", &SchemaFilter::any().active_only())
            .unwrap();
        assert!(active.is_empty());
    }
}
