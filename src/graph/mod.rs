/// In-memory person/family graph built from GEDCOM record events.
///
/// Persons and families live in two maps keyed by their cleaned record id.
/// Links between them are plain ids; a dangling id is treated as absent.
pub mod ingest;
pub mod select;

use std::collections::HashMap;

/// Id GEDCOM exporters use for an unknown individual.
pub const PLACEHOLDER_ID: &str = "I-1";

/// Strip the `@` markers from a record reference.
///
/// Returns `None` for the unknown-individual placeholder.
pub fn clean_id(raw: &str) -> Option<String> {
    let id: String = raw.chars().filter(|&c| c != '@').collect();
    let id = id.trim();
    if id.is_empty() || id == PLACEHOLDER_ID {
        None
    } else {
        Some(id.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Person {
    pub id: String,
    /// Raw name; slashes delimit the surname.
    pub name: Option<String>,
    /// Family in which this person is a child.
    pub parent_family: Option<String>,
    /// Families in which this person is a parent, in record order.
    pub child_families: Vec<String>,
    pub visible: bool,
}

impl Person {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Name for display, empty when the record carried none.
    #[must_use]
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Family {
    pub id: String,
    /// At most two parents; the placeholder is never stored.
    pub parents: Vec<String>,
    /// Children in record order.
    pub children: Vec<String>,
    pub visible: bool,
}

impl Family {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// The ingested record set.
#[derive(Debug, Default)]
pub struct Graph {
    pub people: HashMap<String, Person>,
    pub families: HashMap<String, Family>,
    /// Person ids in the order they were committed.
    order: Vec<String>,
}

impl Graph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a person, keeping first-seen record order.
    pub fn insert_person(&mut self, person: Person) {
        if !self.people.contains_key(&person.id) {
            self.order.push(person.id.clone());
        }
        self.people.insert(person.id.clone(), person);
    }

    pub fn insert_family(&mut self, family: Family) {
        self.families.insert(family.id.clone(), family);
    }

    #[must_use]
    pub fn person(&self, id: &str) -> Option<&Person> {
        self.people.get(id)
    }

    #[must_use]
    pub fn family(&self, id: &str) -> Option<&Family> {
        self.families.get(id)
    }

    /// The family in which `person` is a child, if it was ingested.
    #[must_use]
    pub fn parent_family_of(&self, person: &Person) -> Option<&Family> {
        person.parent_family.as_deref().and_then(|f| self.family(f))
    }

    /// Persons in record order.
    pub fn people_in_order(&self) -> impl Iterator<Item = &Person> {
        self.order.iter().filter_map(move |id| self.people.get(id))
    }

    /// Persons with no ingested parent family, in record order.
    pub fn progenitors(&self) -> impl Iterator<Item = &Person> {
        self.people_in_order()
            .filter(move |p| self.parent_family_of(p).is_none())
    }

    /// Ids of every visible person, sorted.
    #[must_use]
    pub fn visible_people(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .people
            .values()
            .filter(|p| p.visible)
            .map(|p| p.id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Ids of every visible family, sorted.
    #[must_use]
    pub fn visible_families(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .families
            .values()
            .filter(|f| f.visible)
            .map(|f| f.id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }
}
