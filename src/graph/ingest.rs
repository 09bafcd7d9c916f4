/// Record ingestion: folds a stream of typed record events into a [`Graph`].
///
/// One event enum, one dispatch function. The ingestor keeps a single
/// "current person" and "current family" cursor; persons are never nested
/// inside families in the GEDCOM record layout.
use tracing::{debug, info};

use super::{Family, Graph, Person, clean_id};

/// A field event produced by a record reader.
///
/// Ids are raw references as they appear in the source (`@I12@`); the
/// ingestor cleans them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    PersonStart(String),
    Name(String),
    /// `FAMC`: the family this person is a child of.
    ParentFamily(String),
    /// `FAMS`: a family this person is a parent in.
    ChildFamily(String),
    PersonEnd,
    FamilyStart(String),
    /// `HUSB` or `WIFE`.
    Parent(String),
    /// `CHIL`.
    Child(String),
    FamilyEnd,
}

pub struct Ingestor {
    graph: Graph,
    current_person: Option<Person>,
    current_family: Option<Family>,
    /// Entities start visible only when no root filter will run.
    default_visible: bool,
}

impl Ingestor {
    /// Create an ingestor. `root_requested` controls the default visibility.
    #[must_use]
    pub fn new(root_requested: bool) -> Self {
        Self {
            graph: Graph::new(),
            current_person: None,
            current_family: None,
            default_visible: !root_requested,
        }
    }

    pub fn apply(&mut self, event: Event) {
        match event {
            Event::PersonStart(raw) => {
                let id = clean_id(&raw).unwrap_or(raw);
                self.current_person = Some(Person::new(id));
            }
            Event::Name(value) => match self.current_person.as_mut() {
                // Exporters like MacFamilyTree write alternate names as extra
                // NAME records; the first one is the display name.
                Some(person) if person.name.is_none() => person.name = Some(value),
                Some(person) => debug!("{}: ignoring extra name {value:?}", person.id),
                None => debug!("name {value:?} outside a person record"),
            },
            Event::ParentFamily(raw) => match self.current_person.as_mut() {
                Some(person) => person.parent_family = clean_id(&raw),
                None => debug!("FAMC {raw} outside a person record"),
            },
            Event::ChildFamily(raw) => match self.current_person.as_mut() {
                Some(person) => person.child_families.extend(clean_id(&raw)),
                None => debug!("FAMS {raw} outside a person record"),
            },
            Event::PersonEnd => {
                if let Some(mut person) = self.current_person.take() {
                    person.visible = self.default_visible;
                    self.graph.insert_person(person);
                }
            }
            Event::FamilyStart(raw) => {
                let id = clean_id(&raw).unwrap_or(raw);
                self.current_family = Some(Family::new(id));
            }
            Event::Parent(raw) => match self.current_family.as_mut() {
                Some(family) => family.parents.extend(clean_id(&raw)),
                None => debug!("parent {raw} outside a family record"),
            },
            Event::Child(raw) => match self.current_family.as_mut() {
                Some(family) => family.children.extend(clean_id(&raw)),
                None => debug!("child {raw} outside a family record"),
            },
            Event::FamilyEnd => {
                if let Some(mut family) = self.current_family.take() {
                    family.visible = self.default_visible;
                    self.graph.insert_family(family);
                }
            }
        }
    }

    /// Feed every event from an iterator.
    pub fn extend<I: IntoIterator<Item = Event>>(&mut self, events: I) {
        for event in events {
            self.apply(event);
        }
    }

    /// Finish ingestion and hand over the graph.
    ///
    /// A record left open by a truncated stream is dropped.
    #[must_use]
    pub fn finish(self) -> Graph {
        if let Some(person) = &self.current_person {
            debug!("dropping unterminated person record {}", person.id);
        }
        if let Some(family) = &self.current_family {
            debug!("dropping unterminated family record {}", family.id);
        }
        info!(
            "Found {} people and {} families",
            self.graph.people.len(),
            self.graph.families.len()
        );
        self.graph
    }
}

/// Build a graph from a complete event sequence.
#[must_use]
pub fn ingest<I: IntoIterator<Item = Event>>(events: I, root_requested: bool) -> Graph {
    let mut ingestor = Ingestor::new(root_requested);
    ingestor.extend(events);
    ingestor.finish()
}
