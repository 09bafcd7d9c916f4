/// Subgraph selection: marks the persons and families related to a root.
///
/// The `visible` flag is both the result and the traversal guard. A person
/// is expanded only on the transition from invisible to visible, so each
/// closure visits every person at most once and terminates on cyclic input.
use thiserror::Error;
use tracing::debug;

use super::Graph;

/// Lookup failures while resolving the chart root.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectError {
    #[error("no family id = {0} found")]
    NoSuchFamily(String),

    #[error("no person id = {0} found")]
    NoSuchPerson(String),
}

/// How far sideways the ancestor walk reaches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionMode {
    /// Ancestor lines only.
    #[default]
    Ancestors,
    /// Ancestors plus the children of every ancestor family, as leaves.
    Children,
    /// Ancestors plus every descendant of every ancestor family.
    Blood,
}

/// Runs the ancestor/descendant closures over a graph.
pub struct Selector<'a> {
    graph: &'a mut Graph,
    mode: SelectionMode,
}

impl<'a> Selector<'a> {
    pub fn new(graph: &'a mut Graph, mode: SelectionMode) -> Self {
        Self { graph, mode }
    }

    /// Mark everything related to `root`. Ids starting with `F` name a family.
    pub fn select(&mut self, root: &str) -> Result<(), SelectError> {
        if root.starts_with('F') {
            if !self.graph.families.contains_key(root) {
                return Err(SelectError::NoSuchFamily(root.to_string()));
            }
            self.mark_family(root);
        } else {
            if !self.graph.people.contains_key(root) {
                return Err(SelectError::NoSuchPerson(root.to_string()));
            }
            self.mark_ancestors(root);
            // The ancestor pass leaves the root marked; clear it so the
            // descendant pass can expand the root's own families.
            if let Some(person) = self.graph.people.get_mut(root) {
                person.visible = false;
            }
            self.mark_children(root);
        }
        debug!(
            "selected {} people and {} families from {root}",
            self.graph.people.values().filter(|p| p.visible).count(),
            self.graph.families.values().filter(|f| f.visible).count()
        );
        Ok(())
    }

    /// Walk up both parental lines from `id`, pulling in siblings per mode.
    pub fn mark_ancestors(&mut self, id: &str) {
        let Some(links) = self.claim(id) else {
            return;
        };
        let Some(parent_family) = links.parent_family else {
            return;
        };
        let Some(family) = self.graph.families.get_mut(&parent_family) else {
            return;
        };
        family.visible = true;
        let parents = family.parents.clone();
        let children = family.children.clone();

        for parent in &parents {
            self.mark_ancestors(parent);
        }
        match self.mode {
            SelectionMode::Ancestors => {}
            SelectionMode::Children => {
                for child in &children {
                    if let Some(person) = self.graph.people.get_mut(child) {
                        person.visible = true;
                    }
                }
            }
            SelectionMode::Blood => {
                for child in &children {
                    self.mark_children(child);
                }
            }
        }
    }

    /// Mark `id` and its whole descendant line.
    pub fn mark_children(&mut self, id: &str) {
        let Some(links) = self.claim(id) else {
            return;
        };
        for family_id in &links.child_families {
            let Some(family) = self.graph.families.get_mut(family_id) else {
                continue;
            };
            family.visible = true;
            let children = family.children.clone();
            for child in &children {
                self.mark_children(child);
            }
        }
    }

    /// Mark a root family, its parents' ancestors and its descendants.
    pub fn mark_family(&mut self, id: &str) {
        let Some(family) = self.graph.families.get_mut(id) else {
            return;
        };
        family.visible = true;
        let parents = family.parents.clone();
        let children = family.children.clone();
        for parent in &parents {
            self.mark_ancestors(parent);
        }
        for child in &children {
            self.mark_children(child);
        }
    }

    /// Flip an invisible person to visible and return the links to expand.
    ///
    /// Returns `None` for unknown or already visible persons.
    fn claim(&mut self, id: &str) -> Option<Links> {
        let person = self.graph.people.get_mut(id)?;
        if person.visible {
            return None;
        }
        person.visible = true;
        Some(Links {
            parent_family: person.parent_family.clone(),
            child_families: person.child_families.clone(),
        })
    }
}

struct Links {
    parent_family: Option<String>,
    child_families: Vec<String>,
}

/// Apply `mode` selection from `root`, or leave everything visible when
/// there is no root.
pub fn select(
    graph: &mut Graph,
    root: Option<&str>,
    mode: SelectionMode,
) -> Result<(), SelectError> {
    match root {
        Some(root) => Selector::new(graph, mode).select(root),
        None => Ok(()),
    }
}
