/// Descendant chart rendering.
///
/// Walks the visible part of the graph depth-first and produces one line per
/// person, one per spouse and, optionally, a separator line after each family
/// block:
///
/// ```text
/// Ompu Raja Siboro (1)
/// |   + Boru Tobing
/// |-Martua Siboro (2)
/// | |  + Rosa M.Nainggolan
/// | |-Daniel Siboro (3)
/// | |-Ester Siboro (3)
/// |-Lamsiang Siboro (2)
/// ```
use std::collections::HashSet;

use tracing::{debug, warn};

use super::names::{NameFormatter, plain_name};
use crate::graph::{Family, Graph, Person};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartOptions {
    pub formatter: NameFormatter,
    /// Close every family block with a blank or bar line.
    pub family_separator: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            formatter: NameFormatter::default(),
            family_separator: true,
        }
    }
}

/// Mutable state of one rendering pass.
struct Context<'g> {
    /// Tree-drawing prefix, one two-character column per open generation.
    indent: String,
    generation: usize,
    /// Separator lines written since the last name line.
    separators: usize,
    /// Persons on the current descent path.
    path: Vec<&'g str>,
    /// Persons already written as a name or spouse line.
    drawn: HashSet<&'g str>,
    lines: Vec<String>,
}

impl Context<'_> {
    fn new() -> Self {
        Self {
            indent: String::new(),
            generation: 1,
            separators: 0,
            path: Vec::new(),
            drawn: HashSet::new(),
            lines: Vec::new(),
        }
    }

    fn emit(&mut self, line: String) {
        self.lines.push(line);
    }

    fn emit_separator(&mut self, tail: &str) {
        let line = format!("{}{tail}", self.indent);
        self.lines.push(line);
    }
}

/// Position of a person among its siblings and its parent's families.
#[derive(Debug, Clone, Copy)]
struct Slot {
    /// 1-based index among the visible siblings.
    child_no: usize,
    /// Number of visible siblings, this person included.
    siblings: usize,
    /// Number of families the rendered parent has.
    parent_families: usize,
    /// 1-based index of the family this person was rendered under.
    parent_family_no: usize,
}

impl Slot {
    const ROOT: Slot = Slot {
        child_no: 1,
        siblings: 1,
        parent_families: 0,
        parent_family_no: 1,
    };

    fn in_last_parent_family(self) -> bool {
        self.parent_family_no == self.parent_families
    }

    fn is_last_sibling(self) -> bool {
        self.child_no == self.siblings
    }
}

pub struct ChartRenderer<'g> {
    graph: &'g Graph,
    options: ChartOptions,
}

impl<'g> ChartRenderer<'g> {
    pub fn new(graph: &'g Graph, options: ChartOptions) -> Self {
        Self { graph, options }
    }

    /// Render the chart for `root` into lines.
    ///
    /// A person root is charted on its own. A family root charts each of its
    /// visible children in turn, or its first parent when no child is
    /// visible. Without a root every person lacking a parent family starts a
    /// chart in record order, unless an earlier chart already drew them as a
    /// spouse.
    #[must_use]
    pub fn render(&self, root: Option<&str>) -> Vec<String> {
        let mut ctx = Context::new();
        match root {
            Some(id) => match self.graph.family(id) {
                Some(family) => self.render_family_root(&mut ctx, family),
                None => self.render_person(&mut ctx, id, Slot::ROOT),
            },
            None => {
                for person in self.graph.progenitors().filter(|p| p.visible) {
                    if ctx.drawn.contains(person.id.as_str()) {
                        debug!("{} already charted as a spouse", person.id);
                        continue;
                    }
                    self.render_person(&mut ctx, &person.id, Slot::ROOT);
                }
            }
        }
        ctx.lines
    }

    fn render_family_root(&self, ctx: &mut Context<'g>, family: &'g Family) {
        let id = &family.id;
        let children: Vec<&'g str> = visible_children(self.graph, &family.children).collect();
        if children.is_empty() {
            let Some(parent) = family
                .parents
                .iter()
                .find(|p| self.graph.person(p).is_some_and(|person| person.visible))
            else {
                warn!("family {id} has no visible members, the chart is empty");
                return;
            };
            warn!("family {id} has no visible children, charting parent {parent}");
            self.render_person(ctx, parent, Slot::ROOT);
            return;
        }
        let siblings = children.len();
        for (j, child) in children.into_iter().enumerate() {
            let slot = Slot {
                child_no: j + 1,
                siblings,
                ..Slot::ROOT
            };
            self.render_person(ctx, child, slot);
        }
    }

    fn render_person(&self, ctx: &mut Context<'g>, id: &str, slot: Slot) {
        let Some(person) = self.graph.person(id) else {
            debug!("skipping unknown person {id}");
            return;
        };
        if ctx.path.contains(&person.id.as_str()) {
            warn!("{id} is its own descendant, not descending again");
            return;
        }
        ctx.path.push(person.id.as_str());
        ctx.drawn.insert(person.id.as_str());

        let last_sibling = slot.is_last_sibling();

        let line = if ctx.generation == 1 {
            format!("{} ({})", plain_name(person.name_or_empty()), ctx.generation)
        } else {
            format!(
                "{}|-{} ({})",
                ctx.indent,
                self.label(person),
                ctx.generation
            )
        };
        ctx.emit(line);
        ctx.separators = 0;

        let family_count = person.child_families.len();
        for (i, family_id) in person.child_families.iter().enumerate() {
            let Some(family) = self.graph.family(family_id) else {
                debug!("{id}: family {family_id} not found");
                continue;
            };
            ctx.separators = 0;
            let last_family = i + 1 == family_count;
            let children: Vec<&'g str> = visible_children(self.graph, &family.children).collect();

            for spouse in family
                .parents
                .iter()
                .filter(|p| p.as_str() != person.id)
                .filter_map(|p| self.graph.person(p))
            {
                let glyphs = if ctx.generation == 1 {
                    "|   + "
                } else if !children.is_empty() {
                    if last_sibling && slot.in_last_parent_family() {
                        "  |  + "
                    } else {
                        "| |  + "
                    }
                } else if last_sibling {
                    "     + "
                } else {
                    "| |  + "
                };
                ctx.emit(format!("{}{glyphs}{}", ctx.indent, self.label(spouse)));
                ctx.drawn.insert(spouse.id.as_str());
            }

            if children.is_empty() {
                if self.options.family_separator && ctx.separators == 0 {
                    match (last_sibling, family_count) {
                        (true, 1) => ctx.emit_separator(""),
                        (false, 1) => ctx.emit_separator("|"),
                        (false, _) => ctx.emit_separator("| |"),
                        // Last sibling with further families: the next block
                        // continues the line, nothing to draw.
                        (true, _) => {}
                    }
                    ctx.separators += 1;
                }
                continue;
            }

            let opened = ctx.generation > 1;
            if opened {
                let column = if last_sibling && last_family && slot.in_last_parent_family() {
                    "  "
                } else {
                    "| "
                };
                ctx.indent.push_str(column);
            }
            ctx.generation += 1;

            let siblings = children.len();
            for (j, child) in children.iter().enumerate() {
                let child_slot = Slot {
                    child_no: j + 1,
                    siblings,
                    parent_families: family_count,
                    parent_family_no: i + 1,
                };
                self.render_person(ctx, child, child_slot);
            }

            if self.options.family_separator && ctx.separators == 0 {
                ctx.emit_separator(if last_family { "" } else { "|" });
                ctx.separators += 1;
            }

            ctx.generation -= 1;
            if opened {
                let keep = ctx.indent.len().saturating_sub(2);
                ctx.indent.truncate(keep);
            }
        }

        ctx.path.pop();
    }

    fn label(&self, person: &Person) -> String {
        self.options.formatter.format(person.name_or_empty())
    }
}

/// Children that survived selection, in record order.
fn visible_children<'g>(graph: &'g Graph, ids: &'g [String]) -> impl Iterator<Item = &'g str> {
    ids.iter()
        .filter_map(move |id| graph.person(id))
        .filter(|p| p.visible)
        .map(|p| p.id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ingest::{Event, ingest};

    struct Fixture {
        events: Vec<Event>,
    }

    impl Fixture {
        fn new() -> Self {
            Self { events: Vec::new() }
        }

        fn person(mut self, id: &str, name: &str, famc: Option<&str>, fams: &[&str]) -> Self {
            self.events.push(Event::PersonStart(format!("@{id}@")));
            self.events.push(Event::Name(name.to_string()));
            if let Some(f) = famc {
                self.events.push(Event::ParentFamily(format!("@{f}@")));
            }
            for f in fams {
                self.events.push(Event::ChildFamily(format!("@{f}@")));
            }
            self.events.push(Event::PersonEnd);
            self
        }

        fn family(mut self, id: &str, parents: &[&str], children: &[&str]) -> Self {
            self.events.push(Event::FamilyStart(format!("@{id}@")));
            for p in parents {
                self.events.push(Event::Parent(format!("@{p}@")));
            }
            for c in children {
                self.events.push(Event::Child(format!("@{c}@")));
            }
            self.events.push(Event::FamilyEnd);
            self
        }

        fn graph(self) -> Graph {
            ingest(self.events, false)
        }
    }

    fn siboro() -> Graph {
        Fixture::new()
            .person("I1", "Ompu Raja /Siboro/", None, &["F1"])
            .person("I2", "Boru /Tobing/", None, &["F1"])
            .person("I3", "Martua /Siboro/", Some("F1"), &["F2"])
            .person("I4", "Lamsiang /Siboro/", Some("F1"), &[])
            .person("I5", "Rosa Maria /Nainggolan/", None, &["F2"])
            .person("I6", "Daniel /Siboro/", Some("F2"), &[])
            .person("I7", "Ester /Siboro/", Some("F2"), &[])
            .family("F1", &["I1", "I2"], &["I3", "I4"])
            .family("F2", &["I3", "I5"], &["I6", "I7"])
            .graph()
    }

    fn without_separators() -> ChartOptions {
        ChartOptions {
            family_separator: false,
            ..ChartOptions::default()
        }
    }

    #[test]
    fn test_three_generations() {
        let graph = siboro();
        let lines = ChartRenderer::new(&graph, without_separators()).render(Some("I1"));
        assert_eq!(
            lines,
            vec![
                "Ompu Raja Siboro (1)",
                "|   + Boru Tobing",
                "|-Martua Siboro (2)",
                "| |  + Rosa M.Nainggolan",
                "| |-Daniel Siboro (3)",
                "| |-Ester Siboro (3)",
                "|-Lamsiang Siboro (2)",
            ]
        );
    }

    #[test]
    fn test_family_separators() {
        let graph = siboro();
        let lines = ChartRenderer::new(&graph, ChartOptions::default()).render(Some("I1"));
        assert_eq!(
            lines,
            vec![
                "Ompu Raja Siboro (1)",
                "|   + Boru Tobing",
                "|-Martua Siboro (2)",
                "| |  + Rosa M.Nainggolan",
                "| |-Daniel Siboro (3)",
                "| |-Ester Siboro (3)",
                "| ",
                "|-Lamsiang Siboro (2)",
                "",
            ]
        );
    }

    #[test]
    fn test_family_root_charts_each_child() {
        let graph = Fixture::new()
            .person("I1", "Ama /Siboro/", None, &["F1"])
            .person("I2", "Ina /Tobing/", None, &["F1"])
            .person("I3", "Martua /Siboro/", Some("F1"), &["F2"])
            .person("I4", "Lamsiang /Siboro/", Some("F1"), &[])
            .person("I5", "Rosa /Nainggolan/", None, &["F2"])
            .person("I6", "Daniel /Siboro/", Some("F2"), &[])
            .family("F1", &["I1", "I2"], &["I3", "I4"])
            .family("F2", &["I3", "I5"], &["I6"])
            .graph();
        let lines = ChartRenderer::new(&graph, without_separators()).render(Some("F1"));
        assert_eq!(
            lines,
            vec![
                "Martua Siboro (1)",
                "|   + Rosa Nainggolan",
                "|-Daniel Siboro (2)",
                "Lamsiang Siboro (1)",
            ]
        );
    }

    #[test]
    fn test_line_count_for_childless_children() {
        let graph = Fixture::new()
            .person("I1", "Root /A/", None, &["F1"])
            .person("I2", "Spouse /B/", None, &["F1"])
            .person("I3", "One /A/", Some("F1"), &[])
            .person("I4", "Two /A/", Some("F1"), &[])
            .person("I5", "Three /A/", Some("F1"), &[])
            .family("F1", &["I1", "I2"], &["I3", "I4", "I5"])
            .graph();
        let lines = ChartRenderer::new(&graph, without_separators()).render(Some("I1"));
        // Root, spouse, three children.
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_single_parent_family_has_no_spouse_line() {
        let graph = Fixture::new()
            .person("I1", "Solo /A/", None, &["F1"])
            .person("I2", "Kid /A/", Some("F1"), &[])
            .family("F1", &["I1"], &["I2"])
            .graph();
        let lines = ChartRenderer::new(&graph, without_separators()).render(Some("I1"));
        assert_eq!(lines, vec!["Solo A (1)", "|-Kid A (2)"]);
    }

    #[test]
    fn test_multiple_marriages_in_record_order() {
        let graph = Fixture::new()
            .person("I1", "Hans /Berg/", None, &["F1", "F2"])
            .person("I2", "Anna /Holm/", None, &["F1"])
            .person("I3", "Eva /Lund/", None, &["F2"])
            .person("I4", "Karl /Berg/", Some("F1"), &[])
            .person("I5", "Lena /Berg/", Some("F2"), &[])
            .family("F1", &["I1", "I2"], &["I4"])
            .family("F2", &["I1", "I3"], &["I5"])
            .graph();
        let lines = ChartRenderer::new(&graph, without_separators()).render(Some("I1"));
        assert_eq!(
            lines,
            vec![
                "Hans Berg (1)",
                "|   + Anna Holm",
                "|-Karl Berg (2)",
                "|   + Eva Lund",
                "|-Lena Berg (2)",
            ]
        );
    }

    #[test]
    fn test_last_sibling_drops_the_bar() {
        let graph = Fixture::new()
            .person("I1", "Root /A/", None, &["F1"])
            .person("I2", "Only /A/", Some("F1"), &["F2"])
            .person("I3", "Wife /B/", None, &["F2"])
            .person("I4", "Grand /A/", Some("F2"), &["F3"])
            .person("I5", "Partner /C/", None, &["F3"])
            .person("I6", "Great /A/", Some("F3"), &[])
            .family("F1", &["I1"], &["I2"])
            .family("F2", &["I2", "I3"], &["I4"])
            .family("F3", &["I4", "I5"], &["I6"])
            .graph();
        let lines = ChartRenderer::new(&graph, without_separators()).render(Some("I1"));
        assert_eq!(
            lines,
            vec![
                "Root A (1)",
                "|-Only A (2)",
                "  |  + Wife B",
                "  |-Grand A (3)",
                "    |  + Partner C",
                "    |-Great A (4)",
            ]
        );
    }

    #[test]
    fn test_invisible_children_are_skipped() {
        let mut graph = siboro();
        graph.people.get_mut("I6").unwrap().visible = false;
        let lines = ChartRenderer::new(&graph, without_separators()).render(Some("I3"));
        assert_eq!(
            lines,
            vec![
                "Martua Siboro (1)",
                "|   + Rosa M.Nainggolan",
                "|-Ester Siboro (2)",
            ]
        );
    }

    #[test]
    fn test_cycle_terminates() {
        let graph = Fixture::new()
            .person("I1", "Loop /A/", Some("F1"), &["F1"])
            .family("F1", &["I1"], &["I1"])
            .graph();
        let lines = ChartRenderer::new(&graph, without_separators()).render(Some("I1"));
        assert_eq!(lines, vec!["Loop A (1)"]);
    }

    #[test]
    fn test_no_root_charts_each_family_once() {
        let graph = siboro();
        let renderer = ChartRenderer::new(&graph, without_separators());
        // I2 and I5 have no parent family but married into the I1 chart.
        assert_eq!(renderer.render(None), renderer.render(Some("I1")));
    }

    #[test]
    fn test_no_root_couple_and_unrelated_person() {
        let graph = Fixture::new()
            .person("I1", "Ama /Siboro/", None, &["F1"])
            .person("I2", "Ina /Tobing/", None, &["F1"])
            .person("I3", "Anak /Siboro/", Some("F1"), &[])
            .person("I4", "Solo /Lubis/", None, &[])
            .family("F1", &["I1", "I2"], &["I3"])
            .graph();
        let lines = ChartRenderer::new(&graph, without_separators()).render(None);
        assert_eq!(
            lines,
            vec![
                "Ama Siboro (1)",
                "|   + Ina Tobing",
                "|-Anak Siboro (2)",
                "Solo Lubis (1)",
            ]
        );
        assert_eq!(lines.iter().filter(|l| l.contains("Anak")).count(), 1);
    }

    #[test]
    fn test_second_generation_with_two_marriages() {
        let graph = Fixture::new()
            .person("I1", "Root /A/", None, &["F1"])
            .person("I2", "Pardo /A/", Some("F1"), &["F2", "F3"])
            .person("I3", "Younger /A/", Some("F1"), &[])
            .person("I4", "Sa /B/", None, &["F2"])
            .person("I5", "Sb /C/", None, &["F3"])
            .person("I6", "Child /A/", Some("F2"), &[])
            .family("F1", &["I1"], &["I2", "I3"])
            .family("F2", &["I2", "I4"], &["I6"])
            .family("F3", &["I2", "I5"], &[])
            .graph();
        let lines = ChartRenderer::new(&graph, ChartOptions::default()).render(Some("I1"));
        assert_eq!(
            lines,
            vec![
                "Root A (1)",
                "|-Pardo A (2)",
                "| |  + Sa B",
                "| |-Child A (3)",
                "| |",
                "| |  + Sb C",
                "| |",
                "|-Younger A (2)",
                "",
            ]
        );
    }

    #[test]
    fn test_last_sibling_childless_marriage() {
        let graph = Fixture::new()
            .person("I1", "Root /A/", None, &["F1"])
            .person("I2", "Only /A/", Some("F1"), &["F2"])
            .person("I3", "Wife /B/", None, &["F2"])
            .family("F1", &["I1"], &["I2"])
            .family("F2", &["I2", "I3"], &[])
            .graph();
        let lines = ChartRenderer::new(&graph, ChartOptions::default()).render(Some("I1"));
        assert_eq!(lines, vec!["Root A (1)", "|-Only A (2)", "     + Wife B", ""]);
    }

    #[test]
    fn test_hidden_younger_sibling_closes_the_bar() {
        let mut graph = Fixture::new()
            .person("I1", "Root /A/", None, &["F1"])
            .person("I2", "Elder /A/", Some("F1"), &["F2"])
            .person("I3", "Hidden /A/", Some("F1"), &[])
            .person("I4", "Wife /B/", None, &["F2"])
            .person("I5", "Child /A/", Some("F2"), &[])
            .family("F1", &["I1"], &["I2", "I3"])
            .family("F2", &["I2", "I4"], &["I5"])
            .graph();
        graph.people.get_mut("I3").unwrap().visible = false;
        let lines = ChartRenderer::new(&graph, without_separators()).render(Some("I1"));
        assert_eq!(
            lines,
            vec![
                "Root A (1)",
                "|-Elder A (2)",
                "  |  + Wife B",
                "  |-Child A (3)",
            ]
        );
    }

    #[test]
    fn test_childless_family_root_charts_a_parent() {
        let graph = Fixture::new()
            .person("I1", "Ama /Siboro/", None, &["F1"])
            .person("I2", "Ina /Tobing/", None, &["F1"])
            .family("F1", &["I1", "I2"], &[])
            .graph();
        let lines = ChartRenderer::new(&graph, without_separators()).render(Some("F1"));
        assert_eq!(lines, vec!["Ama Siboro (1)", "|   + Ina Tobing"]);
    }

    #[test]
    fn test_empty_family_root() {
        let graph = Fixture::new().family("F1", &[], &[]).graph();
        let lines = ChartRenderer::new(&graph, ChartOptions::default()).render(Some("F1"));
        assert!(lines.is_empty());
    }
}
