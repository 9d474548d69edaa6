//! Expansion of a selection into a depth-indexed descriptor forest.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use collage_core::{
    identifier::Id,
    model::{Diagram, Element},
};

use super::CopyPaste;
use crate::{
    collaborators::Rules,
    config::CopyConfig,
    forest::Forest,
    topology::{self, Visitor},
};

/// The result of [`CopyPaste::create_tree`].
#[derive(Debug, Clone)]
pub struct Tree<'a> {
    /// Descriptors of every retained element, by depth.
    pub forest: Forest,
    /// The retained elements themselves, in inclusion order.
    pub all_shapes: Vec<&'a Element>,
}

impl<R: Rules> CopyPaste<R> {
    /// Expand `elements` into a forest of descriptors.
    ///
    /// Only elements without a selected ancestor seed the walk; their nested
    /// children follow one depth further down. Attachers, labels and
    /// connections of every visited element join it at its depth. Elements
    /// whose host, label target or connection endpoints are not retained are
    /// dropped, repeatedly, until every survivor's relations are satisfied.
    /// Survivors then sink to the depth of the deepest element they refer
    /// to, so pasting depth by depth always finds them.
    ///
    /// Canvas roots are walked through but never described: their children
    /// are retained and their own depth bucket stays empty.
    pub fn create_tree<'a>(&self, diagram: &'a Diagram, elements: &[&'a Element]) -> Tree<'a> {
        let top_level = topology::get_top_level(diagram, elements);

        let mut builder = TreeBuilder {
            copy_paste: self,
            diagram,
            config: *self.config.copy(),
            forest: Forest::new(),
            included: Vec::new(),
            denied: HashSet::new(),
        };
        topology::each_element(diagram, &top_level, &mut builder);

        let TreeBuilder {
            mut forest,
            included,
            ..
        } = builder;

        let included = settle_depths(retain_related(deduplicate(included)));
        let retained: HashSet<Id> = included.iter().map(|(element, _)| element.id()).collect();

        let mut all_shapes = Vec::with_capacity(included.len());
        for (element, depth) in included {
            let mut descriptor = self.descriptors.execute(element);
            if descriptor
                .parent
                .is_some_and(|parent| !retained.contains(&parent))
            {
                descriptor.parent = None;
            }

            trace!(id:% = element.id(), depth = depth, priority = descriptor.priority.value(); "Described element");
            forest.push(depth, descriptor);
            all_shapes.push(element);
        }

        Tree { forest, all_shapes }
    }
}

struct TreeBuilder<'a, 'c, R> {
    copy_paste: &'c CopyPaste<R>,
    diagram: &'a Diagram,
    config: CopyConfig,
    forest: Forest,
    included: Vec<(&'a Element, usize)>,
    denied: HashSet<Id>,
}

impl<'a, R: Rules> TreeBuilder<'a, '_, R> {
    /// Attachers, labels and connections of `element` enabled by the config.
    fn dependents(&self, element: &'a Element) -> Vec<&'a Element> {
        let mut ids: Vec<Id> = Vec::new();
        if self.config.attachers() {
            ids.extend_from_slice(element.attachers());
        }
        if self.config.labels() {
            ids.extend_from_slice(element.labels());
        }
        if self.config.connections() {
            ids.extend_from_slice(element.incoming());
            ids.extend_from_slice(element.outgoing());
        }

        ids.into_iter()
            .filter_map(|id| self.diagram.element(id))
            .collect()
    }
}

impl<'a, R: Rules> Visitor<'a> for TreeBuilder<'a, '_, R> {
    fn visit(&mut self, element: &'a Element, _index: usize, depth: usize) {
        self.forest.ensure_depth(depth);

        if !self.copy_paste.can_copy(element) {
            debug!(id:% = element.id(); "Copy denied, skipping subtree");
            self.denied.insert(element.id());
            return;
        }

        if element.is_root() {
            return;
        }

        for dependent in self.dependents(element) {
            if self.copy_paste.can_copy(dependent) {
                self.included.push((dependent, depth));
            } else {
                debug!(id:% = dependent.id(), of:% = element.id(); "Copy denied for dependent");
            }
        }
        self.included.push((element, depth));
    }

    fn descend(&mut self, element: &'a Element) -> Option<Vec<Id>> {
        if self.denied.contains(&element.id()) || element.children().is_empty() {
            return None;
        }
        Some(element.children().to_vec())
    }
}

/// Keep the first occurrence of every element.
fn deduplicate(mut included: Vec<(&Element, usize)>) -> Vec<(&Element, usize)> {
    let mut seen = HashSet::new();
    included.retain(|(element, _)| seen.insert(element.id()));
    included
}

/// Drop elements whose relations point outside the set until none are left.
fn retain_related(mut included: Vec<(&Element, usize)>) -> Vec<(&Element, usize)> {
    loop {
        let present: HashSet<Id> = included.iter().map(|(element, _)| element.id()).collect();
        let before = included.len();

        included.retain(|(element, _)| {
            let related = has_relations(element, &present);
            if !related {
                debug!(id:% = element.id(); "Dropping element with unsatisfied relations");
            }
            related
        });

        if included.len() == before {
            return included;
        }
    }
}

/// Move every element below the elements it refers to.
///
/// A connection, attached shape or label is pasted no earlier than its
/// source, target, host or label target, and any element below its retained
/// parent. Relations between members of one depth are ordered by priority
/// at paste time. Depths only grow, and only parent links add a level.
fn settle_depths(mut included: Vec<(&Element, usize)>) -> Vec<(&Element, usize)> {
    loop {
        let depths: HashMap<Id, usize> = included
            .iter()
            .map(|(element, depth)| (element.id(), *depth))
            .collect();

        let mut moved = false;
        for (element, depth) in &mut included {
            let required = required_depth(element, &depths);
            if required > *depth {
                trace!(id:% = element.id(), from = *depth, to = required; "Moving element below its references");
                *depth = required;
                moved = true;
            }
        }

        if !moved {
            return included;
        }
    }
}

fn required_depth(element: &Element, depths: &HashMap<Id, usize>) -> usize {
    let references = [
        element.source(),
        element.target(),
        element.label_target(),
        element.host(),
    ]
    .into_iter()
    .flatten()
    .filter_map(|id| depths.get(&id).copied());

    let below_parent = element
        .parent()
        .and_then(|parent| depths.get(&parent))
        .map(|depth| depth + 1);

    references.chain(below_parent).max().unwrap_or_default()
}

fn has_relations(element: &Element, present: &HashSet<Id>) -> bool {
    [
        element.source(),
        element.target(),
        element.label_target(),
        element.host(),
    ]
    .into_iter()
    .flatten()
    .all(|id| present.contains(&id))
}

#[cfg(test)]
mod tests {
    use collage_core::{
        geometry::{Bounds, Point, Size},
        model::Waypoint,
    };

    use super::*;
    use crate::{
        clipboard::Clipboard,
        collaborators::{Action, RuleContext},
        config::{AppConfig, PasteConfig},
        descriptor::Priority,
    };

    fn square() -> Bounds {
        Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 100.0))
    }

    /// b > {c, d, connA}, y > e > f > g, connB c -> w, t > {host, attacher}
    fn nested_diagram() -> Diagram {
        let mut diagram = Diagram::new();
        for root in ["a", "y", "z", "p", "t"] {
            diagram.add_root(Id::new(root), None).unwrap();
        }
        for (id, parent) in [
            ("b", "a"),
            ("c", "b"),
            ("d", "b"),
            ("e", "y"),
            ("f", "e"),
            ("g", "f"),
            ("w", "z"),
            ("host", "t"),
            ("attacher", "t"),
        ] {
            diagram
                .add_shape(Id::new(id), square(), Some(Id::new(parent)))
                .unwrap();
        }
        diagram
            .add_connection(
                Id::new("connA"),
                Id::new("c"),
                Id::new("d"),
                vec![Waypoint::new(Point::new(0.0, 0.0)).with_original(Point::new(50.0, 50.0))],
                Some(Id::new("b")),
            )
            .unwrap();
        diagram
            .add_connection(
                Id::new("connB"),
                Id::new("c"),
                Id::new("w"),
                vec![Waypoint::new(Point::new(0.0, 0.0))],
                Some(Id::new("p")),
            )
            .unwrap();
        diagram
            .attach(Id::new("attacher"), Id::new("host"))
            .unwrap();
        diagram
    }

    fn sorted(mut ids: Vec<Id>) -> Vec<String> {
        let mut names: Vec<String> = ids.drain(..).map(Id::to_name).collect();
        names.sort();
        names
    }

    fn tree_ids(diagram: &Diagram, selection: &[&str]) -> Forest {
        let copy_paste = CopyPaste::with_clipboard(Clipboard::shared());
        let selection = diagram
            .select(selection.iter().map(|id| Id::new(id)))
            .unwrap();
        copy_paste.create_tree(diagram, &selection).forest
    }

    #[test]
    fn test_tree_of_shapes() {
        let diagram = nested_diagram();
        let forest = tree_ids(&diagram, &["e", "f", "g"]);

        assert_eq!(forest.ids_at(0), vec![Id::new("e")]);
        assert_eq!(forest.ids_at(1), vec![Id::new("f")]);
        assert_eq!(forest.ids_at(2), vec![Id::new("g")]);
    }

    #[test]
    fn test_tree_of_shapes_and_connections() {
        let diagram = nested_diagram();
        let forest = tree_ids(&diagram, &["b", "c", "d", "e", "f", "g", "connA", "connB"]);

        assert_eq!(sorted(forest.ids_at(0)), vec!["b", "e"]);
        assert_eq!(sorted(forest.ids_at(1)), vec!["c", "connA", "d", "f"]);
        assert_eq!(sorted(forest.ids_at(2)), vec!["g"]);
        assert!(forest.find(Id::new("connB")).is_none());

        let (_, c) = forest.find(Id::new("c")).unwrap();
        assert_eq!(c.parent, Some(Id::new("b")));

        let (_, connection) = forest.find(Id::new("connA")).unwrap();
        assert_eq!(connection.source, Some(Id::new("c")));
        assert_eq!(connection.target, Some(Id::new("d")));
        assert_eq!(connection.priority, Priority::Connection);
    }

    #[test]
    fn test_tree_of_everything() {
        let diagram = nested_diagram();
        let forest = tree_ids(
            &diagram,
            &["b", "c", "d", "e", "f", "g", "connA", "connB", "host"],
        );

        assert_eq!(sorted(forest.ids_at(0)), vec!["attacher", "b", "e", "host"]);
        assert_eq!(sorted(forest.ids_at(1)), vec!["c", "connA", "d", "f"]);

        let (depth, attacher) = forest.find(Id::new("attacher")).unwrap();
        assert_eq!(depth, 0);
        assert_eq!(attacher.host, Some(Id::new("host")));
    }

    #[test]
    fn test_top_level_parent_is_cleared() {
        let diagram = nested_diagram();
        let forest = tree_ids(&diagram, &["b"]);

        let (_, b) = forest.find(Id::new("b")).unwrap();
        assert!(b.parent.is_none());
    }

    #[test]
    fn test_all_shapes_excludes_dropped() {
        let diagram = nested_diagram();
        let copy_paste = CopyPaste::with_clipboard(Clipboard::shared());
        let selection = diagram.select([Id::new("c"), Id::new("connB")]).unwrap();

        let tree = copy_paste.create_tree(&diagram, &selection);

        let ids: Vec<Id> = tree.all_shapes.iter().map(|element| element.id()).collect();
        assert_eq!(ids, vec![Id::new("c")]);
    }

    #[test]
    fn test_dropping_cascades() {
        let mut diagram = nested_diagram();
        diagram
            .add_label(Id::new("connB_label"), square(), Id::new("connB"), Some(Id::new("p")))
            .unwrap();
        let copy_paste = CopyPaste::with_clipboard(Clipboard::shared());
        let selection = diagram
            .select([Id::new("connB"), Id::new("connB_label")])
            .unwrap();

        let tree = copy_paste.create_tree(&diagram, &selection);

        assert!(tree.forest.is_empty());
        assert!(tree.all_shapes.is_empty());
    }

    #[test]
    fn test_denied_element_prunes_subtree() {
        let diagram = nested_diagram();
        let rules = |action: Action, context: &RuleContext<'_>| match context {
            RuleContext::Copy { element } => action != Action::ElementCopy || element.id() != "f",
            RuleContext::Paste { .. } => true,
        };
        let copy_paste = CopyPaste::new(Clipboard::shared(), rules, AppConfig::default());
        let selection = diagram.select([Id::new("e")]).unwrap();

        let forest = copy_paste.create_tree(&diagram, &selection).forest;

        assert_eq!(forest.ids_at(0), vec![Id::new("e")]);
        assert!(forest.depth(1).is_some_and(|bucket| bucket.is_empty()));
        assert!(forest.depth(2).is_none());
    }

    #[test]
    fn test_connections_can_be_disabled() {
        let diagram = nested_diagram();
        let config = AppConfig::new(CopyConfig::new(true, true, false), PasteConfig::default());
        let copy_paste = CopyPaste::new(Clipboard::shared(), crate::AllowAll, config);
        let selection = diagram.select([Id::new("b")]).unwrap();

        let forest = copy_paste.create_tree(&diagram, &selection).forest;

        // connA is still a nested child of b.
        assert_eq!(sorted(forest.ids_at(1)), vec!["c", "connA", "d"]);

        let selection = diagram.select([Id::new("c"), Id::new("d")]).unwrap();
        let forest = copy_paste.create_tree(&diagram, &selection).forest;
        assert_eq!(sorted(forest.ids_at(0)), vec!["c", "d"]);
    }

    #[test]
    fn test_connection_moves_to_deeper_endpoint() {
        let mut diagram = nested_diagram();
        diagram
            .add_connection(
                Id::new("b_to_d"),
                Id::new("b"),
                Id::new("d"),
                vec![Waypoint::new(Point::new(0.0, 0.0))],
                Some(Id::new("a")),
            )
            .unwrap();

        let forest = tree_ids(&diagram, &["b"]);

        let (depth, _) = forest.find(Id::new("b_to_d")).unwrap();
        assert_eq!(depth, 1);
        assert_eq!(sorted(forest.ids_at(0)), vec!["b"]);
    }

    #[test]
    fn test_attacher_moves_to_nested_host() {
        let mut diagram = nested_diagram();
        diagram.attach(Id::new("attacher"), Id::new("c")).unwrap();

        let forest = tree_ids(&diagram, &["attacher", "b"]);

        let (depth, attacher) = forest.find(Id::new("attacher")).unwrap();
        assert_eq!(depth, 1);
        assert_eq!(attacher.host, Some(Id::new("c")));
        assert_eq!(forest.ids_at(0), vec![Id::new("b")]);
    }

    #[test]
    fn test_moved_element_stays_below_its_parent() {
        let mut diagram = nested_diagram();
        // Nested in f, but attached to e: first reached at e's depth.
        diagram
            .add_shape(Id::new("pin"), square(), Some(Id::new("f")))
            .unwrap();
        diagram.attach(Id::new("pin"), Id::new("e")).unwrap();

        let forest = tree_ids(&diagram, &["e"]);

        let (depth, _) = forest.find(Id::new("pin")).unwrap();
        assert_eq!(depth, 2);
        let (depth, _) = forest.find(Id::new("g")).unwrap();
        assert_eq!(depth, 2);
    }

    #[test]
    fn test_root_is_transparent() {
        let diagram = nested_diagram();
        let forest = tree_ids(&diagram, &["t"]);

        assert!(forest.depth(0).is_some_and(|bucket| bucket.is_empty()));
        assert_eq!(sorted(forest.ids_at(1)), vec!["attacher", "host"]);

        let (_, host) = forest.find(Id::new("host")).unwrap();
        assert!(host.parent.is_none());
    }
}
