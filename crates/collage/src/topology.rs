//! Structural helpers over element selections.
//!
//! [`get_top_level`] reduces a selection to the elements that are not nested
//! inside another selected element, and [`each_element`] walks the nesting
//! tree below a set of roots.

use std::collections::HashSet;

use collage_core::{
    identifier::Id,
    model::{Diagram, Element},
};

/// Callbacks driven by [`each_element`].
pub trait Visitor<'a> {
    /// Called once per reached element, with its index among its siblings
    /// in the walk and its depth below the roots.
    fn visit(&mut self, element: &'a Element, index: usize, depth: usize);

    /// Children to walk next, or `None` to stop below `element`.
    ///
    /// Called right after [`Visitor::visit`] for the same element.
    fn descend(&mut self, element: &'a Element) -> Option<Vec<Id>>;
}

/// Returns the elements none of whose ancestors is part of `elements`.
///
/// Ancestors are found by following parent links through `diagram`, so an
/// element nested several levels below a selected element is excluded too.
/// The input order is kept; repeated elements are returned once.
pub fn get_top_level<'a>(diagram: &Diagram, elements: &[&'a Element]) -> Vec<&'a Element> {
    let selected: HashSet<Id> = elements.iter().map(|element| element.id()).collect();
    let mut seen = HashSet::new();

    elements
        .iter()
        .copied()
        .filter(|element| !has_selected_ancestor(diagram, element, &selected))
        .filter(|element| seen.insert(element.id()))
        .collect()
}

fn has_selected_ancestor(diagram: &Diagram, element: &Element, selected: &HashSet<Id>) -> bool {
    let mut current = element.parent();
    while let Some(parent) = current {
        if selected.contains(&parent) {
            return true;
        }
        current = diagram.element(parent).and_then(Element::parent);
    }
    false
}

/// Walks `roots` and their nested children depth-first.
///
/// Roots are visited at depth 0 in the given order. Child ids returned by
/// [`Visitor::descend`] that are unknown to `diagram` are skipped.
pub fn each_element<'a, V>(diagram: &'a Diagram, roots: &[&'a Element], visitor: &mut V)
where
    V: Visitor<'a>,
{
    walk(diagram, roots, 0, visitor);
}

fn walk<'a, V>(diagram: &'a Diagram, elements: &[&'a Element], depth: usize, visitor: &mut V)
where
    V: Visitor<'a>,
{
    for (index, &element) in elements.iter().enumerate() {
        visitor.visit(element, index, depth);

        let Some(children) = visitor.descend(element) else {
            continue;
        };
        let children: Vec<&'a Element> = children
            .into_iter()
            .filter_map(|id| diagram.element(id))
            .collect();
        if !children.is_empty() {
            walk(diagram, &children, depth + 1, visitor);
        }
    }
}
