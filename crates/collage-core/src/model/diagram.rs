//! The in-memory element arena.

use indexmap::IndexMap;
use log::trace;

use crate::{
    error::ModelError,
    geometry::Bounds,
    identifier::Id,
    model::element::{Element, ElementKind, Waypoint},
};

/// An insertion-ordered arena of diagram elements.
///
/// Every structural link is stored on both ends: adding a shape with a parent
/// also records it among the parent's children, adding a connection records
/// it among the source's outgoing and the target's incoming connections, and
/// so on. Elements are only added, never removed.
///
/// # Examples
///
/// ```
/// # use collage_core::{geometry::{Bounds, Point, Size}, identifier::Id, model::Diagram};
/// let mut diagram = Diagram::new();
/// let root = diagram.add_root(Id::new("root"), None).unwrap();
/// let bounds = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 100.0));
/// let shape = diagram.add_shape(Id::new("shape"), bounds, Some(root)).unwrap();
///
/// assert_eq!(diagram.element(root).unwrap().children(), &[shape]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    elements: IndexMap<Id, Element>,
    minted: usize,
}

impl Diagram {
    /// Create an empty diagram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a canvas root.
    pub fn add_root(&mut self, id: Id, bounds: Option<Bounds>) -> Result<Id, ModelError> {
        self.insert(Element::new(id, ElementKind::Root { bounds }), None)
    }

    /// Add a shape, optionally nested under `parent`.
    pub fn add_shape(
        &mut self,
        id: Id,
        bounds: Bounds,
        parent: Option<Id>,
    ) -> Result<Id, ModelError> {
        self.insert(Element::new(id, ElementKind::Shape { bounds }), parent)
    }

    /// Add a label describing `label_target`.
    pub fn add_label(
        &mut self,
        id: Id,
        bounds: Bounds,
        label_target: Id,
        parent: Option<Id>,
    ) -> Result<Id, ModelError> {
        self.get(label_target)?;

        let mut label = Element::new(id, ElementKind::Label { bounds });
        label.label_target = Some(label_target);
        let id = self.insert(label, parent)?;

        self.element_mut(label_target)?.labels.push(id);
        Ok(id)
    }

    /// Add a connection from `source` to `target`.
    pub fn add_connection(
        &mut self,
        id: Id,
        source: Id,
        target: Id,
        waypoints: Vec<Waypoint>,
        parent: Option<Id>,
    ) -> Result<Id, ModelError> {
        self.get(source)?;
        self.get(target)?;

        let kind = ElementKind::Connection {
            source,
            target,
            waypoints,
        };
        let id = self.insert(Element::new(id, kind), parent)?;

        self.element_mut(source)?.outgoing.push(id);
        self.element_mut(target)?.incoming.push(id);
        Ok(id)
    }

    /// Attach the shape `attacher` to the shape `host`.
    ///
    /// An existing attachment of `attacher` is replaced.
    pub fn attach(&mut self, attacher: Id, host: Id) -> Result<(), ModelError> {
        for id in [attacher, host] {
            if !matches!(self.get(id)?.kind(), ElementKind::Shape { .. }) {
                return Err(ModelError::NotAShape(id));
            }
        }

        if let Some(previous) = self.get(attacher)?.host() {
            self.element_mut(previous)?
                .attachers
                .retain(|existing| *existing != attacher);
        }

        self.element_mut(attacher)?.host = Some(host);
        self.element_mut(host)?.attachers.push(attacher);

        trace!(attacher:% = attacher, host:% = host; "Attached shape");
        Ok(())
    }

    /// Set a free-form property on an element.
    pub fn set_property(
        &mut self,
        id: Id,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), ModelError> {
        self.element_mut(id)?
            .properties
            .insert(key.into(), value.into());
        Ok(())
    }

    /// Look up an element.
    pub fn element(&self, id: Id) -> Option<&Element> {
        self.elements.get(&id)
    }

    /// Look up an element, failing with [`ModelError::MissingElement`].
    pub fn get(&self, id: Id) -> Result<&Element, ModelError> {
        self.element(id).ok_or(ModelError::MissingElement(id))
    }

    /// Look up several elements, preserving the requested order.
    pub fn select(&self, ids: impl IntoIterator<Item = Id>) -> Result<Vec<&Element>, ModelError> {
        ids.into_iter().map(|id| self.get(id)).collect()
    }

    /// Returns true if an element with `id` exists.
    pub fn contains(&self, id: Id) -> bool {
        self.elements.contains_key(&id)
    }

    /// Iterate over all elements in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if the diagram holds no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Produce an identifier of the form `<prefix>_<n>` that is not in use.
    pub fn mint_id(&mut self, prefix: &str) -> Id {
        loop {
            self.minted += 1;
            let id = Id::numbered(prefix, self.minted);
            if !self.contains(id) {
                return id;
            }
        }
    }

    fn element_mut(&mut self, id: Id) -> Result<&mut Element, ModelError> {
        self.elements
            .get_mut(&id)
            .ok_or(ModelError::MissingElement(id))
    }

    fn insert(&mut self, mut element: Element, parent: Option<Id>) -> Result<Id, ModelError> {
        let id = element.id();
        if self.contains(id) {
            return Err(ModelError::DuplicateId(id));
        }

        if let Some(parent) = parent {
            self.element_mut(parent)?.children.push(id);
            element.parent = Some(parent);
        }

        self.elements.insert(id, element);
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Size};

    fn square(x: f32, y: f32) -> Bounds {
        Bounds::new_from_top_left(Point::new(x, y), Size::new(100.0, 100.0))
    }

    fn diagram_with_two_shapes() -> Diagram {
        let mut diagram = Diagram::new();
        let root = diagram.add_root(Id::new("root"), None).unwrap();
        diagram
            .add_shape(Id::new("a"), square(0.0, 0.0), Some(root))
            .unwrap();
        diagram
            .add_shape(Id::new("b"), square(200.0, 0.0), Some(root))
            .unwrap();
        diagram
    }

    #[test]
    fn test_add_shape_links_parent() {
        let diagram = diagram_with_two_shapes();

        let root = diagram.element(Id::new("root")).unwrap();
        assert_eq!(root.children(), &[Id::new("a"), Id::new("b")]);
        assert_eq!(diagram.element(Id::new("a")).unwrap().parent(), Some(root.id()));
        assert_eq!(diagram.len(), 3);
    }

    #[test]
    fn test_add_shape_with_missing_parent() {
        let mut diagram = Diagram::new();
        let result = diagram.add_shape(Id::new("a"), square(0.0, 0.0), Some(Id::new("nope")));

        assert_eq!(result, Err(ModelError::MissingElement(Id::new("nope"))));
        assert!(diagram.is_empty());
    }

    #[test]
    fn test_duplicate_id() {
        let mut diagram = diagram_with_two_shapes();
        let result = diagram.add_shape(Id::new("a"), square(0.0, 0.0), None);

        assert_eq!(result, Err(ModelError::DuplicateId(Id::new("a"))));
    }

    #[test]
    fn test_add_connection_links_endpoints() {
        let mut diagram = diagram_with_two_shapes();
        let waypoints = vec![
            Waypoint::new(Point::new(50.0, 50.0)),
            Waypoint::new(Point::new(250.0, 50.0)),
        ];
        let connection = diagram
            .add_connection(
                Id::new("a_to_b"),
                Id::new("a"),
                Id::new("b"),
                waypoints,
                Some(Id::new("root")),
            )
            .unwrap();

        let a = diagram.element(Id::new("a")).unwrap();
        let b = diagram.element(Id::new("b")).unwrap();
        assert_eq!(a.outgoing(), &[connection]);
        assert_eq!(b.incoming(), &[connection]);

        let element = diagram.element(connection).unwrap();
        assert!(element.is_connection());
        assert_eq!(element.source(), Some(Id::new("a")));
        assert_eq!(element.target(), Some(Id::new("b")));
        assert_eq!(
            element.bbox().unwrap().min_point(),
            Point::new(50.0, 50.0)
        );
    }

    #[test]
    fn test_add_label_links_target() {
        let mut diagram = diagram_with_two_shapes();
        let label = diagram
            .add_label(Id::new("a_label"), square(0.0, 110.0), Id::new("a"), None)
            .unwrap();

        assert_eq!(diagram.element(Id::new("a")).unwrap().labels(), &[label]);
        assert_eq!(
            diagram.element(label).unwrap().label_target(),
            Some(Id::new("a"))
        );
    }

    #[test]
    fn test_attach_replaces_previous_host() {
        let mut diagram = diagram_with_two_shapes();
        diagram
            .add_shape(Id::new("boundary"), square(80.0, 80.0), None)
            .unwrap();

        diagram.attach(Id::new("boundary"), Id::new("a")).unwrap();
        diagram.attach(Id::new("boundary"), Id::new("b")).unwrap();

        assert!(diagram.element(Id::new("a")).unwrap().attachers().is_empty());
        assert_eq!(
            diagram.element(Id::new("b")).unwrap().attachers(),
            &[Id::new("boundary")]
        );
        assert_eq!(
            diagram.element(Id::new("boundary")).unwrap().host(),
            Some(Id::new("b"))
        );
    }

    #[test]
    fn test_attach_to_root_fails() {
        let mut diagram = diagram_with_two_shapes();
        let result = diagram.attach(Id::new("a"), Id::new("root"));

        assert_eq!(result, Err(ModelError::NotAShape(Id::new("root"))));
    }

    #[test]
    fn test_mint_id_skips_existing() {
        let mut diagram = Diagram::new();
        diagram
            .add_shape(Id::new("shape_1"), square(0.0, 0.0), None)
            .unwrap();

        assert_eq!(diagram.mint_id("shape"), "shape_2");
        assert_eq!(diagram.mint_id("shape"), "shape_3");
    }

    #[test]
    fn test_select_preserves_order() {
        let diagram = diagram_with_two_shapes();
        let selected = diagram.select([Id::new("b"), Id::new("a")]).unwrap();

        let ids: Vec<Id> = selected.iter().map(|element| element.id()).collect();
        assert_eq!(ids, vec![Id::new("b"), Id::new("a")]);
        assert!(diagram.select([Id::new("missing")]).is_err());
    }

    #[test]
    fn test_set_property() {
        let mut diagram = diagram_with_two_shapes();
        diagram.set_property(Id::new("a"), "name", "Task A").unwrap();

        let a = diagram.element(Id::new("a")).unwrap();
        assert_eq!(a.properties().get("name").map(String::as_str), Some("Task A"));
    }
}
