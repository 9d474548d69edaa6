//! Diagram element types.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    geometry::{self, Bounds, Point},
    identifier::Id,
};

/// A single bend point of a connection.
///
/// `original` keeps the point the waypoint was docked to before cropping
/// against the connected shapes, when the editor tracks it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    point: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    original: Option<Point>,
}

impl Waypoint {
    /// Create a waypoint without an original docking point.
    pub fn new(point: Point) -> Self {
        Self {
            point,
            original: None,
        }
    }

    /// Set the original docking point (builder style).
    pub fn with_original(mut self, original: Point) -> Self {
        self.original = Some(original);
        self
    }

    /// Get the position of the waypoint.
    pub fn point(&self) -> Point {
        self.point
    }

    /// Get the original docking point, if any.
    pub fn original(&self) -> Option<Point> {
        self.original
    }

    /// Return a copy of this waypoint moved by `offset`, original included.
    pub fn translate(&self, offset: Point) -> Self {
        Self {
            point: self.point.add_point(offset),
            original: self.original.map(|original| original.add_point(offset)),
        }
    }
}

/// The geometric class of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    /// A canvas root. Roots may carry bounds so they can act as paste targets.
    Root { bounds: Option<Bounds> },
    /// A regular shape, positioned by its top-left corner.
    Shape { bounds: Bounds },
    /// A label shape attached to another element.
    Label { bounds: Bounds },
    /// A connection between two elements.
    Connection {
        source: Id,
        target: Id,
        waypoints: Vec<Waypoint>,
    },
}

/// A diagram element together with its structural links.
///
/// Links are stored as identifiers; the owning [`Diagram`](super::Diagram)
/// keeps both directions of each link consistent.
#[derive(Debug, Clone)]
pub struct Element {
    id: Id,
    kind: ElementKind,
    pub(super) parent: Option<Id>,
    pub(super) children: Vec<Id>,
    pub(super) host: Option<Id>,
    pub(super) attachers: Vec<Id>,
    pub(super) label_target: Option<Id>,
    pub(super) labels: Vec<Id>,
    pub(super) incoming: Vec<Id>,
    pub(super) outgoing: Vec<Id>,
    pub(super) properties: IndexMap<String, String>,
}

impl Element {
    pub(super) fn new(id: Id, kind: ElementKind) -> Self {
        Self {
            id,
            kind,
            parent: None,
            children: Vec::new(),
            host: None,
            attachers: Vec::new(),
            label_target: None,
            labels: Vec::new(),
            incoming: Vec::new(),
            outgoing: Vec::new(),
            properties: IndexMap::new(),
        }
    }

    /// Get the element identifier.
    pub fn id(&self) -> Id {
        self.id
    }

    /// Borrow the element's kind.
    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// Get the parent element identifier.
    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    /// Nested children, in insertion order.
    pub fn children(&self) -> &[Id] {
        &self.children
    }

    /// The shape this element is attached to.
    pub fn host(&self) -> Option<Id> {
        self.host
    }

    /// Shapes attached to this element.
    pub fn attachers(&self) -> &[Id] {
        &self.attachers
    }

    /// The element this label describes.
    pub fn label_target(&self) -> Option<Id> {
        self.label_target
    }

    /// Labels describing this element.
    pub fn labels(&self) -> &[Id] {
        &self.labels
    }

    /// Connections ending at this element.
    pub fn incoming(&self) -> &[Id] {
        &self.incoming
    }

    /// Connections starting at this element.
    pub fn outgoing(&self) -> &[Id] {
        &self.outgoing
    }

    /// Free-form properties carried by the element.
    pub fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }

    /// Source of a connection.
    pub fn source(&self) -> Option<Id> {
        match &self.kind {
            ElementKind::Connection { source, .. } => Some(*source),
            _ => None,
        }
    }

    /// Target of a connection.
    pub fn target(&self) -> Option<Id> {
        match &self.kind {
            ElementKind::Connection { target, .. } => Some(*target),
            _ => None,
        }
    }

    /// Waypoints of a connection.
    pub fn waypoints(&self) -> Option<&[Waypoint]> {
        match &self.kind {
            ElementKind::Connection { waypoints, .. } => Some(waypoints),
            _ => None,
        }
    }

    /// Bounds of a shape or label, as stored.
    ///
    /// Connections and roots have no stored shape bounds; see [`Element::bbox`].
    pub fn shape_bounds(&self) -> Option<Bounds> {
        match &self.kind {
            ElementKind::Shape { bounds } | ElementKind::Label { bounds } => Some(*bounds),
            _ => None,
        }
    }

    /// The area covered by the element.
    ///
    /// For connections this is the box around all waypoints; for roots the
    /// optional configured bounds.
    pub fn bbox(&self) -> Option<Bounds> {
        match &self.kind {
            ElementKind::Root { bounds } => *bounds,
            ElementKind::Shape { bounds } | ElementKind::Label { bounds } => Some(*bounds),
            ElementKind::Connection { waypoints, .. } => {
                Bounds::from_points(waypoints.iter().map(Waypoint::point))
            }
        }
    }

    /// Returns true for connections.
    pub fn is_connection(&self) -> bool {
        matches!(self.kind, ElementKind::Connection { .. })
    }

    /// Returns true for labels.
    pub fn is_label(&self) -> bool {
        matches!(self.kind, ElementKind::Label { .. })
    }

    /// Returns true for roots.
    pub fn is_root(&self) -> bool {
        matches!(self.kind, ElementKind::Root { .. })
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// The box covering every element's [`Element::bbox`].
///
/// Elements without geometry contribute nothing. Returns `None` if no element
/// has geometry.
pub fn bounding_box<'a>(elements: impl IntoIterator<Item = &'a Element>) -> Option<Bounds> {
    geometry::union(elements.into_iter().filter_map(Element::bbox))
}
