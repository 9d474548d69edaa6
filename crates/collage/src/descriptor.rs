//! Descriptors and the descriptor registry.
//!
//! A [`Descriptor`] is the reference-free snapshot of one element that is
//! stored on the clipboard. Descriptors are produced by threading a fresh
//! descriptor through every transform of a [`DescriptorRegistry`], in
//! registration order. The registry always starts with [`base_descriptor`];
//! callers append domain-specific transforms such as [`copy_properties`].
//!
//! # Example
//!
//! ```
//! # use collage::descriptor::{DescriptorRegistry, copy_properties};
//! let mut registry = DescriptorRegistry::new();
//! registry.register(copy_properties).unwrap();
//!
//! // The same transform cannot be registered twice.
//! assert!(registry.register(copy_properties).is_err());
//! assert_eq!(registry.len(), 2);
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use collage_core::{
    geometry::{Bounds, Point},
    identifier::Id,
    model::{Element, ElementKind, Waypoint},
};

use crate::error::DescriptorError;

/// Creation-order class of a descriptor.
///
/// Within one depth, lower priorities are pasted first so that the elements
/// other descriptors refer to already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Shapes that depend on nothing at their depth.
    Independent = 1,
    /// Attached shapes and labels.
    Attached = 2,
    /// Connections.
    Connection = 3,
}

impl Priority {
    /// Numeric value of the priority class.
    pub fn value(self) -> u8 {
        self as u8
    }
}

/// Offset of a copied element from the selection anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Delta {
    /// Offset of a shape's top-left corner.
    Shape(Point),
    /// Offset of every waypoint of a connection.
    Waypoints(Vec<Point>),
}

/// A plain, serializable snapshot of one diagram element.
///
/// Descriptors never hold element references, only identifiers and values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Identifier of the copied element.
    pub id: Id,
    /// Creation-order class.
    pub priority: Priority,
    /// Identifier of the copied element's parent.
    pub parent: Option<Id>,
    /// Identifier of the host, for attached shapes.
    pub host: Option<Id>,
    /// Identifier of the described element, for labels.
    pub label_target: Option<Id>,
    /// Shape geometry, copied by value.
    pub bounds: Option<Bounds>,
    /// Connection waypoints, copied by value.
    pub waypoints: Option<Vec<Waypoint>>,
    /// Connection source.
    pub source: Option<Id>,
    /// Connection target.
    pub target: Option<Id>,
    /// Properties copied by extension transforms.
    #[serde(default)]
    pub properties: IndexMap<String, String>,
    /// Offset from the selection anchor, set when the descriptor is copied.
    pub delta: Option<Delta>,
}

impl Descriptor {
    /// Create a descriptor that only carries the element's identity.
    pub fn new(id: Id) -> Self {
        Self {
            id,
            priority: Priority::Independent,
            parent: None,
            host: None,
            label_target: None,
            bounds: None,
            waypoints: None,
            source: None,
            target: None,
            properties: IndexMap::new(),
            delta: None,
        }
    }

    /// Returns true if the descriptor describes a connection.
    pub fn is_connection(&self) -> bool {
        self.waypoints.is_some()
    }
}

/// A descriptor transform.
///
/// Receives the element being copied and the descriptor built so far, and
/// returns the augmented descriptor.
pub type DescriptorFn = fn(&Element, Descriptor) -> Descriptor;

/// The built-in transform copying identity, relations and geometry.
///
/// Assigns [`Priority::Attached`] to labels and attached shapes and
/// [`Priority::Connection`] to connections.
pub fn base_descriptor(element: &Element, mut descriptor: Descriptor) -> Descriptor {
    descriptor.id = element.id();
    descriptor.priority = Priority::Independent;
    descriptor.parent = element.parent();

    if let Some(label_target) = element.label_target() {
        descriptor.priority = Priority::Attached;
        descriptor.label_target = Some(label_target);
    }

    if let Some(host) = element.host() {
        descriptor.priority = Priority::Attached;
        descriptor.host = Some(host);
    }

    descriptor.bounds = element.shape_bounds();

    if let ElementKind::Connection {
        source,
        target,
        waypoints,
    } = element.kind()
    {
        descriptor.priority = Priority::Connection;
        descriptor.waypoints = Some(waypoints.clone());
        descriptor.source = Some(*source);
        descriptor.target = Some(*target);
    }

    descriptor
}

/// Extension transform copying the element's free-form properties.
pub fn copy_properties(element: &Element, mut descriptor: Descriptor) -> Descriptor {
    descriptor.properties.extend(
        element
            .properties()
            .iter()
            .map(|(key, value)| (key.clone(), value.clone())),
    );
    descriptor
}

/// Ordered list of descriptor transforms.
#[derive(Debug, Clone)]
pub struct DescriptorRegistry {
    transforms: Vec<DescriptorFn>,
}

impl Default for DescriptorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DescriptorRegistry {
    /// Create a registry holding only [`base_descriptor`].
    pub fn new() -> Self {
        Self {
            transforms: vec![base_descriptor],
        }
    }

    /// Append a transform.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Duplicate`] if `transform` is already registered.
    pub fn register(&mut self, transform: DescriptorFn) -> Result<(), DescriptorError> {
        if self
            .transforms
            .iter()
            .any(|existing| std::ptr::fn_addr_eq(*existing, transform))
        {
            return Err(DescriptorError::Duplicate);
        }

        self.transforms.push(transform);
        Ok(())
    }

    /// Build the descriptor of `element`.
    pub fn execute(&self, element: &Element) -> Descriptor {
        self.transforms
            .iter()
            .fold(Descriptor::new(element.id()), |descriptor, transform| {
                transform(element, descriptor)
            })
    }

    /// Number of registered transforms, the built-in one included.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Always false: the built-in transform is registered by construction.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}
