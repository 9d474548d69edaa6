//! Contracts of the services copy/paste relies on, with reference implementations.
//!
//! - [`Rules`] decides whether an element may be copied or a descriptor pasted.
//! - [`ElementFactory`] turns a descriptor into a shape template.
//! - [`Modeling`] inserts new elements into a diagram.
//!
//! [`Diagram`] implements [`Modeling`], so an in-memory diagram can be pasted
//! into directly.

use std::fmt;

use indexmap::IndexMap;
use log::trace;

use collage_core::{
    error::ModelError,
    geometry::{Bounds, Point, Size},
    identifier::Id,
    model::{Diagram, Element, ElementKind, Waypoint},
};

use crate::descriptor::Descriptor;

/// Actions subject to a rule check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ElementCopy,
    ElementPaste,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ElementCopy => f.write_str("element.copy"),
            Self::ElementPaste => f.write_str("element.paste"),
        }
    }
}

/// What a rule check is about.
#[derive(Debug, Clone, Copy)]
pub enum RuleContext<'a> {
    /// An element about to be included in a copy.
    Copy { element: &'a Element },
    /// A descriptor about to be pasted under `target`.
    Paste {
        descriptor: &'a Descriptor,
        target: Id,
    },
}

/// Permission checks consulted while copying and pasting.
pub trait Rules {
    /// Returns true if `action` is allowed in `context`.
    fn allowed(&self, action: Action, context: &RuleContext<'_>) -> bool;
}

/// Rules that permit everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Rules for AllowAll {
    fn allowed(&self, _action: Action, _context: &RuleContext<'_>) -> bool {
        true
    }
}

impl<F> Rules for F
where
    F: Fn(Action, &RuleContext<'_>) -> bool,
{
    fn allowed(&self, action: Action, context: &RuleContext<'_>) -> bool {
        self(action, context)
    }
}

/// An in-memory shape prepared for insertion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeTemplate {
    pub size: Size,
    pub properties: IndexMap<String, String>,
}

/// A connection prepared for insertion, with absolute waypoints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionTemplate {
    pub waypoints: Vec<Waypoint>,
    pub properties: IndexMap<String, String>,
}

/// Builds shape templates from descriptors.
pub trait ElementFactory {
    fn create_shape(&self, descriptor: &Descriptor) -> ShapeTemplate;
}

/// Copies size and properties from the descriptor.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultElementFactory;

impl ElementFactory for DefaultElementFactory {
    fn create_shape(&self, descriptor: &Descriptor) -> ShapeTemplate {
        ShapeTemplate {
            size: descriptor.bounds.map(Bounds::to_size).unwrap_or_default(),
            properties: descriptor.properties.clone(),
        }
    }
}

/// Inserts new elements into a diagram.
///
/// Positions passed to shape and label creation are element centers.
pub trait Modeling {
    /// Create a shape under `parent`.
    ///
    /// When `is_host` is true, `parent` is the host the new shape is attached
    /// to, and the shape is nested under the host's own parent.
    fn create_shape(
        &mut self,
        shape: ShapeTemplate,
        position: Point,
        parent: Id,
        is_host: bool,
    ) -> Result<Id, ModelError>;

    /// Create a label describing `label_target`, nested under `parent`.
    fn create_label(
        &mut self,
        label: ShapeTemplate,
        position: Point,
        label_target: Id,
        parent: Id,
    ) -> Result<Id, ModelError>;

    /// Create a connection from `source` to `target`, nested under `parent`.
    fn create_connection(
        &mut self,
        source: Id,
        target: Id,
        connection: ConnectionTemplate,
        parent: Id,
    ) -> Result<Id, ModelError>;
}

impl Modeling for Diagram {
    fn create_shape(
        &mut self,
        shape: ShapeTemplate,
        position: Point,
        parent: Id,
        is_host: bool,
    ) -> Result<Id, ModelError> {
        let (parent, host) = if is_host {
            let host = self.get(parent)?;
            if !matches!(host.kind(), ElementKind::Shape { .. }) {
                return Err(ModelError::NotAShape(host.id()));
            }
            (host.parent(), Some(host.id()))
        } else {
            (Some(parent), None)
        };

        let id = self.mint_id("shape");
        self.add_shape(id, Bounds::new_from_center(position, shape.size), parent)?;
        if let Some(host) = host {
            self.attach(id, host)?;
        }
        for (key, value) in shape.properties {
            self.set_property(id, key, value)?;
        }

        trace!(id:% = id, x = position.x(), y = position.y(); "Created shape");
        Ok(id)
    }

    fn create_label(
        &mut self,
        label: ShapeTemplate,
        position: Point,
        label_target: Id,
        parent: Id,
    ) -> Result<Id, ModelError> {
        let id = self.mint_id("label");
        let bounds = Bounds::new_from_center(position, label.size);
        self.add_label(id, bounds, label_target, Some(parent))?;
        for (key, value) in label.properties {
            self.set_property(id, key, value)?;
        }

        trace!(id:% = id, label_target:% = label_target; "Created label");
        Ok(id)
    }

    fn create_connection(
        &mut self,
        source: Id,
        target: Id,
        connection: ConnectionTemplate,
        parent: Id,
    ) -> Result<Id, ModelError> {
        let id = self.mint_id("connection");
        self.add_connection(id, source, target, connection.waypoints, Some(parent))?;
        for (key, value) in connection.properties {
            self.set_property(id, key, value)?;
        }

        trace!(id:% = id, source:% = source, target:% = target; "Created connection");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32) -> Bounds {
        Bounds::new_from_top_left(Point::new(x, y), Size::new(100.0, 100.0))
    }

    fn diagram() -> Diagram {
        let mut diagram = Diagram::new();
        let root = diagram.add_root(Id::new("root"), None).unwrap();
        diagram
            .add_shape(Id::new("host"), square(0.0, 0.0), Some(root))
            .unwrap();
        diagram
    }

    #[test]
    fn test_allow_all() {
        let diagram = diagram();
        let element = diagram.element(Id::new("host")).unwrap();
        let context = RuleContext::Copy { element };

        assert!(AllowAll.allowed(Action::ElementCopy, &context));
    }

    #[test]
    fn test_closure_rules() {
        let deny_paste = |action: Action, _: &RuleContext<'_>| action != Action::ElementPaste;
        let descriptor = Descriptor::new(Id::new("host"));
        let context = RuleContext::Paste {
            descriptor: &descriptor,
            target: Id::new("root"),
        };

        assert!(!deny_paste.allowed(Action::ElementPaste, &context));
        assert!(deny_paste.allowed(Action::ElementCopy, &context));
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::ElementCopy.to_string(), "element.copy");
        assert_eq!(Action::ElementPaste.to_string(), "element.paste");
    }

    #[test]
    fn test_default_factory() {
        let mut descriptor = Descriptor::new(Id::new("host"));
        descriptor.bounds = Some(square(10.0, 10.0));
        descriptor
            .properties
            .insert("name".to_string(), "Host".to_string());

        let template = DefaultElementFactory.create_shape(&descriptor);
        assert_eq!(template.size, Size::new(100.0, 100.0));
        assert_eq!(template.properties.len(), 1);
    }

    #[test]
    fn test_create_shape_centers_on_position() {
        let mut diagram = diagram();
        let template = ShapeTemplate {
            size: Size::new(40.0, 20.0),
            properties: IndexMap::new(),
        };

        let id = diagram
            .create_shape(template, Point::new(100.0, 100.0), Id::new("root"), false)
            .unwrap();

        let created = diagram.element(id).unwrap();
        assert_eq!(created.parent(), Some(Id::new("root")));
        assert_eq!(
            created.shape_bounds().unwrap().min_point(),
            Point::new(80.0, 90.0)
        );
    }

    #[test]
    fn test_create_shape_on_host() {
        let mut diagram = diagram();

        let id = diagram
            .create_shape(
                ShapeTemplate::default(),
                Point::new(100.0, 0.0),
                Id::new("host"),
                true,
            )
            .unwrap();

        let created = diagram.element(id).unwrap();
        assert_eq!(created.host(), Some(Id::new("host")));
        assert_eq!(created.parent(), Some(Id::new("root")));
        assert_eq!(
            diagram.element(Id::new("host")).unwrap().attachers(),
            &[id]
        );
    }

    #[test]
    fn test_create_shape_on_root_host_fails() {
        let mut diagram = diagram();
        let before = diagram.len();

        let result = diagram.create_shape(
            ShapeTemplate::default(),
            Point::default(),
            Id::new("root"),
            true,
        );

        assert_eq!(result, Err(ModelError::NotAShape(Id::new("root"))));
        assert_eq!(diagram.len(), before);
    }

    #[test]
    fn test_create_connection_and_label() {
        let mut diagram = diagram();
        diagram
            .add_shape(Id::new("other"), square(300.0, 0.0), Some(Id::new("root")))
            .unwrap();

        let connection = diagram
            .create_connection(
                Id::new("host"),
                Id::new("other"),
                ConnectionTemplate {
                    waypoints: vec![
                        Waypoint::new(Point::new(50.0, 50.0)),
                        Waypoint::new(Point::new(350.0, 50.0)),
                    ],
                    properties: IndexMap::new(),
                },
                Id::new("root"),
            )
            .unwrap();
        let label = diagram
            .create_label(
                ShapeTemplate::default(),
                Point::new(200.0, 40.0),
                connection,
                Id::new("root"),
            )
            .unwrap();

        assert_eq!(
            diagram.element(Id::new("host")).unwrap().outgoing(),
            &[connection]
        );
        assert_eq!(diagram.element(label).unwrap().label_target(), Some(connection));
    }
}
