//! TOML scene files.
//!
//! A scene lists the elements of one diagram as arrays of tables:
//!
//! ```toml
//! [[root]]
//! id = "root"
//!
//! [[shape]]
//! id = "task"
//! parent = "root"
//! x = 100
//! y = 100
//! width = 120
//! height = 80
//!
//! [[connection]]
//! id = "flow"
//! parent = "root"
//! source = "task"
//! target = "review"
//! waypoints = [{ x = 160, y = 140 }, { x = 400, y = 140 }]
//! ```
//!
//! Shapes may name a `host` they are attached to; labels name the `target`
//! they describe. Every element may carry a `properties` table of strings.

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use collage::{
    CollageError,
    geometry::{Bounds, Point, Size},
    identifier::Id,
    model::{Diagram, ElementKind, Waypoint},
};

/// The serialized form of a [`Diagram`].
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default, rename = "root", skip_serializing_if = "Vec::is_empty")]
    roots: Vec<RootRecord>,

    #[serde(default, rename = "shape", skip_serializing_if = "Vec::is_empty")]
    shapes: Vec<ShapeRecord>,

    #[serde(default, rename = "label", skip_serializing_if = "Vec::is_empty")]
    labels: Vec<LabelRecord>,

    #[serde(default, rename = "connection", skip_serializing_if = "Vec::is_empty")]
    connections: Vec<ConnectionRecord>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Rect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl From<Rect> for Bounds {
    fn from(rect: Rect) -> Self {
        Bounds::new_from_top_left(Point::new(rect.x, rect.y), Size::new(rect.width, rect.height))
    }
}

impl From<Bounds> for Rect {
    fn from(bounds: Bounds) -> Self {
        Self {
            x: bounds.min_x(),
            y: bounds.min_y(),
            width: bounds.width(),
            height: bounds.height(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct WaypointRecord {
    x: f32,
    y: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    original: Option<Point>,
}

impl From<WaypointRecord> for Waypoint {
    fn from(record: WaypointRecord) -> Self {
        let waypoint = Waypoint::new(Point::new(record.x, record.y));
        match record.original {
            Some(original) => waypoint.with_original(original),
            None => waypoint,
        }
    }
}

impl From<&Waypoint> for WaypointRecord {
    fn from(waypoint: &Waypoint) -> Self {
        Self {
            x: waypoint.point().x(),
            y: waypoint.point().y(),
            original: waypoint.original(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct RootRecord {
    id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bounds: Option<Rect>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ShapeRecord {
    id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    host: Option<Id>,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    properties: IndexMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct LabelRecord {
    id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<Id>,
    target: Id,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    properties: IndexMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ConnectionRecord {
    id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent: Option<Id>,
    source: Id,
    target: Id,
    waypoints: Vec<WaypointRecord>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    properties: IndexMap<String, String>,
}

/// Parse a TOML scene into a diagram.
///
/// # Errors
///
/// Returns [`CollageError::Scene`] for malformed TOML or shapes whose parent
/// never appears, and [`CollageError::Model`] for dangling references and
/// duplicate ids.
pub fn parse(source: &str) -> Result<Diagram, CollageError> {
    let scene: Scene =
        toml::from_str(source).map_err(|err| CollageError::Scene(err.to_string()))?;
    scene.into_diagram()
}

/// Render a diagram as a TOML scene.
///
/// # Errors
///
/// Returns [`CollageError::Scene`] if serialization fails.
pub fn render(diagram: &Diagram) -> Result<String, CollageError> {
    toml::to_string(&Scene::from_diagram(diagram)).map_err(|err| CollageError::Scene(err.to_string()))
}

impl Scene {
    /// Build a diagram, adding elements only once everything they refer to
    /// exists.
    pub fn into_diagram(self) -> Result<Diagram, CollageError> {
        let mut diagram = Diagram::new();

        for root in self.roots {
            diagram.add_root(root.id, root.bounds.map(Bounds::from))?;
        }

        // Shapes may be listed before their parent.
        let mut pending = self.shapes;
        let mut hosts = Vec::new();
        while !pending.is_empty() {
            let before = pending.len();
            let mut waiting = Vec::new();
            for shape in pending {
                if shape.parent.is_some_and(|parent| !diagram.contains(parent)) {
                    waiting.push(shape);
                    continue;
                }

                let bounds = Bounds::new_from_top_left(
                    Point::new(shape.x, shape.y),
                    Size::new(shape.width, shape.height),
                );
                diagram.add_shape(shape.id, bounds, shape.parent)?;
                set_properties(&mut diagram, shape.id, shape.properties)?;
                if let Some(host) = shape.host {
                    hosts.push((shape.id, host));
                }
            }

            if waiting.len() == before {
                let ids: Vec<String> = waiting.iter().map(|shape| shape.id.to_name()).collect();
                return Err(CollageError::Scene(format!(
                    "shapes with missing parents: {}",
                    ids.join(", ")
                )));
            }
            pending = waiting;
        }

        for (attacher, host) in hosts {
            diagram.attach(attacher, host)?;
        }

        for connection in self.connections {
            diagram.add_connection(
                connection.id,
                connection.source,
                connection.target,
                connection.waypoints.into_iter().map(Waypoint::from).collect(),
                connection.parent,
            )?;
            set_properties(&mut diagram, connection.id, connection.properties)?;
        }

        for label in self.labels {
            let bounds = Bounds::new_from_top_left(
                Point::new(label.x, label.y),
                Size::new(label.width, label.height),
            );
            diagram.add_label(label.id, bounds, label.target, label.parent)?;
            set_properties(&mut diagram, label.id, label.properties)?;
        }

        debug!(elements = diagram.len(); "Scene loaded");
        Ok(diagram)
    }

    /// Capture every element of `diagram`, in insertion order per kind.
    pub fn from_diagram(diagram: &Diagram) -> Self {
        let mut scene = Self::default();

        for element in diagram.elements() {
            let id = element.id();
            let parent = element.parent();
            let properties = element.properties().clone();

            match element.kind() {
                ElementKind::Root { bounds } => scene.roots.push(RootRecord {
                    id,
                    bounds: bounds.map(Rect::from),
                }),
                ElementKind::Shape { bounds } => scene.shapes.push(ShapeRecord {
                    id,
                    parent,
                    host: element.host(),
                    x: bounds.min_x(),
                    y: bounds.min_y(),
                    width: bounds.width(),
                    height: bounds.height(),
                    properties,
                }),
                ElementKind::Label { bounds } => {
                    let Some(target) = element.label_target() else {
                        continue;
                    };
                    scene.labels.push(LabelRecord {
                        id,
                        parent,
                        target,
                        x: bounds.min_x(),
                        y: bounds.min_y(),
                        width: bounds.width(),
                        height: bounds.height(),
                        properties,
                    });
                }
                ElementKind::Connection {
                    source,
                    target,
                    waypoints,
                } => scene.connections.push(ConnectionRecord {
                    id,
                    parent,
                    source: *source,
                    target: *target,
                    waypoints: waypoints.iter().map(WaypointRecord::from).collect(),
                    properties,
                }),
            }
        }

        scene
    }
}

fn set_properties(
    diagram: &mut Diagram,
    id: Id,
    properties: IndexMap<String, String>,
) -> Result<(), CollageError> {
    for (key, value) in properties {
        diagram.set_property(id, key, value)?;
    }
    Ok(())
}
