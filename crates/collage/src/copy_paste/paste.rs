//! Replaying a stored forest as new elements.
//!
//! Each descriptor goes through three stages before it reaches the modeling
//! service: its parent is resolved and checked against the paste rules, its
//! geometry is placed relative to the paste anchor ([`Placement`]), and its
//! remaining references are resolved against already pasted elements
//! ([`Request`]). The stored descriptors themselves are never modified.

use std::fmt;

use indexmap::IndexMap;
use log::{debug, info, trace, warn};

use collage_core::{
    error::ModelError,
    geometry::Point,
    identifier::Id,
    model::{Element, Waypoint},
};

use super::CopyPaste;
use crate::{
    collaborators::{ConnectionTemplate, ElementFactory, Modeling, Rules, ShapeTemplate},
    descriptor::{Delta, Descriptor},
    error::{LinkRole, PasteError},
};

/// Where to paste: the element new top-level elements are nested under, and
/// the point the copied selection's center lands on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PasteTarget {
    id: Id,
    center: Point,
}

impl PasteTarget {
    /// Create a paste target.
    pub fn new(id: Id, center: Point) -> Self {
        Self { id, center }
    }

    /// The parent of pasted top-level elements.
    pub fn id(&self) -> Id {
        self.id
    }

    /// The point the copied selection's center is moved to.
    pub fn center(&self) -> Point {
        self.center
    }
}

impl From<&Element> for PasteTarget {
    /// Targets the element's bounding-box center, or the origin for elements
    /// without geometry.
    fn from(element: &Element) -> Self {
        let center = element
            .bbox()
            .map(|bounds| bounds.center())
            .unwrap_or_default();
        Self::new(element.id(), center)
    }
}

/// Why a descriptor was not pasted.
#[derive(Debug, PartialEq)]
pub enum SkipReason {
    /// The paste rules refused it.
    Denied,
    /// It could not be resolved or created.
    Failed(PasteError),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Denied => f.write_str("denied by paste rules"),
            Self::Failed(err) => fmt::Display::fmt(err, f),
        }
    }
}

/// A descriptor that was not pasted.
#[derive(Debug, PartialEq)]
pub struct Skipped {
    /// Identifier of the originally copied element.
    pub id: Id,
    pub reason: SkipReason,
}

/// The outcome of a paste.
#[derive(Debug, Default, PartialEq)]
pub struct PasteReport {
    created: IndexMap<Id, Id>,
    skipped: Vec<Skipped>,
}

impl PasteReport {
    /// Pairs of `(copied id, created id)`, in creation order.
    pub fn created(&self) -> &IndexMap<Id, Id> {
        &self.created
    }

    /// The element created from the copied element `original`.
    pub fn created_id(&self, original: Id) -> Option<Id> {
        self.created.get(&original).copied()
    }

    /// Descriptors that were not pasted, in processing order.
    pub fn skipped(&self) -> &[Skipped] {
        &self.skipped
    }

    /// Returns true if nothing was created and nothing skipped.
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.skipped.is_empty()
    }
}

impl<R: Rules> CopyPaste<R> {
    /// Paste the clipboard content under `target`.
    ///
    /// The copied selection's center is moved to the target's center plus the
    /// configured paste offset. Depths are pasted shallowest first; within a
    /// depth, shapes come before attached shapes and labels, and those before
    /// connections. Labels whose target is pasted later in the same depth wait
    /// until the end of that depth.
    ///
    /// Descriptors that are denied by the rules, reference an element that
    /// was not pasted, or are rejected by `modeling` are skipped and listed
    /// in the returned report; the rest of the paste goes on. An empty
    /// clipboard yields an empty report.
    pub fn paste<M, F>(&self, target: PasteTarget, modeling: &mut M, factory: &F) -> PasteReport
    where
        M: Modeling,
        F: ElementFactory,
    {
        let Some(forest) = self.clipboard.borrow().get() else {
            debug!("Clipboard is empty, nothing to paste");
            return PasteReport::default();
        };

        let mut session = PasteSession {
            copy_paste: self,
            target: target.id(),
            anchor: target.center().add_point(self.config.paste().offset()),
            modeling,
            factory,
            report: PasteReport::default(),
        };
        info!(
            paste_target:% = session.target,
            anchor_x = session.anchor.x(),
            anchor_y = session.anchor.y();
            "Pasting clipboard"
        );

        for (depth, descriptors) in forest.depths() {
            let mut ordered: Vec<&Descriptor> = descriptors.iter().collect();
            ordered.sort_by_key(|descriptor| descriptor.priority);

            let mut deferred = Vec::new();
            for descriptor in ordered {
                if session.awaits_label_target(descriptor, descriptors) {
                    trace!(id:% = descriptor.id; "Deferring label until its target exists");
                    deferred.push(descriptor);
                    continue;
                }
                session.paste_one(descriptor, depth);
            }
            for descriptor in deferred {
                session.paste_one(descriptor, depth);
            }
        }

        let report = session.report;
        info!(
            created = report.created.len(),
            skipped = report.skipped.len();
            "Pasted clipboard"
        );
        report
    }
}

struct PasteSession<'s, R, M, F> {
    copy_paste: &'s CopyPaste<R>,
    target: Id,
    anchor: Point,
    modeling: &'s mut M,
    factory: &'s F,
    report: PasteReport,
}

impl<R, M, F> PasteSession<'_, R, M, F>
where
    R: Rules,
    M: Modeling,
    F: ElementFactory,
{
    /// Returns true if `descriptor` is a label whose target sits in the
    /// same bucket and has not been pasted yet.
    fn awaits_label_target(&self, descriptor: &Descriptor, bucket: &[Descriptor]) -> bool {
        descriptor.label_target.is_some_and(|label_target| {
            !self.report.created.contains_key(&label_target)
                && bucket.iter().any(|other| other.id == label_target)
        })
    }

    fn paste_one(&mut self, descriptor: &Descriptor, depth: usize) {
        match self.paste_descriptor(descriptor, depth) {
            Ok(Some(created)) => {
                trace!(id:% = descriptor.id, created:% = created, depth = depth; "Pasted element");
                self.report.created.insert(descriptor.id, created);
            }
            Ok(None) => {
                debug!(id:% = descriptor.id; "Paste denied by rules");
                self.report.skipped.push(Skipped {
                    id: descriptor.id,
                    reason: SkipReason::Denied,
                });
            }
            Err(err) => {
                warn!(id:% = descriptor.id, err:%; "Skipping copied element");
                self.report.skipped.push(Skipped {
                    id: descriptor.id,
                    reason: SkipReason::Failed(err),
                });
            }
        }
    }

    /// Paste one descriptor. Returns `None` if the rules deny it.
    fn paste_descriptor(
        &mut self,
        descriptor: &Descriptor,
        depth: usize,
    ) -> Result<Option<Id>, PasteError> {
        let parent = self.resolve_parent(descriptor, depth)?;
        if !self.copy_paste.can_paste(descriptor, parent) {
            return Ok(None);
        }

        let placement = Placement::of(descriptor, self.anchor)?;
        let request = self.resolve(descriptor, placement, parent)?;
        let created = request
            .submit(&mut *self.modeling)
            .map_err(|source| PasteError::Modeling {
                id: descriptor.id,
                source,
            })?;
        Ok(Some(created))
    }

    /// The paste target at depth 0 and for descriptors whose parent was not
    /// copied, otherwise the pasted parent.
    fn resolve_parent(&self, descriptor: &Descriptor, depth: usize) -> Result<Id, PasteError> {
        match descriptor.parent {
            Some(parent) if depth > 0 => self.link(descriptor, LinkRole::Parent, parent),
            _ => Ok(self.target),
        }
    }

    fn link(&self, descriptor: &Descriptor, role: LinkRole, reference: Id) -> Result<Id, PasteError> {
        self.report
            .created
            .get(&reference)
            .copied()
            .ok_or(PasteError::UnresolvedLink {
                id: descriptor.id,
                role,
                reference,
            })
    }

    fn endpoint(
        &self,
        descriptor: &Descriptor,
        role: LinkRole,
        reference: Option<Id>,
    ) -> Result<Id, PasteError> {
        let reference = reference.ok_or(PasteError::MissingEndpoint {
            id: descriptor.id,
            role,
        })?;
        self.link(descriptor, role, reference)
    }

    fn resolve(
        &self,
        descriptor: &Descriptor,
        placement: Placement,
        parent: Id,
    ) -> Result<Request, PasteError> {
        match placement {
            Placement::Connection { waypoints } => Ok(Request::Connection {
                source: self.endpoint(descriptor, LinkRole::Source, descriptor.source)?,
                target: self.endpoint(descriptor, LinkRole::Target, descriptor.target)?,
                connection: ConnectionTemplate {
                    waypoints,
                    properties: descriptor.properties.clone(),
                },
                parent,
            }),
            Placement::Shape { position } => {
                let template = self.factory.create_shape(descriptor);

                if let Some(label_target) = descriptor.label_target {
                    return Ok(Request::Label {
                        label: template,
                        position,
                        label_target: self.link(descriptor, LinkRole::LabelTarget, label_target)?,
                        parent,
                    });
                }

                match descriptor.host {
                    Some(host) => Ok(Request::Shape {
                        shape: template,
                        position,
                        parent: self.link(descriptor, LinkRole::Host, host)?,
                        is_host: true,
                    }),
                    None => Ok(Request::Shape {
                        shape: template,
                        position,
                        parent,
                        is_host: false,
                    }),
                }
            }
        }
    }
}

/// Absolute geometry of a descriptor at the paste location.
#[derive(Debug, Clone, PartialEq)]
enum Placement {
    /// Center of a shape or label.
    Shape { position: Point },
    Connection { waypoints: Vec<Waypoint> },
}

impl Placement {
    fn of(descriptor: &Descriptor, anchor: Point) -> Result<Self, PasteError> {
        match (&descriptor.waypoints, &descriptor.delta, descriptor.bounds) {
            (Some(waypoints), Some(Delta::Waypoints(deltas)), _)
                if waypoints.len() == deltas.len() =>
            {
                let waypoints = waypoints
                    .iter()
                    .zip(deltas)
                    .map(|(waypoint, delta)| {
                        let shift = anchor.add_point(*delta).sub_point(waypoint.point());
                        waypoint.translate(shift)
                    })
                    .collect();
                Ok(Self::Connection { waypoints })
            }
            (None, Some(Delta::Shape(delta)), Some(bounds)) => Ok(Self::Shape {
                position: anchor
                    .add_point(*delta)
                    .add_point(bounds.to_size().half_extent()),
            }),
            _ => Err(PasteError::MissingGeometry(descriptor.id)),
        }
    }
}

/// A fully resolved modeling call.
#[derive(Debug)]
enum Request {
    Shape {
        shape: ShapeTemplate,
        position: Point,
        parent: Id,
        is_host: bool,
    },
    Label {
        label: ShapeTemplate,
        position: Point,
        label_target: Id,
        parent: Id,
    },
    Connection {
        source: Id,
        target: Id,
        connection: ConnectionTemplate,
        parent: Id,
    },
}

impl Request {
    fn submit<M: Modeling>(self, modeling: &mut M) -> Result<Id, ModelError> {
        match self {
            Self::Shape {
                shape,
                position,
                parent,
                is_host,
            } => modeling.create_shape(shape, position, parent, is_host),
            Self::Label {
                label,
                position,
                label_target,
                parent,
            } => modeling.create_label(label, position, label_target, parent),
            Self::Connection {
                source,
                target,
                connection,
                parent,
            } => modeling.create_connection(source, target, connection, parent),
        }
    }
}

#[cfg(test)]
mod tests {
    use collage_core::geometry::{Bounds, Size};
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_placement_of_shape() {
        let mut descriptor = Descriptor::new(Id::new("shape"));
        descriptor.bounds = Some(Bounds::new_from_top_left(
            Point::new(110.0, 110.0),
            Size::new(100.0, 100.0),
        ));
        descriptor.delta = Some(Delta::Shape(Point::new(-195.0, -95.0)));

        let placement = Placement::of(&descriptor, Point::new(900.0, 350.0)).unwrap();

        let Placement::Shape { position } = placement else {
            panic!("expected a shape placement");
        };
        assert_approx_eq!(f32, position.x(), 755.0);
        assert_approx_eq!(f32, position.y(), 305.0);
    }

    #[test]
    fn test_placement_of_connection_moves_original() {
        let mut descriptor = Descriptor::new(Id::new("connection"));
        descriptor.waypoints = Some(vec![
            Waypoint::new(Point::new(160.0, 160.0)).with_original(Point::new(150.0, 150.0)),
        ]);
        descriptor.delta = Some(Delta::Waypoints(vec![Point::new(-145.0, -45.0)]));

        let placement = Placement::of(&descriptor, Point::new(900.0, 350.0)).unwrap();

        assert_eq!(
            placement,
            Placement::Connection {
                waypoints: vec![
                    Waypoint::new(Point::new(755.0, 305.0))
                        .with_original(Point::new(745.0, 295.0))
                ],
            }
        );
    }

    #[test]
    fn test_placement_without_delta() {
        let mut descriptor = Descriptor::new(Id::new("shape"));
        descriptor.bounds = Some(Bounds::new_from_top_left(
            Point::new(0.0, 0.0),
            Size::new(10.0, 10.0),
        ));

        assert_eq!(
            Placement::of(&descriptor, Point::default()),
            Err(PasteError::MissingGeometry(Id::new("shape")))
        );
    }

    #[test]
    fn test_placement_with_mismatched_waypoints() {
        let mut descriptor = Descriptor::new(Id::new("connection"));
        descriptor.waypoints = Some(vec![Waypoint::new(Point::default())]);
        descriptor.delta = Some(Delta::Waypoints(Vec::new()));

        assert!(Placement::of(&descriptor, Point::default()).is_err());
    }

    #[test]
    fn test_skip_reason_display_names_elements() {
        let reason = SkipReason::Failed(PasteError::UnresolvedLink {
            id: Id::new("timer"),
            role: LinkRole::Host,
            reference: Id::new("task"),
        });

        assert_eq!(
            reason.to_string(),
            "`timer` references host `task` which was not pasted"
        );
        assert_eq!(SkipReason::Denied.to_string(), "denied by paste rules");
    }

    #[test]
    fn test_target_from_element_without_geometry() {
        let mut diagram = collage_core::model::Diagram::new();
        let root = diagram.add_root(Id::new("root"), None).unwrap();

        let target = PasteTarget::from(diagram.element(root).unwrap());
        assert_eq!(target.id(), root);
        assert!(target.center().is_zero());
    }
}
