//! The copy/paste orchestrator.
//!
//! [`CopyPaste`] turns a selection into a [`Forest`](crate::forest::Forest) of descriptors stored on
//! the session clipboard, and replays that forest as new elements under a
//! paste target.

mod paste;
mod tree;

pub use paste::{PasteReport, PasteTarget, SkipReason, Skipped};
pub use tree::Tree;

use log::{debug, info};

use collage_core::{
    geometry::Point,
    identifier::Id,
    model::{Diagram, Element, bounding_box},
};

use crate::{
    clipboard::SharedClipboard,
    collaborators::{Action, AllowAll, RuleContext, Rules},
    config::AppConfig,
    descriptor::{Delta, Descriptor, DescriptorFn, DescriptorRegistry},
    error::DescriptorError,
};

/// Outcome of a successful [`CopyPaste::copy`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CopySummary {
    /// Number of descriptors stored on the clipboard.
    pub descriptors: usize,
    /// Number of depth buckets, empty ones included.
    pub depths: usize,
    /// Center of the copied elements' bounding box.
    pub anchor: Point,
}

/// Copies selections to the clipboard and pastes them back into a diagram.
///
/// # Examples
///
/// ```
/// # use collage::{Clipboard, CopyPaste, DefaultElementFactory, PasteTarget};
/// # use collage_core::{geometry::{Bounds, Point, Size}, identifier::Id, model::Diagram};
/// let mut diagram = Diagram::new();
/// let root = diagram.add_root(Id::new("root"), None).unwrap();
/// let bounds = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 100.0));
/// diagram.add_shape(Id::new("task"), bounds, Some(root)).unwrap();
///
/// let copy_paste = CopyPaste::with_clipboard(Clipboard::shared());
/// let selection = diagram.select([Id::new("task")]).unwrap();
/// copy_paste.copy(&diagram, &selection).unwrap();
///
/// let target = PasteTarget::new(root, Point::new(500.0, 500.0));
/// let report = copy_paste.paste(target, &mut diagram, &DefaultElementFactory);
/// assert_eq!(report.created().len(), 1);
/// ```
#[derive(Debug)]
pub struct CopyPaste<R = AllowAll> {
    config: AppConfig,
    rules: R,
    descriptors: DescriptorRegistry,
    clipboard: SharedClipboard,
}

impl CopyPaste<AllowAll> {
    /// Create an orchestrator that allows everything and uses the default
    /// configuration.
    pub fn with_clipboard(clipboard: SharedClipboard) -> Self {
        Self::new(clipboard, AllowAll, AppConfig::default())
    }
}

impl<R: Rules> CopyPaste<R> {
    /// Create an orchestrator.
    ///
    /// # Arguments
    ///
    /// * `clipboard` - The session clipboard copies are stored on
    /// * `rules` - Permission checks for copying and pasting
    /// * `config` - Copy and paste settings
    pub fn new(clipboard: SharedClipboard, rules: R, config: AppConfig) -> Self {
        Self {
            config,
            rules,
            descriptors: DescriptorRegistry::new(),
            clipboard,
        }
    }

    /// Append a descriptor transform.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptorError::Duplicate`] if `transform` is already registered.
    pub fn register_descriptor(&mut self, transform: DescriptorFn) -> Result<(), DescriptorError> {
        self.descriptors.register(transform)
    }

    /// The active configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The session clipboard.
    pub fn clipboard(&self) -> &SharedClipboard {
        &self.clipboard
    }

    /// Copy `selection` to the clipboard.
    ///
    /// The clipboard is cleared first. Returns `None` without touching the
    /// clipboard if the selection is empty, and `None` with the clipboard
    /// left cleared if no element survived the copy rules and the relational
    /// checks.
    pub fn copy(&self, diagram: &Diagram, selection: &[&Element]) -> Option<CopySummary> {
        if selection.is_empty() {
            debug!("Empty selection, nothing to copy");
            return None;
        }

        self.clipboard.borrow_mut().clear();

        let Tree {
            mut forest,
            all_shapes,
        } = self.create_tree(diagram, selection);

        if forest.is_empty() {
            debug!(selected = selection.len(); "No element survived the copy");
            return None;
        }

        let anchor = bounding_box(all_shapes.iter().copied())
            .map(|bounds| bounds.center())
            .unwrap_or_default();
        for descriptor in forest.descriptors_mut() {
            descriptor.delta = compute_delta(descriptor, anchor);
        }

        let summary = CopySummary {
            descriptors: forest.len(),
            depths: forest.depth_count(),
            anchor,
        };
        self.clipboard.borrow_mut().set(forest);

        info!(
            descriptors = summary.descriptors,
            depths = summary.depths,
            anchor_x = anchor.x(),
            anchor_y = anchor.y();
            "Copied selection"
        );
        Some(summary)
    }

    fn can_copy(&self, element: &Element) -> bool {
        self.rules
            .allowed(Action::ElementCopy, &RuleContext::Copy { element })
    }

    fn can_paste(&self, descriptor: &Descriptor, target: Id) -> bool {
        self.rules.allowed(
            Action::ElementPaste,
            &RuleContext::Paste { descriptor, target },
        )
    }
}

/// Offset of a descriptor's geometry from `anchor`.
///
/// Shapes and labels are measured from their top-left corner; connections
/// get one offset per waypoint.
fn compute_delta(descriptor: &Descriptor, anchor: Point) -> Option<Delta> {
    if let Some(waypoints) = &descriptor.waypoints {
        let deltas = waypoints
            .iter()
            .map(|waypoint| waypoint.point().delta(anchor))
            .collect();
        return Some(Delta::Waypoints(deltas));
    }

    descriptor
        .bounds
        .map(|bounds| Delta::Shape(bounds.min_point().delta(anchor)))
}
