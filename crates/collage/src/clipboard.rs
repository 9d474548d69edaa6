//! Session clipboard holding the last copied forest.

use std::{cell::RefCell, rc::Rc};

use log::debug;

use crate::forest::Forest;

/// A clipboard shared between everything in one editor session.
pub type SharedClipboard = Rc<RefCell<Clipboard>>;

/// Holds at most one copied [`Forest`]. The last `set` wins.
#[derive(Debug, Default)]
pub struct Clipboard {
    forest: Option<Forest>,
}

impl Clipboard {
    /// Create an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty clipboard ready to be shared.
    pub fn shared() -> SharedClipboard {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Discard the stored forest.
    pub fn clear(&mut self) {
        debug!("Clearing clipboard");
        self.forest = None;
    }

    /// Replace the stored forest.
    pub fn set(&mut self, forest: Forest) {
        debug!(descriptors = forest.len(); "Storing forest on clipboard");
        self.forest = Some(forest);
    }

    /// A snapshot of the stored forest.
    ///
    /// The snapshot is unaffected by later `clear`/`set` calls.
    pub fn get(&self) -> Option<Forest> {
        self.forest.clone()
    }

    /// Returns true if no forest is stored.
    pub fn is_empty(&self) -> bool {
        self.forest.is_none()
    }
}
