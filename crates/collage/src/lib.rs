//! Collage - dependency-aware copy and paste for diagram editors.
//!
//! Copying a selection snapshots the selected elements together with the
//! structure they need: nested children, attached shapes, labels and the
//! connections between copied elements. Pasting replays that snapshot under a
//! new parent, keeping relative geometry and every structural link.
//!
//! # Organization
//!
//! - [`topology`] - Top-level detection and depth-first traversal of selections
//! - [`descriptor`] - Reference-free element snapshots and the transform registry
//! - [`forest`] - Depth-indexed descriptor storage
//! - [`clipboard`] - The session clipboard
//! - [`collaborators`] - Rules, element factory and modeling contracts
//! - [`config`] - Copy and paste settings
//!
//! The orchestrator, [`CopyPaste`], ties these together.

pub mod clipboard;
pub mod collaborators;
pub mod config;
pub mod descriptor;
pub mod forest;
pub mod topology;

mod copy_paste;
mod error;

pub use collage_core::{geometry, identifier, model};

pub use clipboard::{Clipboard, SharedClipboard};
pub use collaborators::{
    Action, AllowAll, ConnectionTemplate, DefaultElementFactory, ElementFactory, Modeling,
    RuleContext, Rules, ShapeTemplate,
};
pub use copy_paste::{CopyPaste, CopySummary, PasteReport, PasteTarget, SkipReason, Skipped, Tree};
pub use error::{CollageError, DescriptorError, LinkRole, PasteError};
