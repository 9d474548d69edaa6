//! Diagram element model.
//!
//! The element model is what the copy/paste engine reads from when building a
//! snapshot and writes into when pasting one.
//!
//! # Organization
//!
//! - [`element`] - A single element: [`Element`], [`ElementKind`], [`Waypoint`]
//! - [`diagram`] - The element arena: [`Diagram`]

pub mod diagram;
pub mod element;

pub use diagram::*;
pub use element::*;
