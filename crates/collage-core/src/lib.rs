//! Collage Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Collage diagram
//! copy/paste engine. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Geometry**: Points, sizes and bounding boxes ([`geometry`] module)
//! - **Model**: Diagram elements and the in-memory element arena ([`model`] module)
//! - **Errors**: Model errors ([`error::ModelError`])

pub mod error;
pub mod geometry;
pub mod identifier;
pub mod model;
