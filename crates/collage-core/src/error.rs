//! Error types for the diagram model.

use thiserror::Error;

use crate::identifier::Id;

/// Errors raised when inserting into or linking elements of a [`Diagram`](crate::model::Diagram).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("element `{0}` does not exist")]
    MissingElement(Id),

    #[error("element `{0}` already exists")]
    DuplicateId(Id),

    #[error("element `{0}` is not a shape")]
    NotAShape(Id),
}
