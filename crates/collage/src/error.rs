//! Error types for Collage operations.
//!
//! [`CollageError`] is the umbrella error surfaced to callers. Only
//! configuration mistakes escape `copy`/`paste` as errors; problems found
//! while pasting individual descriptors are reported as [`PasteError`]s inside
//! the [`PasteReport`](crate::PasteReport) instead.

use std::{fmt, io};

use thiserror::Error;

use collage_core::{error::ModelError, identifier::Id};

/// The main error type for Collage operations.
#[derive(Debug, Error)]
pub enum CollageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    #[error("Scene error: {0}")]
    Scene(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors raised while registering descriptor transforms.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("descriptor transform is already registered")]
    Duplicate,
}

/// The role a reference plays in a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRole {
    Parent,
    Host,
    Source,
    Target,
    LabelTarget,
}

impl fmt::Display for LinkRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parent => "parent",
            Self::Host => "host",
            Self::Source => "source",
            Self::Target => "target",
            Self::LabelTarget => "label target",
        };
        f.write_str(name)
    }
}

/// Why a single descriptor could not be pasted.
#[derive(Debug, Error, PartialEq)]
pub enum PasteError {
    #[error("`{id}` references {role} `{reference}` which was not pasted")]
    UnresolvedLink {
        id: Id,
        role: LinkRole,
        reference: Id,
    },

    #[error("`{0}` carries no geometry to place")]
    MissingGeometry(Id),

    #[error("`{id}` has no {role}")]
    MissingEndpoint { id: Id, role: LinkRole },

    #[error("modeling rejected `{id}`: {source}")]
    Modeling {
        id: Id,
        #[source]
        source: ModelError,
    },
}
