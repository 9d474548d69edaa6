//! Error adapter for converting CollageError to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use collage::{CollageError, identifier::Id};
use collage_core::error::ModelError;

/// Adapter rendering a [`CollageError`] through miette.
///
/// Every variant gets a stable diagnostic code (`collage::io`,
/// `collage::model`, ...) and, where one applies, a hint on how to fix the
/// input.
pub struct ErrorAdapter<'a>(pub &'a CollageError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            CollageError::Io(_) => "collage::io",
            CollageError::Model(_) => "collage::model",
            CollageError::Descriptor(_) => "collage::descriptor",
            CollageError::Scene(_) => "collage::scene",
            CollageError::Config(_) => "collage::config",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            CollageError::Model(ModelError::MissingElement(id)) => missing_element_help(*id),
            CollageError::Model(ModelError::DuplicateId(_)) => {
                "element ids must be unique across the whole scene".to_string()
            }
            CollageError::Model(ModelError::NotAShape(_)) => {
                "only shapes can host or be attached to other shapes".to_string()
            }
            CollageError::Config(_) => {
                "check the [copy] and [paste] sections of the configuration file".to_string()
            }
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        None
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

fn missing_element_help(id: Id) -> String {
    format!("declare `{id}` in the scene, or fix the reference to it")
}
