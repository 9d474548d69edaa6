//! Configuration types for Collage copy and paste.
//!
//! All types implement [`serde::Deserialize`] so they can be loaded from
//! external sources; every field falls back to its default when omitted.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining copy and paste settings.
//! - [`CopyConfig`] - Controls which structural dependents are pulled into a copy.
//! - [`PasteConfig`] - Controls where pasted elements land.
//!
//! # Example
//!
//! ```
//! # use collage::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.copy().connections());
//! assert!(config.paste().offset().is_zero());
//! ```

use serde::Deserialize;

use collage_core::geometry::Point;

/// Top-level configuration combining copy and paste settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Copy configuration section.
    #[serde(default)]
    copy: CopyConfig,

    /// Paste configuration section.
    #[serde(default)]
    paste: PasteConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified copy and paste configurations.
    pub fn new(copy: CopyConfig, paste: PasteConfig) -> Self {
        Self { copy, paste }
    }

    /// Returns the copy configuration.
    pub fn copy(&self) -> &CopyConfig {
        &self.copy
    }

    /// Returns the paste configuration.
    pub fn paste(&self) -> &PasteConfig {
        &self.paste
    }
}

/// Which structural dependents of a copied element are copied along with it.
///
/// Dependents are still subject to the copy rules and to the relational
/// completeness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CopyConfig {
    /// Include shapes attached to a copied shape.
    attachers: bool,

    /// Include labels describing a copied element.
    labels: bool,

    /// Include incoming and outgoing connections of a copied element.
    connections: bool,
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            attachers: true,
            labels: true,
            connections: true,
        }
    }
}

impl CopyConfig {
    /// Creates a new [`CopyConfig`].
    ///
    /// # Arguments
    ///
    /// * `attachers` - Whether attached shapes follow their host.
    /// * `labels` - Whether labels follow the element they describe.
    /// * `connections` - Whether connections follow their endpoints.
    pub fn new(attachers: bool, labels: bool, connections: bool) -> Self {
        Self {
            attachers,
            labels,
            connections,
        }
    }

    /// Returns true if attached shapes are copied with their host.
    pub fn attachers(&self) -> bool {
        self.attachers
    }

    /// Returns true if labels are copied with their target.
    pub fn labels(&self) -> bool {
        self.labels
    }

    /// Returns true if connections are copied with their endpoints.
    pub fn connections(&self) -> bool {
        self.connections
    }
}

/// Paste placement settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PasteConfig {
    /// Offset added to the target's center before placing elements.
    offset: Point,
}

impl PasteConfig {
    /// Creates a new [`PasteConfig`] with the given anchor offset.
    pub fn new(offset: Point) -> Self {
        Self { offset }
    }

    /// Returns the anchor offset.
    pub fn offset(&self) -> Point {
        self.offset
    }
}
