//! Collage CLI library
//!
//! This module contains the core CLI logic for the Collage copy/paste tool:
//! load a scene, copy a selection, paste it under a target and write the
//! resulting scene.

pub mod error_adapter;
pub mod scene;

mod args;
mod config;

pub use args::Args;
pub use error_adapter::ErrorAdapter;

use std::fs;

use log::{info, warn};

use collage::{
    AllowAll, Clipboard, CollageError, CopyPaste, DefaultElementFactory, PasteTarget,
    descriptor::copy_properties, identifier::Id,
};

/// Run the Collage CLI application
///
/// Loads the input scene, copies the selected elements, pastes them under
/// the target element and writes the resulting scene to the output file.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `CollageError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Malformed scenes
/// - Unknown selected or target elements
pub fn run(args: &Args) -> Result<(), CollageError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing scene"
    );

    let app_config = config::load_config(args.config.as_ref())?;

    let source = fs::read_to_string(&args.input)?;
    let mut diagram = scene::parse(&source)?;

    let mut copy_paste = CopyPaste::new(Clipboard::shared(), AllowAll, app_config);
    copy_paste.register_descriptor(copy_properties)?;

    let selection = diagram.select(args.select.iter().map(|id| Id::new(id)))?;
    let target = PasteTarget::from(diagram.get(Id::new(&args.target))?);

    match copy_paste.copy(&diagram, &selection) {
        Some(summary) => {
            info!(descriptors = summary.descriptors; "Selection copied");

            let report = copy_paste.paste(target, &mut diagram, &DefaultElementFactory);
            for skipped in report.skipped() {
                warn!(id:% = skipped.id, reason:% = skipped.reason; "Element not pasted");
            }
            info!(created = report.created().len(); "Selection pasted");
        }
        None => warn!("Nothing to paste, writing scene unchanged"),
    }

    fs::write(&args.output, scene::render(&diagram)?)?;

    info!(output_file = args.output; "Scene written");

    Ok(())
}
