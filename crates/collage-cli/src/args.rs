//! Command-line argument definitions for the Collage CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments name the scene to load, the elements to copy,
//! the paste target, the output path, configuration file selection, and
//! logging verbosity.

use clap::Parser;

/// Command-line arguments for the Collage copy/paste tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input scene file
    #[arg(help = "Path to the input scene (TOML)")]
    pub input: String,

    /// Identifiers of the elements to copy, comma separated
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub select: Vec<String>,

    /// Identifier of the element to paste under
    #[arg(short, long)]
    pub target: String,

    /// Path to the output scene file
    #[arg(short, long, default_value = "out.toml")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selection_list() {
        let args = Args::try_parse_from([
            "collage",
            "scene.toml",
            "--select",
            "host,childShape",
            "--target",
            "parent",
        ])
        .unwrap();

        assert_eq!(args.select, vec!["host", "childShape"]);
        assert_eq!(args.target, "parent");
        assert_eq!(args.output, "out.toml");
        assert_eq!(args.log_level, "info");
        assert!(args.config.is_none());
    }

    #[test]
    fn test_selection_is_required() {
        assert!(Args::try_parse_from(["collage", "scene.toml", "--target", "parent"]).is_err());
    }
}
