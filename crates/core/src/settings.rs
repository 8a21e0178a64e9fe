//! Runtime settings shared by the CLI and the web server.

use crate::error::Result;
use crate::outline::OutlineStyle;
use std::path::{Path, PathBuf};

/// Extension of the deck files the generator looks for.
pub const DECK_EXTENSION: &str = "pptx";

/// Extension given to the temporary outline file.
pub const OUTLINE_EXTENSION: &str = "md";

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";

/// Where decks are written and how input is formatted.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory the deck builder writes into and the generator scans.
    pub output_dir: PathBuf,

    /// Outline style used when formatting chat input.
    pub style: OutlineStyle,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            style: OutlineStyle::default(),
        }
    }
}

impl Settings {
    /// Settings writing into the given directory.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Set the outline style.
    pub fn with_style(mut self, style: OutlineStyle) -> Self {
        self.style = style;
        self
    }

    /// The output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the output directory if it does not exist yet.
    ///
    /// Call once at startup, before the first generation.
    pub fn ensure_output_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        log::debug!("Output directory ready: {}", self.output_dir.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.output_dir(), Path::new("outputs"));
        assert_eq!(settings.style, OutlineStyle::Structured);
    }

    #[test]
    fn test_ensure_output_dir_creates_nested() {
        let tmp = tempfile::TempDir::new().unwrap();
        let settings = Settings::new(tmp.path().join("a").join("outputs"))
            .with_style(OutlineStyle::Literal);

        settings.ensure_output_dir().unwrap();
        assert!(settings.output_dir().is_dir());

        // Second call is a no-op.
        settings.ensure_output_dir().unwrap();
    }
}
