//! Deck builder that writes `.pptx` files into an output directory.

use crate::writer::PptxWriter;
use chatppt_core::{Deck, DeckBuilder, Result, DECK_EXTENSION};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Characters that are not allowed in file names on common platforms.
const FORBIDDEN_FILENAME_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Longest file stem in bytes; common file systems cap names at 255.
const MAX_STEM_BYTES: usize = 120;

/// Builds a `.pptx` deck from an outline file.
///
/// The deck is written to `<output_dir>/<title>.pptx`, replacing an earlier
/// deck with the same title.
#[derive(Debug, Clone)]
pub struct PptxDeckBuilder {
    output_dir: PathBuf,
}

impl PptxDeckBuilder {
    /// Create a builder writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Write an already parsed deck and return the path of the new file.
    ///
    /// Relative image paths are looked up in `image_base` first, then in the
    /// current directory.
    pub fn write_deck(&self, deck: &Deck, image_base: Option<&Path>) -> Result<PathBuf> {
        let path = self.output_dir.join(deck_file_name(&deck.title));

        let mut writer = PptxWriter::new();
        if let Some(base) = image_base {
            writer = writer.with_image_base(base);
        }

        let file = File::create(&path)?;
        let mut out = writer.write(deck, BufWriter::new(file))?;
        out.flush()?;

        log::info!(
            "Wrote {} ({} slides)",
            path.display(),
            deck.slide_count()
        );
        Ok(path)
    }
}

impl DeckBuilder for PptxDeckBuilder {
    fn build(&self, outline_path: &Path) -> Result<()> {
        let outline = std::fs::read_to_string(outline_path)?;
        let deck = Deck::from_outline(&outline);
        log::debug!(
            "Parsed outline {}: {:?}, {} slides",
            outline_path.display(),
            deck.title,
            deck.slides.len()
        );

        self.write_deck(&deck, outline_path.parent())?;
        Ok(())
    }
}

/// File name for a deck with the given title.
///
/// Characters that are invalid in file names become `_`, long titles are cut
/// to [`MAX_STEM_BYTES`] on a char boundary, and an empty result falls back to
/// `presentation`.
pub fn deck_file_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| {
            if c.is_control() || FORBIDDEN_FILENAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    let stem = truncate_to_bytes(cleaned.trim(), MAX_STEM_BYTES);
    let stem = stem.trim_end().trim_end_matches('.').trim_end();
    let stem = if stem.is_empty() { "presentation" } else { stem };

    format!("{}.{}", stem, DECK_EXTENSION)
}

fn truncate_to_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
