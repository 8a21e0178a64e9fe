//! PPTX (Office Open XML) deck builder for ChatPPT.
//!
//! Writes a deck as a ZIP archive of XML parts: one title slide followed by a
//! title-and-content slide per outline section.

pub mod builder;
mod parts;
pub mod writer;

pub use builder::{deck_file_name, PptxDeckBuilder};
pub use writer::PptxWriter;
