//! The "generate" and "clear" chat actions.
//!
//! A generation formats the chat text, hands it to a [`DeckBuilder`] through a
//! temporary outline file, then reports the newest deck in the output
//! directory. Every failure is turned into an assistant message; nothing
//! escapes to the caller.

use crate::builder::DeckBuilder;
use crate::error::Result;
use crate::outline::OutlineFormatter;
use crate::settings::{Settings, DECK_EXTENSION, OUTLINE_EXTENSION};
use crate::types::{ConversationState, Turn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Start of the assistant message for a successful generation; the deck
/// path follows after `": "`.
pub const DECK_GENERATED: &str = "Deck generated";

/// Assistant message when the builder ran but no deck was found.
pub const GENERATION_FAILED: &str = "Deck generation failed";

/// Turns chat input into a deck.
pub struct Generator<B> {
    settings: Settings,
    formatter: OutlineFormatter,
    builder: B,
}

impl<B: DeckBuilder> Generator<B> {
    /// Create a generator for the given settings and builder.
    pub fn new(settings: Settings, builder: B) -> Self {
        let formatter = OutlineFormatter::new().with_style(settings.style);
        Self {
            settings,
            formatter,
            builder,
        }
    }

    /// Run one generation.
    ///
    /// Returns a two-turn history (the user's text, then the assistant's
    /// status message) and `state` exactly as it was passed in.
    pub fn generate(&self, text: &str, state: ConversationState) -> (Vec<Turn>, ConversationState) {
        let reply = match self.try_generate(text) {
            Ok(Some(path)) => {
                log::info!("{}: {}", DECK_GENERATED, path.display());
                format!("{}: {}", DECK_GENERATED, path.display())
            }
            Ok(None) => {
                log::warn!(
                    "Builder finished but no .{} file found in {}",
                    DECK_EXTENSION,
                    self.settings.output_dir.display()
                );
                GENERATION_FAILED.to_string()
            }
            Err(e) => {
                log::error!("Error while generating deck: {}", e);
                format!("An error occurred: {}", e)
            }
        };

        (vec![Turn::user(text), Turn::assistant(reply)], state)
    }

    fn try_generate(&self, text: &str) -> Result<Option<PathBuf>> {
        let outline = self.formatter.format(text);
        log::debug!("Formatted outline:\n{}", outline);

        // Removed on drop, so an early return does not leave it behind.
        let mut file = tempfile::Builder::new()
            .prefix("chatppt-")
            .suffix(&format!(".{}", OUTLINE_EXTENSION))
            .tempfile()?;
        file.write_all(outline.as_bytes())?;
        file.flush()?;
        file.as_file().sync_all()?;

        self.builder.build(file.path())?;
        file.close()?;

        latest_deck(&self.settings.output_dir)
    }
}

/// The "clear" action: an empty history and an empty input box.
pub fn clear() -> (Vec<Turn>, String) {
    (Vec::new(), String::new())
}

/// Find the newest deck file in `dir`.
///
/// Files are matched on the deck extension, ignoring case. The newest by
/// modification time wins; equal times fall back to the larger file name.
pub fn latest_deck(dir: &Path) -> Result<Option<PathBuf>> {
    let mut newest: Option<(SystemTime, String, PathBuf)> = None;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        let is_deck = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(DECK_EXTENSION));
        if !is_deck {
            continue;
        }

        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }

        let modified = metadata.modified()?;
        let name = entry.file_name().to_string_lossy().into_owned();

        let is_newer = match &newest {
            Some((time, best, _)) => (modified, &name) > (*time, best),
            None => true,
        };
        if is_newer {
            newest = Some((modified, name, path));
        }
    }

    Ok(newest.map(|(_, _, path)| path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::outline::OutlineStyle;
    use serde_json::json;
    use std::cell::RefCell;
    use std::fs::{self, File};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Copies the outline into the output directory as a deck file and
    /// remembers what it saw.
    struct RecordingBuilder {
        output_dir: PathBuf,
        deck_name: &'static str,
        seen: RefCell<Vec<(PathBuf, String)>>,
    }

    impl RecordingBuilder {
        fn new(output_dir: &Path, deck_name: &'static str) -> Self {
            Self {
                output_dir: output_dir.to_path_buf(),
                deck_name,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl DeckBuilder for RecordingBuilder {
        fn build(&self, outline_path: &Path) -> Result<()> {
            let outline = fs::read_to_string(outline_path)?;
            fs::write(self.output_dir.join(self.deck_name), &outline)?;
            self.seen
                .borrow_mut()
                .push((outline_path.to_path_buf(), outline));
            Ok(())
        }
    }

    struct NoOutputBuilder;

    impl DeckBuilder for NoOutputBuilder {
        fn build(&self, _outline_path: &Path) -> Result<()> {
            Ok(())
        }
    }

    /// Fails after remembering the outline path it was given.
    #[derive(Default)]
    struct FailingBuilder {
        outline_path: RefCell<Option<PathBuf>>,
    }

    impl DeckBuilder for FailingBuilder {
        fn build(&self, outline_path: &Path) -> Result<()> {
            assert!(outline_path.exists());
            *self.outline_path.borrow_mut() = Some(outline_path.to_path_buf());
            Err(Error::BuilderError("template missing".to_string()))
        }
    }

    fn settings(dir: &TempDir) -> Settings {
        Settings::new(dir.path())
    }

    #[test]
    fn test_generate_reports_deck_path() {
        let tmp = TempDir::new().unwrap();
        let builder = RecordingBuilder::new(tmp.path(), "AI Basics.pptx");
        let generator = Generator::new(settings(&tmp), builder);
        let text = "AI Basics\n\nWhat is AI\n- branch of CS\n- mimics intelligence";

        let (history, _) = generator.generate(text, ConversationState::new());

        let expected = tmp.path().join("AI Basics.pptx");
        assert_eq!(
            history,
            vec![
                Turn::user(text),
                Turn::assistant(format!("Deck generated: {}", expected.display())),
            ]
        );
    }

    #[test]
    fn test_builder_receives_formatted_outline_and_file_is_removed() {
        let tmp = TempDir::new().unwrap();
        let builder = RecordingBuilder::new(tmp.path(), "deck.pptx");
        let generator = Generator::new(settings(&tmp), builder);

        generator.generate("AI Basics\n\nWhat is AI\n- branch of CS", ConversationState::new());

        let seen = generator.builder.seen.borrow();
        let (outline_path, outline) = &seen[0];
        assert_eq!(outline, "# AI Basics\n## What is AI\n- branch of CS");
        assert_eq!(
            outline_path.extension().and_then(|e| e.to_str()),
            Some(OUTLINE_EXTENSION)
        );
        assert!(!outline_path.exists());
    }

    #[test]
    fn test_configured_style_is_used() {
        let tmp = TempDir::new().unwrap();
        let builder = RecordingBuilder::new(tmp.path(), "deck.pptx");
        let generator = Generator::new(settings(&tmp).with_style(OutlineStyle::Literal), builder);

        generator.generate("Topic", ConversationState::new());

        let seen = generator.builder.seen.borrow();
        assert_eq!(seen[0].1, "# Presentation\n## Topic");
    }

    #[test]
    fn test_no_deck_found() {
        let tmp = TempDir::new().unwrap();
        File::create(tmp.path().join("notes.txt")).unwrap();
        let generator = Generator::new(settings(&tmp), NoOutputBuilder);

        let (history, _) = generator.generate("Some text", ConversationState::new());

        assert_eq!(history.len(), 2);
        assert_eq!(history[0], Turn::user("Some text"));
        assert_eq!(history[1], Turn::assistant(GENERATION_FAILED));
    }

    #[test]
    fn test_builder_error_is_reported_and_state_untouched() {
        let tmp = TempDir::new().unwrap();
        let generator = Generator::new(settings(&tmp), FailingBuilder::default());
        let state = ConversationState::from_value(json!({"turns": 3}));

        let (history, returned) = generator.generate("Some text", state.clone());

        assert_eq!(returned, state);
        assert_eq!(history[0], Turn::user("Some text"));
        assert!(history[1].text.starts_with("An error occurred: "));
        assert!(history[1].text.contains("template missing"));
    }

    #[test]
    fn test_outline_file_is_removed_when_builder_fails() {
        let tmp = TempDir::new().unwrap();
        let generator = Generator::new(settings(&tmp), FailingBuilder::default());

        generator.generate("Some text", ConversationState::new());

        let outline_path = generator.builder.outline_path.borrow().clone().unwrap();
        assert!(!outline_path.exists());
    }

    #[test]
    fn test_missing_output_dir_is_an_error_message() {
        let tmp = TempDir::new().unwrap();
        let generator = Generator::new(Settings::new(tmp.path().join("absent")), NoOutputBuilder);

        let (history, _) = generator.generate("x", ConversationState::new());

        assert!(history[1].text.starts_with("An error occurred: "));
    }

    #[test]
    fn test_latest_deck_prefers_newest() {
        let tmp = TempDir::new().unwrap();
        let older = File::create(tmp.path().join("z-old.pptx")).unwrap();
        let newer = File::create(tmp.path().join("a-new.PPTX")).unwrap();
        File::create(tmp.path().join("outline.md")).unwrap();
        fs::create_dir(tmp.path().join("folder.pptx")).unwrap();

        let now = SystemTime::now();
        older.set_modified(now - Duration::from_secs(60)).unwrap();
        newer.set_modified(now).unwrap();

        assert_eq!(
            latest_deck(tmp.path()).unwrap(),
            Some(tmp.path().join("a-new.PPTX"))
        );
    }

    #[test]
    fn test_latest_deck_ties_break_on_name() {
        let tmp = TempDir::new().unwrap();
        let when = SystemTime::now() - Duration::from_secs(10);
        for name in ["b.pptx", "c.pptx", "a.pptx"] {
            File::create(tmp.path().join(name))
                .unwrap()
                .set_modified(when)
                .unwrap();
        }

        assert_eq!(latest_deck(tmp.path()).unwrap(), Some(tmp.path().join("c.pptx")));
    }

    #[test]
    fn test_latest_deck_empty_dir() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(latest_deck(tmp.path()).unwrap(), None);
    }

    #[test]
    fn test_clear() {
        let (history, input) = clear();
        assert!(history.is_empty());
        assert!(input.is_empty());
    }
}
