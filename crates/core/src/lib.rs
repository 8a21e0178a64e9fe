//! Core types for ChatPPT: outline formatting, the deck model, and the
//! generation flow that turns chat input into a slide deck.

pub mod builder;
pub mod deck;
pub mod error;
pub mod generate;
pub mod outline;
pub mod settings;
pub mod types;

pub use builder::{CommandDeckBuilder, DeckBuilder};
pub use deck::{Bullet, Deck, ImageRef, Slide};
pub use error::{Error, Result};
pub use generate::{clear, latest_deck, Generator, DECK_GENERATED, GENERATION_FAILED};
pub use outline::{OutlineFormatter, OutlineStyle, DEFAULT_TITLE};
pub use settings::{Settings, DECK_EXTENSION, OUTLINE_EXTENSION};
pub use types::{ConversationState, Role, Turn};
