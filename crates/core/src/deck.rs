//! Deck model read from outline text.
//!
//! Understands only the outline dialect the formatter produces: `#` headings,
//! `-` bullets (indented two spaces per level), and `![alt](path)` images.

use crate::outline::DEFAULT_TITLE;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Regex for heading lines: the `#` run, then whitespace and the heading text.
/// `#tag` is not a heading.
static HEADING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#+)(?:\s+(.*))?$").unwrap());

/// Regex for image lines, with an optional quoted caption after the path.
static IMAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^!\[(?P<alt>[^\]]*)\]\((?P<path>[^)\s]+)(?:\s+"[^"]*")?\)$"#).unwrap()
});

/// Deepest bullet level that is kept; deeper items are clamped.
pub const MAX_BULLET_LEVEL: u8 = 4;

/// A whole presentation built from an outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    /// Deck title, shown on the title slide.
    pub title: String,

    /// Content slides in outline order.
    pub slides: Vec<Slide>,
}

/// A single content slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    /// Slide heading.
    pub title: String,

    /// Bullet points in order.
    pub bullets: Vec<Bullet>,

    /// Images referenced on this slide.
    pub images: Vec<ImageRef>,
}

impl Slide {
    /// Create an empty slide with the given heading.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            bullets: Vec::new(),
            images: Vec::new(),
        }
    }

    /// True when the slide has neither bullets nor images.
    pub fn is_empty(&self) -> bool {
        self.bullets.is_empty() && self.images.is_empty()
    }
}

/// A bullet point with its nesting level (0 = top level).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bullet {
    /// Bullet text without the marker.
    pub text: String,

    /// Nesting level, at most [`MAX_BULLET_LEVEL`].
    pub level: u8,
}

impl Bullet {
    /// Create a bullet, clamping `level` to [`MAX_BULLET_LEVEL`].
    pub fn new(text: impl Into<String>, level: u8) -> Self {
        Self {
            text: text.into(),
            level: level.min(MAX_BULLET_LEVEL),
        }
    }
}

/// An image reference as written in the outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Alt text from the brackets.
    pub alt: String,

    /// Path as written; relative paths are resolved by the deck writer.
    pub path: String,
}

impl Deck {
    /// Parse outline text into a deck.
    ///
    /// The first `#` heading becomes the deck title; every later heading of
    /// any depth starts a new slide. Content before the first slide heading
    /// lands on a slide named after the deck. Unmarked lines are treated as
    /// top-level bullets.
    pub fn from_outline(text: &str) -> Self {
        let mut title: Option<String> = None;
        let mut slides: Vec<Slide> = Vec::new();
        let mut current: Option<Slide> = None;

        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(caps) = HEADING_REGEX.captures(line) {
                let text = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();

                if caps[1].len() == 1 && title.is_none() {
                    title = Some(text);
                    continue;
                }

                if let Some(slide) = current.take() {
                    slides.push(slide);
                }
                current = Some(Slide::new(text));
                continue;
            }

            // Implicit slide, titled once the deck title is known.
            let slide = current.get_or_insert_with(|| Slide::new(String::new()));

            if let Some(caps) = IMAGE_REGEX.captures(line) {
                slide.images.push(ImageRef {
                    alt: caps["alt"].trim().to_string(),
                    path: caps["path"].to_string(),
                });
            } else if let Some(item) = line.strip_prefix('-') {
                slide.bullets.push(Bullet::new(item.trim(), indent_level(raw)));
            } else {
                slide.bullets.push(Bullet::new(line, 0));
            }
        }

        if let Some(slide) = current.take() {
            slides.push(slide);
        }

        let title = title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        for slide in slides.iter_mut().filter(|s| s.title.is_empty()) {
            slide.title = title.clone();
        }

        Self { title, slides }
    }

    /// Total number of slides including the title slide.
    pub fn slide_count(&self) -> usize {
        self.slides.len() + 1
    }

    /// Iterate over every image reference in slide order.
    pub fn images(&self) -> impl Iterator<Item = &ImageRef> {
        self.slides.iter().flat_map(|s| s.images.iter())
    }
}

/// Bullet level from leading indentation: two columns per level, a tab
/// counting as two columns.
fn indent_level(raw: &str) -> u8 {
    let width: usize = raw
        .chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 2 } else { 1 })
        .sum();

    u8::try_from(width / 2).unwrap_or(MAX_BULLET_LEVEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_sample() {
        let deck =
            Deck::from_outline("# AI Basics\n## What is AI\n- branch of CS\n- mimics intelligence");

        assert_eq!(deck.title, "AI Basics");
        assert_eq!(deck.slides.len(), 1);
        assert_eq!(deck.slides[0].title, "What is AI");
        assert_eq!(
            deck.slides[0].bullets,
            vec![
                Bullet::new("branch of CS", 0),
                Bullet::new("mimics intelligence", 0)
            ]
        );
        assert_eq!(deck.slide_count(), 2);
    }

    #[test]
    fn test_missing_title_defaults() {
        let deck = Deck::from_outline("## Only slide\n- point");
        assert_eq!(deck.title, "Presentation");
        assert_eq!(deck.slides[0].title, "Only slide");

        assert_eq!(Deck::from_outline("").title, "Presentation");
        assert!(Deck::from_outline("").slides.is_empty());
    }

    #[test]
    fn test_nested_bullets() {
        let deck = Deck::from_outline("# T\n## S\n- top\n  - second\n    - third\n\t\t\t- tabs\n                    - very deep");
        let levels: Vec<u8> = deck.slides[0].bullets.iter().map(|b| b.level).collect();

        assert_eq!(levels, vec![0, 1, 2, 3, MAX_BULLET_LEVEL]);
    }

    #[test]
    fn test_images() {
        let deck = Deck::from_outline(
            "# T\n## Charts\n![Revenue chart](img/revenue.png)\n![](logo.jpg \"Logo\")\n!not an image",
        );
        let slide = &deck.slides[0];

        assert_eq!(
            slide.images,
            vec![
                ImageRef {
                    alt: "Revenue chart".to_string(),
                    path: "img/revenue.png".to_string()
                },
                ImageRef {
                    alt: String::new(),
                    path: "logo.jpg".to_string()
                },
            ]
        );
        assert_eq!(slide.bullets, vec![Bullet::new("!not an image", 0)]);
        assert_eq!(deck.images().count(), 2);
    }

    #[test]
    fn test_content_before_first_slide() {
        let deck = Deck::from_outline("# Welcome\nintro line\n- and a bullet\n## Next");

        assert_eq!(deck.slides.len(), 2);
        assert_eq!(deck.slides[0].title, "Welcome");
        assert_eq!(deck.slides[0].bullets.len(), 2);
        assert_eq!(deck.slides[1].title, "Next");
        assert!(deck.slides[1].is_empty());
    }

    #[test]
    fn test_second_top_heading_starts_slide() {
        let deck = Deck::from_outline("# Deck\n# Part two\n### Detail");
        let titles: Vec<&str> = deck.slides.iter().map(|s| s.title.as_str()).collect();

        assert_eq!(deck.title, "Deck");
        assert_eq!(titles, vec!["Part two", "Detail"]);
    }

    #[test]
    fn test_hashtag_is_not_a_heading() {
        let deck = Deck::from_outline("# Launch\n## Social\n#launchday\n- posts");

        assert_eq!(deck.slides.len(), 1);
        let texts: Vec<&str> = deck.slides[0].bullets.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["#launchday", "posts"]);
    }
}
