//! Heuristic conversion of free-form chat text into a heading/bullet outline.
//!
//! Lines that already carry a marker (`#` heading, `-` bullet, `!` image) are
//! kept as typed. Plain lines are promoted to headings or bullets depending on
//! the [`OutlineStyle`]. Blank lines never reach the output.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Title used when the input does not provide one.
pub const DEFAULT_TITLE: &str = "Presentation";

/// Line prefixes that mark a line as already formatted.
const MARKERS: &[char] = &['#', '-', '!'];

/// How plain (unmarked) lines are promoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlineStyle {
    /// Every plain line becomes a second-level heading and the default title
    /// is injected whenever the input does not open with `# `.
    Literal,
    /// Blank lines separate blocks. A plain first line becomes the title, the
    /// first plain line of each block becomes a heading and the rest of the
    /// block becomes bullets.
    #[default]
    Structured,
}

impl OutlineStyle {
    /// Name accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Literal => "literal",
            Self::Structured => "structured",
        }
    }
}

impl fmt::Display for OutlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutlineStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "literal" => Ok(Self::Literal),
            "structured" => Ok(Self::Structured),
            other => Err(Error::UnknownStyle(other.to_string())),
        }
    }
}

/// Formatter from raw chat text to outline text.
#[derive(Debug, Clone, Default)]
pub struct OutlineFormatter {
    style: OutlineStyle,
}

impl OutlineFormatter {
    /// Create a formatter using the default [`OutlineStyle::Structured`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific style.
    pub fn with_style(mut self, style: OutlineStyle) -> Self {
        self.style = style;
        self
    }

    /// The style this formatter applies.
    pub fn style(&self) -> OutlineStyle {
        self.style
    }

    /// Format raw text into outline text.
    ///
    /// Never fails and never returns an empty string: empty input yields
    /// `# Presentation`. Lines are joined with `\n` and there is no trailing
    /// newline.
    ///
    /// # Example
    /// ```
    /// use chatppt_core::OutlineFormatter;
    ///
    /// let outline = OutlineFormatter::new()
    ///     .format("AI Basics\n\nWhat is AI\n- branch of CS\n- mimics intelligence");
    /// assert_eq!(
    ///     outline,
    ///     "# AI Basics\n## What is AI\n- branch of CS\n- mimics intelligence"
    /// );
    /// ```
    pub fn format(&self, text: &str) -> String {
        let lines: Vec<&str> = text.trim().lines().map(str::trim).collect();

        let output = match self.style {
            OutlineStyle::Literal => format_literal(&lines),
            OutlineStyle::Structured => format_structured(&lines),
        };

        output.join("\n")
    }
}

fn default_heading() -> String {
    format!("# {}", DEFAULT_TITLE)
}

fn is_marked(line: &str) -> bool {
    line.starts_with(MARKERS)
}

fn opens_with_title(lines: &[&str]) -> bool {
    lines.first().is_some_and(|line| line.starts_with("# "))
}

fn format_literal(lines: &[&str]) -> Vec<String> {
    let mut output = Vec::with_capacity(lines.len() + 1);

    if !opens_with_title(lines) {
        output.push(default_heading());
    }

    for line in lines.iter().filter(|l| !l.is_empty()) {
        if is_marked(line) {
            output.push(line.to_string());
        } else {
            output.push(format!("## {}", line));
        }
    }

    output
}

fn format_structured(lines: &[&str]) -> Vec<String> {
    let mut output = Vec::with_capacity(lines.len() + 1);

    // The title line never counts as the heading of the block it sits in.
    let rest = match lines.split_first() {
        Some((first, rest)) if first.starts_with("# ") => {
            output.push(first.to_string());
            rest
        }
        Some((first, rest)) if !is_marked(first) => {
            output.push(format!("# {}", first));
            rest
        }
        _ => {
            output.push(default_heading());
            lines
        }
    };

    let mut block_has_heading = false;

    for &line in rest {
        if line.is_empty() {
            block_has_heading = false;
        } else if line.starts_with('#') {
            block_has_heading = true;
            output.push(line.to_string());
        } else if is_marked(line) {
            output.push(line.to_string());
        } else if block_has_heading {
            output.push(format!("- {}", line));
        } else {
            block_has_heading = true;
            output.push(format!("## {}", line));
        }
    }

    output
}
