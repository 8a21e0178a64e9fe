//! CLI tool for turning free-form notes into PowerPoint decks.

use anyhow::{Context, Result};
use chatppt_core::{
    CommandDeckBuilder, ConversationState, Deck, DeckBuilder, Generator, OutlineFormatter,
    OutlineStyle, Role, Settings, DECK_GENERATED,
};
use chatppt_pptx::PptxDeckBuilder;
use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Turn notes into slide decks.
#[derive(Parser, Debug)]
#[command(name = "chatppt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the outline that would be sent to the deck builder
    Format {
        /// Input text file (default: stdin)
        input: Option<PathBuf>,

        /// How plain lines are promoted (structured or literal)
        #[arg(short, long, env = "CHATPPT_STYLE", default_value = "structured")]
        style: OutlineStyle,
    },

    /// Build a deck directly from an outline file
    Build {
        /// Outline file (.md)
        outline: PathBuf,

        /// Output directory
        #[arg(short, long, env = "CHATPPT_OUTPUT_DIR", default_value = "outputs")]
        output: PathBuf,
    },

    /// Format text and build a deck from it, as the chat "generate" action does
    Generate {
        /// Input text file (default: stdin)
        input: Option<PathBuf>,

        /// Use this text instead of reading a file
        #[arg(short, long, conflicts_with = "input")]
        text: Option<String>,

        #[command(flatten)]
        generation: GenerationArgs,
    },
}

/// Options shared with the web server.
#[derive(Args, Debug)]
struct GenerationArgs {
    /// Output directory
    #[arg(short, long, env = "CHATPPT_OUTPUT_DIR", default_value = "outputs")]
    output: PathBuf,

    /// How plain lines are promoted (structured or literal)
    #[arg(short, long, env = "CHATPPT_STYLE", default_value = "structured")]
    style: OutlineStyle,

    /// External program to build decks instead of the built-in PPTX writer;
    /// it receives the outline path as its last argument
    #[arg(long, env = "CHATPPT_BUILDER")]
    builder_command: Option<PathBuf>,

    /// Argument passed to the external builder before the outline path
    #[arg(long = "builder-arg", allow_hyphen_values = true)]
    builder_args: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match cli.command {
        Command::Format { input, style } => {
            let text = read_input(input.as_deref())?;
            println!("{}", OutlineFormatter::new().with_style(style).format(&text));
        }
        Command::Build { outline, output } => {
            let path = build_outline(&outline, &output)?;
            println!("{}", path.display());
        }
        Command::Generate {
            input,
            text,
            generation,
        } => {
            let text = match text {
                Some(text) => text,
                None => read_input(input.as_deref())?,
            };
            println!("{}", generate(&text, &generation)?);
        }
    }

    Ok(())
}

/// Read text from a file, or from stdin when no path is given.
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Build a deck from an outline file without reformatting it.
fn build_outline(outline: &Path, output_dir: &Path) -> Result<PathBuf> {
    let text = std::fs::read_to_string(outline)
        .with_context(|| format!("Failed to read {}", outline.display()))?;
    let deck = Deck::from_outline(&text);

    Settings::new(output_dir)
        .ensure_output_dir()
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    PptxDeckBuilder::new(output_dir)
        .write_deck(&deck, outline.parent())
        .with_context(|| format!("Failed to write deck for {}", outline.display()))
}

/// Run one generation and return the assistant message.
///
/// A message other than a generated deck is returned as an error, so the
/// process exits non-zero.
fn generate(text: &str, args: &GenerationArgs) -> Result<String> {
    let settings = Settings::new(&args.output).with_style(args.style);
    settings
        .ensure_output_dir()
        .with_context(|| format!("Failed to create output directory: {}", args.output.display()))?;

    let builder: Box<dyn DeckBuilder> = match &args.builder_command {
        Some(program) => Box::new(CommandDeckBuilder::new(program).args(&args.builder_args)),
        None => Box::new(PptxDeckBuilder::new(&args.output)),
    };

    let generator = Generator::new(settings, builder);
    let (history, _) = generator.generate(text, ConversationState::new());

    let reply = history
        .into_iter()
        .find(|t| t.role == Role::Assistant)
        .map(|t| t.text)
        .unwrap_or_default();

    if !reply.starts_with(DECK_GENERATED) {
        anyhow::bail!("{}", reply);
    }
    Ok(reply)
}
