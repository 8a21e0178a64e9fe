//! Browser chat front end for ChatPPT deck generation.

mod api;
mod page;
mod state;

use anyhow::{Context, Result};
use chatppt_core::{CommandDeckBuilder, Generator, OutlineStyle, Settings};
use chatppt_pptx::PptxDeckBuilder;
use clap::Parser;
use state::{AppState, BoxedBuilder};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

/// Serve the ChatPPT chat page.
#[derive(Parser, Debug)]
#[command(name = "chatppt-web")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(short, long, env = "CHATPPT_BIND", default_value = "0.0.0.0:7860")]
    bind: SocketAddr,

    /// Output directory for generated decks
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

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let settings = Settings::new(&args.output).with_style(args.style);
    settings
        .ensure_output_dir()
        .with_context(|| format!("Failed to create output directory: {}", args.output.display()))?;

    let builder: BoxedBuilder = match &args.builder_command {
        Some(program) => {
            log::info!("Using external deck builder: {}", program.display());
            Box::new(CommandDeckBuilder::new(program).args(&args.builder_args))
        }
        None => Box::new(PptxDeckBuilder::new(&args.output)),
    };

    let app = api::create_router(AppState::new(Generator::new(settings, builder)));

    let listener = TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;

    log::info!(
        "ChatPPT listening on http://{} (decks in {}, {} outlines)",
        args.bind,
        args.output.display(),
        args.style
    );

    axum::serve(listener, app).await?;

    Ok(())
}
