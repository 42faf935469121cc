//! ittmeta - decode embedded match metadata from replay action dumps.
//!
//! Three decoding strategies are exposed as subcommands: `mmd` (scoreboard
//! protocol, recommended), `chat` (chat-based encoding), and `decode`
//! (order-based encoding). All three feed the same spec-driven payload
//! parser; exit codes map 1:1 from the pipeline's error codes.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};
use ittmeta_core::{ReplayMetaError, Result};
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ittmeta",
    version,
    about = "Decode embedded match metadata from game replay action dumps"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Decode metadata using the order-based encoding
    Decode(DecodeArgs),
    /// Decode metadata using the chat-based encoding
    Chat(DecodeArgs),
    /// Decode metadata using the scoreboard protocol (recommended)
    Mmd(DecodeArgs),
}

#[derive(Args)]
struct DecodeArgs {
    /// Replay action dump to decode
    path: Option<PathBuf>,

    /// Replay action dump to decode (alternative to the positional path)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Path to a JSON metadata spec (defaults to the bundled spec)
    #[arg(long)]
    spec: Option<PathBuf>,

    /// Output JSON
    #[arg(long)]
    json: bool,

    /// Pretty-print JSON (implies --json)
    #[arg(long)]
    pretty: bool,

    /// Include the reconstructed payload in output
    #[arg(long)]
    raw: bool,
}

impl DecodeArgs {
    fn input_path(&self) -> Result<PathBuf> {
        self.input
            .clone()
            .or_else(|| self.path.clone())
            .ok_or_else(|| ReplayMetaError::payload_invalid("missing input replay path"))
    }
}

/// Diagnostics go to stderr so stdout stays machine-parseable.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        // No subcommand behaves like `help`.
        let _ = Cli::command().print_long_help();
        return;
    };

    let result = match command {
        Command::Decode(args) => commands::decode(args).await,
        Command::Chat(args) => commands::chat(args).await,
        Command::Mmd(args) => commands::mmd(args).await,
    };

    if let Err(err) = result {
        eprintln!("{err}");
        if let Some(details) = err.details() {
            eprintln!("{details}");
        }
        std::process::exit(err.code().exit_code());
    }
}
