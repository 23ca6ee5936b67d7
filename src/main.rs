// richtext-refs: command-line front end
//
// Reads field HTML from a file or stdin, converts it between its editable,
// stored and rendered forms, and writes the result to stdout.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use richtext_refs::{ContentNormalizer, ElementContext, FieldConfig, LocaleId, StaticResolver};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Input file (default: stdin)
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// JSON object mapping reference tokens to URLs
    #[arg(long, global = true)]
    refs: Option<PathBuf>,

    /// JSON field settings
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Locale of the owning element
    #[arg(long, global = true)]
    locale: Option<LocaleId>,
}

#[derive(Subcommand)]
enum Command {
    /// Clean editable HTML for storage
    ToStored,
    /// Prepare stored text for the editor
    ToEditable,
    /// Resolve references for output
    Render,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.settings {
        Some(path) => FieldConfig::from_settings_json(&read_file(path)?)
            .with_context(|| format!("Invalid field settings in {}", path.display()))?,
        None => FieldConfig::builder().build()?,
    };
    let resolver = match &cli.refs {
        Some(path) => StaticResolver::from_json(&read_file(path)?)
            .with_context(|| format!("Invalid reference map in {}", path.display()))?,
        None => StaticResolver::new(),
    };
    tracing::debug!(references = resolver.len(), "loaded reference map");

    let input = match &cli.input {
        Some(path) => read_file(path)?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };

    let normalizer = ContentNormalizer::new(config, Arc::new(resolver));
    let ctx = ElementContext::new(cli.locale);

    let output = match cli.command {
        Command::ToStored => normalizer.to_stored(&input, &ctx)?.unwrap_or_default(),
        Command::ToEditable => normalizer.to_editable(&input, &ctx),
        Command::Render => normalizer.render(&input, &ctx),
    };

    io::stdout()
        .write_all(output.as_bytes())
        .context("Failed to write output")?;
    Ok(())
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}
