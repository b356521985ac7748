#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;
mod transcode;

use std::path::Path;

use anyhow::Context as _;
use args::{Args, Command};
use clap::Parser;
use synapse_config::Config;
use synapse_transcode::Codecs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load_or_default(args.config.as_deref())?;

    // Initialize logging
    synapse_telemetry::init(&config.logging)?;

    let codecs = Codecs::new(config.transcode);
    let direction = args.command.direction();
    let input = read_input(direction.input.as_deref()).await?;

    tracing::debug!(from = %direction.from, to = %direction.to, bytes = input.len(), "transcoding");

    let output = match &args.command {
        Command::Request(direction) => transcode::request(&codecs, direction.from, direction.to, &input)?,
        Command::Response(direction) => transcode::response(&codecs, direction.from, direction.to, &input)?,
        Command::Stream(direction) => transcode::stream(&codecs, direction.from, direction.to, input).await?,
    };

    let mut stdout = tokio::io::stdout();
    stdout.write_all(output.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

/// Read the whole input file, or stdin when no path is given
async fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            tokio::io::stdin()
                .read_to_string(&mut input)
                .await
                .context("failed to read stdin")?;
            Ok(input)
        }
    }
}
