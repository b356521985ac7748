use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use synapse_transcode::Vendor;

/// Synapse transcoder
#[derive(Debug, Parser)]
#[command(
    name = "synapse-transcode",
    about = "Translate LLM API payloads between vendor wire formats"
)]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "SYNAPSE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// What kind of payload the input holds
#[derive(Debug, Subcommand)]
pub enum Command {
    /// A request body
    Request(Direction),
    /// A response or error body
    Response(Direction),
    /// An SSE transcript
    Stream(Direction),
}

impl Command {
    pub const fn direction(&self) -> &Direction {
        match self {
            Self::Request(direction) | Self::Response(direction) | Self::Stream(direction) => direction,
        }
    }
}

#[derive(Debug, clap::Args)]
pub struct Direction {
    /// Vendor format of the input
    #[arg(long)]
    pub from: Vendor,

    /// Vendor format of the output, or `canonical`
    #[arg(long)]
    pub to: Target,

    /// Input file, stdin when omitted
    pub input: Option<PathBuf>,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Canonical,
    Vendor(Vendor),
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "canonical" {
            return Ok(Self::Canonical);
        }
        Vendor::from_str(s)
            .map(Self::Vendor)
            .map_err(|_| format!("unknown target '{s}', expected canonical, anthropic or openai"))
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Canonical => f.write_str("canonical"),
            Self::Vendor(vendor) => vendor.fmt(f),
        }
    }
}
