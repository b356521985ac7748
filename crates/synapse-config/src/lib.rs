//! Configuration for the Synapse transcoder
//!
//! Loaded from TOML with `{{ env.VAR }}` placeholders expanded before parsing.
//! Every field has a default, so an empty document is a valid configuration.

#![allow(clippy::must_use_candidate)]

mod env;
mod loader;
pub mod logging;
pub mod transcode;

use serde::Deserialize;

pub use logging::*;
pub use transcode::*;

/// Top-level Synapse configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Conversion behavior
    #[serde(default)]
    pub transcode: TranscodeConfig,
    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}
