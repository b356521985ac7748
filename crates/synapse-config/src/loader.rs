use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, expansion or parsing
    /// fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;
        Self::parse(&raw)
    }

    /// Load from `path` when given, otherwise use defaults
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`]
    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if `default_max_tokens` is zero or the log filter is
    /// not a valid directive
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.transcode.default_max_tokens == 0 {
            anyhow::bail!("transcode.default_max_tokens must be greater than zero");
        }

        tracing_subscriber::EnvFilter::try_new(&self.logging.filter)
            .map_err(|e| anyhow::anyhow!("invalid logging.filter '{}': {e}", self.logging.filter))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use indoc::indoc;

    use crate::{Config, LogFormat, UnknownContentPolicy};

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.transcode.default_max_tokens, 4096);
        assert!(config.transcode.capture_raw);
        assert_eq!(config.transcode.unknown_content, UnknownContentPolicy::Preserve);
        assert_eq!(config.logging.filter, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn full_document() {
        let config = Config::parse(indoc! {r#"
            [transcode]
            default_max_tokens = 1024
            unknown_content = "drop"
            capture_raw = false

            [logging]
            filter = "warn,synapse_transcode=debug"
            format = "json"
        "#})
        .unwrap();

        assert_eq!(config.transcode.default_max_tokens, 1024);
        assert!(!config.transcode.preserve_unknown());
        assert!(!config.transcode.capture_raw);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Config::parse("[transcode]\nmax_tokens = 5\n").unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
    }

    #[test]
    fn zero_max_tokens_is_rejected() {
        let err = Config::parse("[transcode]\ndefault_max_tokens = 0\n").unwrap_err();
        assert!(err.to_string().contains("default_max_tokens"));
    }

    #[test]
    fn invalid_filter_is_rejected() {
        let err = Config::parse("[logging]\nfilter = \"synapse=loud\"\n").unwrap_err();
        assert!(err.to_string().contains("logging.filter"));
    }

    #[test]
    fn env_placeholders_are_expanded() {
        temp_env::with_var("SYNAPSE_TEST_MAX_TOKENS", Some("2048"), || {
            let config = Config::parse("[transcode]\ndefault_max_tokens = {{ env.SYNAPSE_TEST_MAX_TOKENS }}\n").unwrap();
            assert_eq!(config.transcode.default_max_tokens, 2048);
        });
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[logging]\nformat = \"json\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config file"));
    }

    #[test]
    fn no_path_means_defaults() {
        assert_eq!(Config::load_or_default(None).unwrap(), Config::default());
    }
}
