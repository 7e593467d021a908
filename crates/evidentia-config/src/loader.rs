//! TOML threshold loader.
//!
//! `ConfigLoader` reads a `ConfigFile` from a TOML string or file, overlays
//! it on the `MatchConfig` defaults, and validates the result before handing
//! it out. An invalid configuration never reaches the matcher.

use std::path::Path;

use tracing::{debug, info};

use evidentia_contracts::{
    config::MatchConfig,
    error::{EvidentiaError, EvidentiaResult},
};

use crate::schema::ConfigFile;

/// Loads and validates matcher thresholds.
///
/// ```rust,ignore
/// use evidentia_config::ConfigLoader;
///
/// let config = ConfigLoader::from_file(Path::new("thresholds.toml"))?.config();
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    file: ConfigFile,
    config: MatchConfig,
}

impl ConfigLoader {
    /// Parse `s` as TOML and build a validated configuration.
    ///
    /// Returns `EvidentiaError::ConfigError` if the TOML is malformed, has
    /// unknown keys, or yields thresholds that fail validation.
    pub fn from_toml_str(s: &str) -> EvidentiaResult<Self> {
        let file: ConfigFile = toml::from_str(s).map_err(|e| EvidentiaError::ConfigError {
            reason: format!("failed to parse threshold TOML: {}", e),
        })?;
        let config = file.apply(MatchConfig::default());
        config.validate()?;

        debug!(overrides = ?file.overridden_keys(), "threshold configuration loaded");
        Ok(Self { file, config })
    }

    /// Read the file at `path` and parse it as threshold configuration.
    ///
    /// Returns `EvidentiaError::Io` if the file cannot be read, otherwise
    /// whatever `from_toml_str` returns.
    pub fn from_file(path: &Path) -> EvidentiaResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| EvidentiaError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let loader = Self::from_toml_str(&contents)?;
        info!(path = %path.display(), "thresholds loaded from file");
        Ok(loader)
    }

    /// The validated configuration.
    pub fn config(&self) -> MatchConfig {
        self.config
    }

    /// The raw file contents as parsed.
    pub fn file(&self) -> &ConfigFile {
        &self.file
    }
}

/// Load `path` when given, otherwise fall back to the defaults.
pub fn load_or_default(path: Option<&Path>) -> EvidentiaResult<MatchConfig> {
    match path {
        Some(path) => Ok(ConfigLoader::from_file(path)?.config()),
        None => Ok(MatchConfig::default()),
    }
}
