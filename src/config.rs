// config.rs - Naming convention and config file loading
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_PROXY_EXTENSION: &str = "ass";
pub const DEFAULT_NATIVE_EXTENSION: &str = "ma";
pub const DEFAULT_LOW_TOKEN: &str = "SD";
pub const DEFAULT_HIGH_TOKEN: &str = "HD";

/// On-disk naming convention for standin assets.
///
/// `<asset_dir>/<name>_<VARIANT>/<version>/<name>_<VARIANT>.<proxy_extension>`
/// with the native scene file sitting next to the proxy under
/// `native_extension`. The two tokens name the low and high detail variants
/// used for one-click SD/HD switching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Convention {
    pub proxy_extension: String,
    pub native_extension: String,
    pub low_token: String,
    pub high_token: String,
}

impl Default for Convention {
    fn default() -> Self {
        Self {
            proxy_extension: DEFAULT_PROXY_EXTENSION.to_string(),
            native_extension: DEFAULT_NATIVE_EXTENSION.to_string(),
            low_token: DEFAULT_LOW_TOKEN.to_string(),
            high_token: DEFAULT_HIGH_TOKEN.to_string(),
        }
    }
}

impl Convention {
    /// Parse a convention from JSON. Missing keys keep their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let convention: Convention =
            serde_json::from_str(text).context("Invalid convention config")?;
        convention.validate()?;
        Ok(convention)
    }

    /// Load from a config file, or the defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let convention = Self::from_json(&text)
            .with_context(|| format!("Failed to load config file: {:?}", path))?;
        log::debug!("Loaded convention from {:?}: {:?}", path, convention);
        Ok(convention)
    }

    fn validate(&self) -> Result<()> {
        let fields = [
            ("proxy_extension", &self.proxy_extension),
            ("native_extension", &self.native_extension),
            ("low_token", &self.low_token),
            ("high_token", &self.high_token),
        ];
        for (key, value) in fields {
            anyhow::ensure!(!value.is_empty(), "{} must not be empty", key);
        }
        anyhow::ensure!(
            self.low_token != self.high_token,
            "low_token and high_token must differ"
        );
        anyhow::ensure!(
            !self.low_token.contains(&self.high_token) && !self.high_token.contains(&self.low_token),
            "low_token {:?} and high_token {:?} must not contain each other",
            self.low_token,
            self.high_token
        );
        anyhow::ensure!(
            self.proxy_extension != self.native_extension,
            "proxy_extension and native_extension must differ"
        );
        Ok(())
    }
}
