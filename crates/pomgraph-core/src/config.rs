//! Resolver configuration.

use crate::error::{PomGraphError, Result};
use crate::ident::CENTRAL_URL;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Repository used for identities that do not carry their own.
    pub central_url: String,
    /// Build the transitive closure and effective set after direct resolution.
    pub resolve_transitives: bool,
    pub user_agent: String,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    /// Worker threads for batch runs; 0 picks the number of CPUs.
    pub parallelism: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            central_url: CENTRAL_URL.to_string(),
            resolve_transitives: true,
            user_agent: format!("pomgraph/{}", env!("CARGO_PKG_VERSION")),
            connect_timeout_ms: 2_000,
            read_timeout_ms: 5_000,
            parallelism: 0,
        }
    }
}

impl ResolverConfig {
    /// Reads a JSON config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.central_url.trim();
        if url.is_empty() {
            return Err(PomGraphError::Config {
                message: "central_url must not be empty".into(),
            });
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(PomGraphError::Config {
                message: format!("central_url '{url}' is not an http(s) URL"),
            });
        }
        Ok(())
    }
}
