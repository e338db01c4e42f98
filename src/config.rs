use anyhow::{bail, Result};
use std::env;

/// Default webhook port when PORT is unset or unparsable
pub const DEFAULT_PORT: u16 = 3000;

/// Application configuration, loaded from environment variables.
///
/// `.env` loading (via dotenv) happens in `main` before this is read;
/// no config files are consulted.
#[derive(Debug, Clone)]
pub struct Config {
    /// MentraOS package identifier (e.g., "com.example.echo")
    pub package_name: String,

    /// API key issued by the MentraOS developer console
    pub api_key: String,

    /// Port the webhook server binds to
    pub port: u16,
}

impl Config {
    /// Load configuration from process environment variables.
    ///
    /// PACKAGE_NAME and MENTRAOS_API_KEY are required; a missing value is a
    /// fatal error raised before any listener is bound. PORT is optional and
    /// falls back to 3000 when unset or unparsable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Kept separate from `from_env` so tests don't mutate process env.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let package_name = match lookup("PACKAGE_NAME") {
            Some(v) if !v.is_empty() => v,
            _ => bail!("PACKAGE_NAME environment variable is required"),
        };

        let api_key = match lookup("MENTRAOS_API_KEY") {
            Some(v) if !v.is_empty() => v,
            _ => bail!("MENTRAOS_API_KEY environment variable is required"),
        };

        let port = lookup("PORT")
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            package_name,
            api_key,
            port,
        })
    }
}
