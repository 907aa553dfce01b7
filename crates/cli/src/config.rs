//! Loading decorator inputs from disk: provider configuration (TOML), the
//! branch registry, analysis results and descriptors (JSON).

use std::path::Path;

use anyhow::{Context, Result};
use pipeline::{ProviderConfig, RawDecoratorConfig};
use serde::de::DeserializeOwned;

/// Environment variable supplying the provider password when the
/// configuration file does not.
pub const PASSWORD_ENV: &str = "PR_DECORATOR_PASSWORD";

/// Reads and validates the provider configuration at `path`.
///
/// Validation failures surface as [`pipeline::ConfigurationError`] inside the
/// returned error.
pub fn load_provider_config(path: &Path) -> Result<ProviderConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration file {}", path.display()))?;
    let config = parse_provider_config(&text, std::env::var(PASSWORD_ENV).ok())
        .with_context(|| format!("invalid configuration file {}", path.display()))?;
    Ok(config)
}

/// Parses configuration text. `env_password` fills `provider.password` when
/// the file leaves it (and `provider.token`) unset.
pub fn parse_provider_config(text: &str, env_password: Option<String>) -> Result<ProviderConfig> {
    let mut raw: RawDecoratorConfig = toml::from_str(text)?;
    if raw.provider.password.is_none() && raw.provider.token.is_none() {
        raw.provider.password = env_password;
    }
    Ok(raw.validate()?)
}

/// Reads a JSON document from `path`.
pub fn load_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} file {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid {what} file {}", path.display()))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
