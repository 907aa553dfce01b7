//! Provider configuration for a decoration pass.
//!
//! Configuration arrives as a loosely-typed [`RawDecoratorConfig`] (every key
//! optional, as it appears in the configuration file) and is validated into an
//! immutable [`ProviderConfig`] before any provider is contacted. Validation is
//! where [`ConfigurationError`] is raised.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigurationError;

/// Transport timeout used when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Dotted setting keys, as reported in configuration errors.
pub mod keys {
    pub const BASE_URL: &str = "provider.base_url";
    pub const WORKSPACE: &str = "provider.workspace";
    pub const REPOSITORY: &str = "provider.repository";
    pub const USERNAME: &str = "provider.username";
    pub const PASSWORD: &str = "provider.password";
    pub const TOKEN: &str = "provider.token";
    pub const REQUEST_TIMEOUT: &str = "provider.request_timeout_secs";
    pub const SUMMARY_COMMENT: &str = "decoration.summary_comment";
    pub const FILE_COMMENTS: &str = "decoration.file_comments";
    pub const DELETE_OLD_COMMENTS: &str = "decoration.delete_old_comments";
}

// ---------------------------------------------------------------------------
// Validated configuration
// ---------------------------------------------------------------------------

/// Which decoration steps run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecorationToggles {
    pub post_summary: bool,
    pub post_file_comments: bool,
    pub delete_stale_comments: bool,
}

impl Default for DecorationToggles {
    fn default() -> Self {
        Self {
            post_summary: true,
            post_file_comments: true,
            delete_stale_comments: true,
        }
    }
}

/// HTTP Basic credentials for the provider.
///
/// The password never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Splits a combined `username:password` token.
    ///
    /// Everything after the first `:` is the password, so passwords may
    /// themselves contain `:`.
    pub fn from_token(token: &str) -> Result<Self, ConfigurationError> {
        match token.split_once(':') {
            Some((user, password)) if !user.is_empty() && !password.is_empty() => {
                Ok(Self::new(user, password))
            }
            _ => Err(ConfigurationError::InvalidSetting {
                setting: keys::TOKEN.to_string(),
                reason: "expected the form 'username:password'".to_string(),
            }),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Immutable provider configuration for one decoration pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// API root; `None` selects the adapter's default (the public cloud API).
    pub base_url: Option<String>,
    pub workspace: String,
    pub repository: String,
    pub credentials: Credentials,
    pub request_timeout: Duration,
    pub toggles: DecorationToggles,
}

// ---------------------------------------------------------------------------
// Raw configuration
// ---------------------------------------------------------------------------

/// Configuration as read from the configuration file; every key optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawDecoratorConfig {
    #[serde(default)]
    pub provider: RawProviderSection,
    #[serde(default)]
    pub decoration: RawDecorationSection,
}

/// The `[provider]` section.
#[derive(Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawProviderSection {
    pub base_url: Option<String>,
    pub workspace: Option<String>,
    pub repository: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Combined `username:password`, accepted instead of the separate keys.
    pub token: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

impl std::fmt::Debug for RawProviderSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawProviderSection")
            .field("base_url", &self.base_url)
            .field("workspace", &self.workspace)
            .field("repository", &self.repository)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// The `[decoration]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawDecorationSection {
    pub summary_comment: Option<bool>,
    pub file_comments: Option<bool>,
    pub delete_old_comments: Option<bool>,
}

impl RawDecoratorConfig {
    /// Validates the raw configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingSetting`] naming the first absent
    /// or blank mandatory key, or [`ConfigurationError::InvalidSetting`] for a
    /// malformed token or a zero timeout.
    pub fn validate(self) -> Result<ProviderConfig, ConfigurationError> {
        let provider = self.provider;
        let decoration = self.decoration;

        let workspace = required(provider.workspace, keys::WORKSPACE)?;
        let repository = required(provider.repository, keys::REPOSITORY)?;

        let credentials = match (
            non_blank(provider.username),
            non_blank(provider.password),
            non_blank(provider.token),
        ) {
            (Some(user), Some(password), _) => Credentials::new(user, password),
            (_, _, Some(token)) => Credentials::from_token(&token)?,
            (None, _, None) => return Err(ConfigurationError::missing(keys::USERNAME)),
            (Some(_), None, None) => return Err(ConfigurationError::missing(keys::PASSWORD)),
        };

        let request_timeout = match provider.request_timeout_secs {
            None => DEFAULT_REQUEST_TIMEOUT,
            Some(0) => {
                return Err(ConfigurationError::InvalidSetting {
                    setting: keys::REQUEST_TIMEOUT.to_string(),
                    reason: "must be greater than zero".to_string(),
                })
            }
            Some(secs) => Duration::from_secs(secs),
        };

        let toggles = DecorationToggles {
            post_summary: decoration
                .summary_comment
                .ok_or_else(|| ConfigurationError::missing(keys::SUMMARY_COMMENT))?,
            post_file_comments: decoration
                .file_comments
                .ok_or_else(|| ConfigurationError::missing(keys::FILE_COMMENTS))?,
            delete_stale_comments: decoration
                .delete_old_comments
                .ok_or_else(|| ConfigurationError::missing(keys::DELETE_OLD_COMMENTS))?,
        };

        Ok(ProviderConfig {
            base_url: non_blank(provider.base_url),
            workspace,
            repository,
            credentials,
            request_timeout,
            toggles,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, key: &str) -> Result<String, ConfigurationError> {
    non_blank(value).ok_or_else(|| ConfigurationError::missing(key))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
