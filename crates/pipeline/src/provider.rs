//! The pull-request comment port.
//!
//! A [`ProviderClient`] binds the three comment intents used during decoration
//! (create, list marker comments, delete) to one external API dialect. The
//! domain only ever talks to this trait; adapters own the transport.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CommentId, SourcePath};

/// Errors raised by a provider adapter.
///
/// These are never fatal to a decoration pass: the orchestrator records them
/// against the step that raised them and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderError {
    /// The adapter cannot be used with the supplied configuration.
    #[error("provider configuration error: {message}")]
    Configuration { message: String },

    /// The request never produced a response (connect, TLS, timeout).
    #[error("provider transport error: {message}")]
    Transport { message: String },

    /// The API answered with a non-success status.
    #[error("provider API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or reason phrase.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("provider parse error: {message}")]
    Parse { message: String },
}

/// Comment operations on the pull request a client is bound to.
///
/// Calls are made one at a time; implementations need not support concurrent
/// use of a single instance.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Posts a comment.
    ///
    /// With a `path` the comment is attached inline to that file (and to
    /// `line` when given); without one it is a general comment.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the comment could not be created.
    async fn create_comment(
        &self,
        text: &str,
        path: Option<&SourcePath>,
        line: Option<u32>,
    ) -> Result<(), ProviderError>;

    /// Lists the ids of all comments carrying the decoration marker, in the
    /// order the provider returns them, across every page.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] if any page cannot be fetched or decoded.
    async fn list_comment_ids(&self) -> Result<Vec<CommentId>, ProviderError>;

    /// Deletes one comment.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the deletion failed.
    async fn delete_comment(&self, id: &CommentId) -> Result<(), ProviderError>;
}
