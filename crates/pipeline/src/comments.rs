//! Comment lifecycle: the decoration marker and stale-comment clearing.
//!
//! Every comment this system creates starts with [`COMMENT_MARKER`], an empty
//! markdown link that renders invisibly. Listing filters on the marker, so a
//! clear only ever touches comments this system wrote.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::{CommentId, ProviderClient, ProviderError};

/// Token identifying decoration comments.
pub const MARKER_TOKEN: &str = "[PR-DECORATION]";

/// Invisible markdown prefix placed on every decoration comment.
pub const COMMENT_MARKER: &str = "[](https://[PR-DECORATION])";

/// Prefixes `text` with the decoration marker.
pub fn with_marker(text: &str) -> String {
    format!("{COMMENT_MARKER}\n{text}")
}

/// Returns `true` if `body` was written by this system.
pub fn has_marker(body: &str) -> bool {
    body.contains(MARKER_TOKEN)
}

/// A comment that could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedDeletion {
    pub id: CommentId,
    pub error: ProviderError,
}

/// Result of clearing stale comments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearOutcome {
    pub deleted: Vec<CommentId>,
    pub failed: Vec<FailedDeletion>,
}

/// Removes decoration comments left by earlier passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentSynchronizer;

impl CommentSynchronizer {
    pub fn new() -> Self {
        Self
    }

    /// Lists every marker comment and deletes each one in listing order.
    ///
    /// A failed deletion is recorded and the remaining ids are still
    /// attempted.
    ///
    /// # Errors
    ///
    /// Returns the listing error; nothing is deleted in that case.
    #[instrument(level = "debug", skip_all)]
    pub async fn clear<C>(&self, client: &C) -> Result<ClearOutcome, ProviderError>
    where
        C: ProviderClient + ?Sized,
    {
        let ids = client.list_comment_ids().await?;
        debug!(count = ids.len(), "Found decoration comments");

        let mut outcome = ClearOutcome::default();
        for id in ids {
            match client.delete_comment(&id).await {
                Ok(()) => outcome.deleted.push(id),
                Err(error) => {
                    warn!(comment_id = %id, %error, "Failed to delete comment");
                    outcome.failed.push(FailedDeletion { id, error });
                }
            }
        }

        info!(
            deleted = outcome.deleted.len(),
            failed = outcome.failed.len(),
            "Cleared decoration comments"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "comments_tests.rs"]
mod tests;
