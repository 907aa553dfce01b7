//! Request and response bodies for the pull-request comments resource.

use pipeline::comments::has_marker;
use pipeline::CommentId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `POST .../comments`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateComment<'a> {
    pub content: RawContent<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline: Option<Inline<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RawContent<'a> {
    pub raw: &'a str,
}

/// Anchors a comment to a file and, optionally, a line of the new revision.
#[derive(Debug, Serialize)]
pub(crate) struct Inline<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<u32>,
    pub path: &'a str,
}

impl<'a> CreateComment<'a> {
    pub fn new(text: &'a str, path: Option<&'a str>, line: Option<u32>) -> Self {
        Self {
            content: RawContent { raw: text },
            inline: path.map(|path| Inline { to: line, path }),
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Comment ids are numeric on the wire; strings are accepted as well.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum WireId {
    Number(u64),
    Text(String),
}

impl WireId {
    pub fn into_comment_id(self) -> Option<CommentId> {
        match self {
            Self::Number(n) => CommentId::new(n.to_string()),
            Self::Text(s) => CommentId::new(s.trim()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentContent {
    pub raw: Option<String>,
}

/// One entry of a comment listing; only the fields the adapter reads.
#[derive(Debug, Deserialize)]
pub(crate) struct CommentEntry {
    pub id: WireId,
    #[serde(default)]
    pub content: Option<CommentContent>,
    #[serde(default)]
    pub deleted: bool,
}

impl CommentEntry {
    /// `true` unless the entry is deleted or its body visibly lacks the
    /// marker. Entries returned without a body are trusted to the server-side
    /// filter.
    pub fn is_decoration(&self) -> bool {
        if self.deleted {
            return false;
        }
        match self.content.as_ref().and_then(|c| c.raw.as_deref()) {
            Some(raw) => has_marker(raw),
            None => true,
        }
    }
}
