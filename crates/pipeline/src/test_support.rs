//! In-memory [`ProviderClient`] used by the domain tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::comments::has_marker;
use crate::{CommentId, ProviderClient, ProviderError, SourcePath};

/// A comment held by [`FakeProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub body: String,
    pub path: Option<SourcePath>,
    pub line: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create,
    List,
    Delete(String),
}

#[derive(Default)]
struct State {
    comments: Vec<Comment>,
    next_id: u64,
    calls: Vec<Call>,
}

/// Provider that keeps comments in memory and can be told to fail.
#[derive(Default)]
pub struct FakeProvider {
    state: Mutex<State>,
    pub fail_list: bool,
    pub fail_delete: HashSet<String>,
    /// Creates whose text contains this substring fail.
    pub fail_create_containing: Option<String>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_list() -> Self {
        Self {
            fail_list: true,
            ..Self::default()
        }
    }

    pub fn failing_create_containing(needle: &str) -> Self {
        Self {
            fail_create_containing: Some(needle.to_string()),
            ..Self::default()
        }
    }

    /// Seeds a comment as if another pass (or a human) had written it.
    pub fn seed(&self, body: &str) -> CommentId {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = CommentId::new(state.next_id.to_string()).unwrap();
        state.comments.push(Comment {
            id: id.clone(),
            body: body.to_string(),
            path: None,
            line: None,
        });
        id
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.state.lock().unwrap().comments.clone()
    }

    pub fn marker_comments(&self) -> Vec<Comment> {
        self.comments()
            .into_iter()
            .filter(|c| has_marker(&c.body))
            .collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }
}

#[async_trait]
impl ProviderClient for FakeProvider {
    async fn create_comment(
        &self,
        text: &str,
        path: Option<&SourcePath>,
        line: Option<u32>,
    ) -> Result<(), ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create);
        if let Some(needle) = &self.fail_create_containing {
            if text.contains(needle.as_str()) {
                return Err(ProviderError::Api {
                    status: 400,
                    message: "rejected".to_string(),
                });
            }
        }
        state.next_id += 1;
        let id = CommentId::new(state.next_id.to_string()).unwrap();
        state.comments.push(Comment {
            id,
            body: text.to_string(),
            path: path.cloned(),
            line,
        });
        Ok(())
    }

    async fn list_comment_ids(&self) -> Result<Vec<CommentId>, ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::List);
        if self.fail_list {
            return Err(ProviderError::Transport {
                message: "connection reset".to_string(),
            });
        }
        Ok(state
            .comments
            .iter()
            .filter(|c| has_marker(&c.body))
            .map(|c| c.id.clone())
            .collect())
    }

    async fn delete_comment(&self, id: &CommentId) -> Result<(), ProviderError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Delete(id.to_string()));
        if self.fail_delete.contains(id.as_str()) {
            return Err(ProviderError::Api {
                status: 403,
                message: "forbidden".to_string(),
            });
        }
        state.comments.retain(|c| &c.id != id);
        Ok(())
    }
}
