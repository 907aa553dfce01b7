//! [`ProviderClient`] over the Bitbucket Cloud 2.0 REST API.
//!
//! A client is bound to the comments resource of one pull request:
//!
//! ```text
//! {base}/repositories/{workspace}/{repository}/pullrequests/{id}/comments
//! ```
//!
//! Every request carries HTTP Basic credentials. Requests are issued one at a
//! time and bounded by the configured timeout; nothing is retried.

use async_trait::async_trait;
use pipeline::{
    CommentId, Credentials, ProviderClient, ProviderConfig, ProviderError, PullRequestKey,
    SourcePath, MARKER_TOKEN,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::pagination::{collect_pages, Page, PageLink};
use crate::payload::{CommentEntry, CreateComment};

/// Public Bitbucket Cloud API root.
pub const DEFAULT_BASE_URL: &str = "https://api.bitbucket.org/2.0";

/// Returns the listing filter selecting live decoration comments.
pub fn marker_filter() -> String {
    format!("(deleted = false AND content.raw ~ \"{MARKER_TOKEN}\")")
}

/// Comment client for one pull request.
#[derive(Debug, Clone)]
pub struct BitbucketCloudClient {
    http: reqwest::Client,
    comments_url: String,
    /// Parsed base URL; `next` links must share its origin.
    origin: reqwest::Url,
    credentials: Credentials,
}

impl BitbucketCloudClient {
    /// Creates a client for the comments of `pull_request`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Configuration`] if the base URL is not an
    /// absolute http(s) URL or the HTTP client cannot be built.
    pub fn new(config: &ProviderConfig, pull_request: &PullRequestKey) -> Result<Self, ProviderError> {
        let base = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        let parsed = reqwest::Url::parse(base).map_err(|e| ProviderError::Configuration {
            message: format!("invalid base URL '{base}': {e}"),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ProviderError::Configuration {
                message: format!("unsupported URL scheme '{}'", parsed.scheme()),
            });
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("pr-decorator"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ProviderError::Configuration {
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            comments_url: format!(
                "{base}/repositories/{}/{}/pullrequests/{}/comments",
                config.workspace, config.repository, pull_request
            ),
            origin: parsed,
            credentials: config.credentials.clone(),
        })
    }

    /// URL of the comments resource this client is bound to.
    pub fn comments_url(&self) -> &str {
        &self.comments_url
    }

    /// Authenticates and sends `request`, mapping non-success statuses to
    /// [`ProviderError::Api`].
    async fn send(&self, request: RequestBuilder) -> Result<Response, ProviderError> {
        let response = request
            .basic_auth(self.credentials.username(), Some(self.credentials.password()))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.text().await {
            Ok(body) if !body.trim().is_empty() => body,
            _ => status.canonical_reason().unwrap_or("request failed").to_string(),
        };
        Err(ProviderError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
        let body = response.text().await.map_err(transport_error)?;
        serde_json::from_str(&body).map_err(|e| ProviderError::Parse {
            message: e.to_string(),
        })
    }

    /// Parses a `next` link, refusing any that would carry the credentials
    /// to another scheme, host or port.
    fn same_origin(&self, link: &str) -> Result<reqwest::Url, ProviderError> {
        let url = reqwest::Url::parse(link).map_err(|e| ProviderError::Parse {
            message: format!("invalid next page link '{link}': {e}"),
        })?;
        if url.origin() != self.origin.origin() {
            warn!(next = %url, "Next page link leaves the API origin");
            return Err(ProviderError::Parse {
                message: format!("next page link '{link}' points outside the API origin"),
            });
        }
        Ok(url)
    }

    async fn fetch_comment_page(&self, link: PageLink) -> Result<Page<CommentEntry>, ProviderError> {
        let request = match link {
            PageLink::First => self
                .http
                .get(&self.comments_url)
                .query(&[("q", marker_filter())]),
            PageLink::Next(url) => self.http.get(self.same_origin(&url)?),
        };
        let response = self.send(request).await?;
        Self::read_json(response).await
    }
}

fn transport_error(error: reqwest::Error) -> ProviderError {
    let message = error.to_string();
    if error.is_decode() {
        ProviderError::Parse { message }
    } else {
        ProviderError::Transport { message }
    }
}

#[async_trait]
impl ProviderClient for BitbucketCloudClient {
    #[instrument(level = "debug", skip(self, text, path), fields(path = path.map(SourcePath::as_str)))]
    async fn create_comment(
        &self,
        text: &str,
        path: Option<&SourcePath>,
        line: Option<u32>,
    ) -> Result<(), ProviderError> {
        let body = CreateComment::new(text, path.map(SourcePath::as_str), line);
        self.send(self.http.post(&self.comments_url).json(&body))
            .await?;
        debug!("Created comment");
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn list_comment_ids(&self) -> Result<Vec<CommentId>, ProviderError> {
        let entries = collect_pages(|link| self.fetch_comment_page(link)).await?;
        let ids: Vec<CommentId> = entries
            .into_iter()
            .filter(CommentEntry::is_decoration)
            .filter_map(|entry| entry.id.into_comment_id())
            .collect();
        debug!(count = ids.len(), "Listed decoration comments");
        Ok(ids)
    }

    #[instrument(level = "debug", skip(self, id), fields(comment_id = %id))]
    async fn delete_comment(&self, id: &CommentId) -> Result<(), ProviderError> {
        let url = format!("{}/{}", self.comments_url, id);
        self.send(self.http.delete(url)).await?;
        debug!("Deleted comment");
        Ok(())
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
