//! Following `next` links across paginated collections.

use std::collections::HashSet;
use std::future::Future;

use pipeline::ProviderError;
use serde::Deserialize;
use tracing::{debug, warn};

/// One page of a paginated collection.
#[derive(Debug, Deserialize)]
pub(crate) struct Page<T> {
    #[serde(default = "Vec::new")]
    pub values: Vec<T>,
    /// Absolute URL of the following page; absent on the last page.
    #[serde(default)]
    pub next: Option<String>,
}

/// Which page to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PageLink {
    /// The collection's own URL with the caller's query.
    First,
    /// A `next` URL returned by the previous page.
    Next(String),
}

/// Fetches pages one at a time until a page has no `next` link, collecting
/// values in arrival order.
///
/// The first failing page aborts the walk. A `next` link that was already
/// followed ends it.
pub(crate) async fn collect_pages<T, F, Fut>(mut fetch_page: F) -> Result<Vec<T>, ProviderError>
where
    F: FnMut(PageLink) -> Fut,
    Fut: Future<Output = Result<Page<T>, ProviderError>>,
{
    let mut values = Vec::new();
    let mut link = PageLink::First;
    let mut pages = 0_usize;
    let mut followed = HashSet::new();

    loop {
        let page = fetch_page(link).await?;
        pages += 1;
        values.extend(page.values);
        match page.next {
            Some(next) if !next.trim().is_empty() => {
                if !followed.insert(next.clone()) {
                    warn!(%next, "Next page link repeats, stopping");
                    break;
                }
                link = PageLink::Next(next);
            }
            _ => break,
        }
    }

    debug!(pages, values = values.len(), "Collected paginated results");
    Ok(values)
}

#[cfg(test)]
#[path = "pagination_tests.rs"]
mod tests;
