//! Cursor pagination over list endpoints.
//!
//! List endpoints answer with `has_more` plus an opaque cursor, named
//! `page_token` on most resources and `next_page_token` on a few. [`paginate`]
//! turns a "fetch one page" closure into a lazy stream of pages.

use std::future::Future;
use std::pin::Pin;

use futures::{Stream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};

use crate::LarkError;

/// A pinned, boxed stream of pages.
pub type PageStream<'a, P> = Pin<Box<dyn Stream<Item = Result<P, LarkError>> + Send + 'a>>;

/// One page of a list response.
pub trait Page {
    type Item;

    fn has_more(&self) -> bool;

    /// Raw cursor fields as returned: `(page_token, next_page_token)`.
    fn cursor(&self) -> (Option<&str>, Option<&str>);

    fn into_items(self) -> Vec<Self::Item>;

    /// Cursor for the following page, or `None` when this is the last one.
    ///
    /// `page_token` wins over `next_page_token`; empty strings count as absent.
    fn next_page_token(&self) -> Option<String> {
        if !self.has_more() {
            return None;
        }
        let (page_token, next_page_token) = self.cursor();
        page_token
            .filter(|t| !t.is_empty())
            .or(next_page_token.filter(|t| !t.is_empty()))
            .map(String::from)
    }
}

/// The common `{ items, has_more, page_token }` list shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageData<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
}

impl<T> Default for PageData<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
            page_token: None,
            next_page_token: None,
            total: None,
        }
    }
}

impl<T> Page for PageData<T> {
    type Item = T;

    fn has_more(&self) -> bool {
        self.has_more
    }

    fn cursor(&self) -> (Option<&str>, Option<&str>) {
        (self.page_token.as_deref(), self.next_page_token.as_deref())
    }

    fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// Lazily fetch pages until the platform reports no more, or a call fails.
///
/// `fetch` receives the cursor for the page to load: `None` on the first call,
/// then the cursor from the previous page. The first error is yielded and ends
/// the stream. A page claiming `has_more` without a cursor also ends it.
pub fn paginate<'a, P, F, Fut>(mut fetch: F) -> PageStream<'a, P>
where
    P: Page + Send + 'a,
    F: FnMut(Option<String>) -> Fut + Send + 'a,
    Fut: Future<Output = Result<P, LarkError>> + Send + 'a,
{
    Box::pin(async_stream::stream! {
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;
        loop {
            match fetch(cursor.take()).await {
                Ok(page) => {
                    pages += 1;
                    let next = page.next_page_token();
                    let dangling = next.is_none() && page.has_more();
                    yield Ok(page);
                    match next {
                        Some(token) => cursor = Some(token),
                        None => {
                            if dangling {
                                tracing::warn!(
                                    pages,
                                    "list response has_more=true without a page token; stopping"
                                );
                            }
                            break;
                        }
                    }
                }
                Err(e) => {
                    tracing::debug!(pages, "pagination stopped on error: {e}");
                    yield Err(e);
                    break;
                }
            }
        }
    })
}

/// Flatten a page stream into a stream of items.
pub fn items<'a, P>(
    pages: PageStream<'a, P>,
) -> Pin<Box<dyn Stream<Item = Result<P::Item, LarkError>> + Send + 'a>>
where
    P: Page + Send + 'a,
    P::Item: Send + 'a,
{
    Box::pin(
        pages
            .map_ok(|page| {
                futures::stream::iter(page.into_items().into_iter().map(Ok::<_, LarkError>))
            })
            .try_flatten(),
    )
}

/// Drain a page stream and collect every item.
pub async fn collect_items<P>(pages: PageStream<'_, P>) -> Result<Vec<P::Item>, LarkError>
where
    P: Page + Send,
    P::Item: Send,
{
    let mut out = Vec::new();
    let mut pages = pages;
    while let Some(page) = pages.next().await {
        out.extend(page?.into_items());
    }
    Ok(out)
}
