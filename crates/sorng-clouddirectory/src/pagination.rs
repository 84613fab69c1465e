//! Token-driven pagination.
//!
//! Every listing returns a [`Page`]. Walkers re-issue the same request with
//! the previous page's token until the token is absent or empty, and stop
//! early once an optional overall ceiling is reached. Pages of one walk are
//! fetched strictly in sequence.

use crate::client::DirectoryClient;
use crate::error::DirectoryResult;
use crate::model::{
    AttributeKeyAndValue, DirectoryDescription, ObjectChild, ObjectSelector, TypedLinkSpecifier,
};
use serde_json::Value;
use std::future::Future;

/// One page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Opaque continuation token, passed back unchanged.
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self { items, next_token }
    }

    /// True when no further page exists.
    pub fn is_last(&self) -> bool {
        self.next_token.as_deref().map_or(true, str::is_empty)
    }
}

/// Walk pages with `fetch` until the last page, or until `limit` items have
/// been collected (the result is then truncated to `limit`).
///
/// `fetch` receives `None` for the first page and the previous token after.
/// A limit of zero issues no request.
pub async fn paginate<T, F, Fut>(limit: Option<usize>, mut fetch: F) -> DirectoryResult<Vec<T>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = DirectoryResult<Page<T>>>,
{
    if limit == Some(0) {
        return Ok(Vec::new());
    }
    let mut items = Vec::new();
    let mut token: Option<String> = None;
    let mut pages = 0usize;
    loop {
        let page = fetch(token.take()).await?;
        pages += 1;
        let last = page.is_last();
        items.extend(page.items);

        if let Some(limit) = limit {
            if items.len() >= limit {
                items.truncate(limit);
                log::debug!("Stopped after {} pages at a limit of {} items", pages, limit);
                break;
            }
        }
        if last {
            break;
        }
        token = page.next_token;
    }
    Ok(items)
}

impl DirectoryClient {
    pub async fn list_all_directories(
        &self,
        limit: Option<usize>,
    ) -> DirectoryResult<Vec<DirectoryDescription>> {
        paginate(limit, |token| async move {
            self.list_directories(token.as_deref()).await
        })
        .await
    }

    pub async fn list_all_object_children(
        &self,
        selector: &ObjectSelector,
        limit: Option<usize>,
    ) -> DirectoryResult<Vec<ObjectChild>> {
        paginate(limit, |token| async move {
            self.list_object_children(selector, token.as_deref()).await
        })
        .await
    }

    pub async fn list_all_facet_attributes(
        &self,
        facet_name: &str,
        limit: Option<usize>,
    ) -> DirectoryResult<Vec<Value>> {
        paginate(limit, |token| async move {
            self.list_facet_attributes(facet_name, token.as_deref())
                .await
        })
        .await
    }

    pub async fn list_all_object_attributes(
        &self,
        facet_name: &str,
        selector: &ObjectSelector,
        limit: Option<usize>,
    ) -> DirectoryResult<Vec<AttributeKeyAndValue>> {
        paginate(limit, |token| async move {
            self.list_object_attributes(facet_name, selector, token.as_deref())
                .await
        })
        .await
    }

    pub async fn list_all_incoming_typed_links(
        &self,
        facet_name: Option<&str>,
        selector: &ObjectSelector,
        limit: Option<usize>,
    ) -> DirectoryResult<Vec<TypedLinkSpecifier>> {
        paginate(limit, |token| async move {
            self.list_incoming_typed_links(facet_name, selector, token.as_deref())
                .await
        })
        .await
    }

    pub async fn list_all_outgoing_typed_links(
        &self,
        facet_name: Option<&str>,
        selector: &ObjectSelector,
        limit: Option<usize>,
    ) -> DirectoryResult<Vec<TypedLinkSpecifier>> {
        paginate(limit, |token| async move {
            self.list_outgoing_typed_links(facet_name, selector, token.as_deref())
                .await
        })
        .await
    }
}
