//! Iteration over every record, synonym or rule of an index.
//!
//! Records are walked with the browse cursor; synonyms and rules have no
//! cursor and are paged through their search endpoints instead.

use crate::error::{AlgoliaError, Result};
use futures::stream::{self, Stream, TryStreamExt};
use serde_json::Value;
use std::future::Future;

/// Page size used when paging synonyms and rules.
pub const BROWSE_PAGE_SIZE: u32 = 1000;

/// Position of a cursor walk.
enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Stream items of cursor-linked pages.
///
/// `fetch` receives the cursor of the previous page (none for the first)
/// and returns the page items and the next cursor.
pub fn cursor_stream<T, F, Fut>(fetch: F) -> impl Stream<Item = Result<T>>
where
    F: Fn(Option<String>) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Option<String>)>>,
{
    stream::try_unfold(Cursor::Start, move |state| {
        let request = match state {
            Cursor::Start => Some(fetch(None)),
            Cursor::Next(cursor) => Some(fetch(Some(cursor))),
            Cursor::Done => None,
        };

        async move {
            let Some(request) = request else {
                return Ok(None);
            };
            let (items, cursor) = request.await?;
            let next = cursor.map_or(Cursor::Done, Cursor::Next);
            Ok::<_, AlgoliaError>(Some((items, next)))
        }
    })
    .map_ok(|items| stream::iter(items.into_iter().map(Ok::<T, AlgoliaError>)))
    .try_flatten()
}

/// Stream hits of numbered pages of [`BROWSE_PAGE_SIZE`] hits.
///
/// Paging stops at the first short page. `_highlightResult` is removed
/// from every hit.
pub fn paged_stream<F, Fut>(fetch: F) -> impl Stream<Item = Result<Value>>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = Result<Vec<Value>>>,
{
    stream::try_unfold(Some(0u32), move |page| {
        let request = page.map(|p| (p, fetch(p)));

        async move {
            let Some((page, request)) = request else {
                return Ok(None);
            };
            let mut hits = request.await?;
            let next = (hits.len() >= BROWSE_PAGE_SIZE as usize).then_some(page + 1);
            for hit in &mut hits {
                if let Some(object) = hit.as_object_mut() {
                    object.remove("_highlightResult");
                }
            }
            Ok::<_, AlgoliaError>(Some((hits, next)))
        }
    })
    .map_ok(|hits| stream::iter(hits.into_iter().map(Ok::<Value, AlgoliaError>)))
    .try_flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_cursor_stream_follows_cursors() {
        let items: Vec<u32> = cursor_stream(|cursor| async move {
            Ok(match cursor.as_deref() {
                None => (vec![1, 2], Some("c1".to_string())),
                Some("c1") => (vec![3], Some("c2".to_string())),
                _ => (vec![4], None),
            })
        })
        .try_collect()
        .await
        .unwrap();

        assert_eq!(items, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_paged_stream_stops_on_short_page() {
        let hits: Vec<Value> = paged_stream(|page| async move {
            let count = if page < 2 { BROWSE_PAGE_SIZE } else { 3 };
            Ok((0..count)
                .map(|i| json!({"objectID": format!("{page}-{i}"), "_highlightResult": {}}))
                .collect())
        })
        .try_collect()
        .await
        .unwrap();

        assert_eq!(hits.len(), 2 * BROWSE_PAGE_SIZE as usize + 3);
        assert!(hits.iter().all(|h| h.get("_highlightResult").is_none()));
    }

    #[tokio::test]
    async fn test_error_ends_stream() {
        let result: Result<Vec<u32>> = cursor_stream(|_| async {
            Err::<(Vec<u32>, Option<String>), _>(AlgoliaError::InvalidResponse {
                message: "boom".to_string(),
            })
        })
        .try_collect()
        .await;

        assert!(result.is_err());
    }
}
