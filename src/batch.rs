//! Batch splitting for indexing operations.
//!
//! Large record lists are cut into fixed-size batch requests before they
//! are sent, and the per-batch answers are folded back into one
//! [`BatchIndexingResponse`].

use crate::api::SearchIndex;
use crate::error::{AlgoliaError, Result};
use crate::models::search::{Action, BatchOperation, BatchRequest, BatchResponse};
use serde_json::Value;
use tracing::debug;

/// Check that every record carries an `objectID`.
pub fn ensure_object_ids(objects: &[Value]) -> Result<()> {
    match objects.iter().position(|o| !has_object_id(o)) {
        Some(position) => Err(AlgoliaError::MissingObjectId { position }),
        None => Ok(()),
    }
}

fn has_object_id(object: &Value) -> bool {
    match object.get("objectID") {
        Some(Value::String(id)) => !id.is_empty(),
        Some(Value::Number(_)) => true,
        _ => false,
    }
}

/// Copy the `key` attribute of each record into its `objectID`.
///
/// Records without `key` are left as they are.
pub fn map_object_ids(objects: &mut [Value], key: &str) {
    for object in objects {
        let Some(map) = object.as_object_mut() else {
            continue;
        };
        if let Some(id) = map.get(key).cloned() {
            map.insert("objectID".to_string(), id);
        }
    }
}

/// Cut `items` into chunks of at most `size`, keeping their order.
pub fn chunked<T>(items: Vec<T>, size: usize) -> Result<Vec<Vec<T>>> {
    if size == 0 {
        return Err(AlgoliaError::InvalidParameter {
            param: "batch_size",
            reason: "must be greater than 0".to_string(),
        });
    }

    let mut chunks = Vec::with_capacity(items.len().div_ceil(size));
    let mut current = Vec::with_capacity(size.min(items.len()));
    for item in items {
        current.push(item);
        if current.len() == size {
            chunks.push(std::mem::replace(&mut current, Vec::with_capacity(size)));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    Ok(chunks)
}

/// Turn records into batch requests of at most `batch_size` operations.
///
/// Every action that addresses an existing record needs an `objectID` on
/// each record; the check covers the whole list before anything is built.
pub fn split_into_batches(
    action: Action,
    objects: Vec<Value>,
    batch_size: usize,
) -> Result<Vec<BatchRequest>> {
    if action.requires_object_id() {
        ensure_object_ids(&objects)?;
    }

    let batches: Vec<BatchRequest> = chunked(objects, batch_size)?
        .into_iter()
        .map(|chunk| BatchRequest {
            requests: chunk
                .into_iter()
                .map(|body| BatchOperation { action, body })
                .collect(),
        })
        .collect();

    debug!(action = %action, batches = batches.len(), batch_size, "Split records into batches");
    Ok(batches)
}

/// Aggregated answer of several batch requests on one index.
#[derive(Debug, Clone)]
pub struct BatchIndexingResponse {
    index: SearchIndex,
    responses: Vec<BatchResponse>,
}

impl BatchIndexingResponse {
    pub(crate) fn new(index: SearchIndex, responses: Vec<BatchResponse>) -> Self {
        Self { index, responses }
    }

    /// Per-batch answers, in submission order.
    pub fn responses(&self) -> &[BatchResponse] {
        &self.responses
    }

    /// Whether no request was sent.
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Task of every batch, in submission order.
    pub fn task_ids(&self) -> Vec<i64> {
        self.responses.iter().map(|r| r.task_id).collect()
    }

    /// objectIDs of every record, in submission order.
    pub fn object_ids(&self) -> Vec<String> {
        self.responses
            .iter()
            .flat_map(|r| r.object_ids.iter().cloned())
            .collect()
    }

    /// Wait until every batch is published.
    pub async fn wait(&self) -> Result<()> {
        for response in &self.responses {
            self.index.wait_task(response.task_id).await?;
        }
        Ok(())
    }
}
