//! Search API models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Type of a batch operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    /// Add a record, letting the engine generate its objectID.
    AddObject,
    /// Add or replace a record.
    UpdateObject,
    /// Update some attributes, creating the record if needed.
    PartialUpdateObject,
    /// Update some attributes of an existing record only.
    PartialUpdateObjectNoCreate,
    /// Delete a record by objectID.
    DeleteObject,
    /// Delete the index.
    Delete,
    /// Remove every record of the index.
    Clear,
}

impl Action {
    /// Wire name of the action.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AddObject => "addObject",
            Self::UpdateObject => "updateObject",
            Self::PartialUpdateObject => "partialUpdateObject",
            Self::PartialUpdateObjectNoCreate => "partialUpdateObjectNoCreate",
            Self::DeleteObject => "deleteObject",
            Self::Delete => "delete",
            Self::Clear => "clear",
        }
    }

    /// Whether records sent with this action need an objectID.
    #[must_use]
    pub fn requires_object_id(self) -> bool {
        !matches!(self, Self::AddObject | Self::Delete | Self::Clear)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One operation of a batch request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOperation {
    /// What to do.
    pub action: Action,
    /// Record (or `{objectID}` for deletes).
    pub body: Value,
}

/// Body of `POST /1/indexes/{index}/batch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Operations in order.
    pub requests: Vec<BatchOperation>,
}

/// Answer to a batch request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    /// Task to wait on.
    #[serde(rename = "taskID")]
    pub task_id: i64,
    /// Records touched, in request order.
    #[serde(rename = "objectIDs", default)]
    pub object_ids: Vec<String>,
}

/// Answer to a write that returns a single task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    /// Task to wait on.
    #[serde(rename = "taskID")]
    pub task_id: i64,
    /// Update timestamp, for writes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Deletion timestamp, for deletes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
    /// Object touched, when there is exactly one.
    #[serde(rename = "objectID", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
}

/// Publication state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    /// Applied and visible to searches.
    Published,
    /// Still pending.
    NotPublished,
}

/// Answer to `GET /1/indexes/{index}/task/{taskID}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTaskResponse {
    /// Current state.
    pub status: TaskStatus,
    /// Whether the index still has pending tasks.
    #[serde(default)]
    pub pending_task: bool,
}

/// Search parameters.
///
/// Only the common parameters are typed; anything else goes in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Query string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    /// Filter expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<String>,
    /// Facet filters, as accepted by the engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet_filters: Option<Value>,
    /// Facets to compute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facets: Option<Vec<String>>,
    /// Page to fetch, 0-based.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Hits per page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hits_per_page: Option<u32>,
    /// Attributes returned with each hit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes_to_retrieve: Option<Vec<String>>,
    /// Return a queryID for click analytics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_analytics: Option<bool>,
    /// Tags attached to the search in analytics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics_tags: Option<Vec<String>>,
    /// User token for personalization and analytics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_token: Option<String>,
    /// Any other parameter.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchParams {
    /// Empty parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the query string.
    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Set the filter expression.
    #[must_use]
    pub fn filters(mut self, filters: impl Into<String>) -> Self {
        self.filters = Some(filters.into());
        self
    }

    /// Set the page.
    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Set the number of hits per page.
    #[must_use]
    pub fn hits_per_page(mut self, hits: u32) -> Self {
        self.hits_per_page = Some(hits);
        self
    }

    /// Ask for a queryID.
    #[must_use]
    pub fn click_analytics(mut self, enabled: bool) -> Self {
        self.click_analytics = Some(enabled);
        self
    }

    /// Set any other parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: Value) -> Self {
        self.extra.insert(name.into(), value);
        self
    }
}

/// Answer to a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse<T> {
    /// Matching records.
    pub hits: Vec<T>,
    /// Total number of matches.
    #[serde(default)]
    pub nb_hits: u64,
    /// Current page.
    #[serde(default)]
    pub page: u32,
    /// Number of pages.
    #[serde(default)]
    pub nb_pages: u32,
    /// Hits per page.
    #[serde(default)]
    pub hits_per_page: u32,
    /// Server processing time.
    #[serde(rename = "processingTimeMS", default)]
    pub processing_time_ms: u64,
    /// Echoed query.
    #[serde(default)]
    pub query: String,
    /// Echoed parameters, URL-encoded.
    #[serde(default)]
    pub params: String,
    /// Identifier for click analytics.
    #[serde(rename = "queryID", default, skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
    /// Facet counts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facets: Option<HashMap<String, HashMap<String, u64>>>,
    /// Cursor for browse requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// One query of a multi-index search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexQuery {
    /// Target index.
    pub index_name: String,
    /// Parameters of the query.
    #[serde(flatten)]
    pub params: SearchParams,
}

/// Strategy of a multi-index search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MultipleQueriesStrategy {
    /// Run every query.
    #[default]
    None,
    /// Stop once enough hits were found.
    StopIfEnoughMatches,
}

/// Body of a multi-index search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultipleQueriesRequest {
    /// Queries to run.
    pub requests: Vec<IndexQuery>,
    /// Execution strategy.
    pub strategy: MultipleQueriesStrategy,
}

/// Answer to a multi-index search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultipleQueriesResponse<T> {
    /// One result per query.
    pub results: Vec<SearchResponse<T>>,
}

/// One facet value match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacetHit {
    /// Facet value.
    pub value: String,
    /// Highlighted value.
    #[serde(default)]
    pub highlighted: String,
    /// Records with this value.
    pub count: u64,
}

/// Answer to a facet value search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchForFacetValuesResponse {
    /// Matching values.
    pub facet_hits: Vec<FacetHit>,
    /// Whether counts are exhaustive.
    #[serde(default)]
    pub exhaustive_facets_count: bool,
    /// Server processing time.
    #[serde(rename = "processingTimeMS", default)]
    pub processing_time_ms: u64,
}

/// Answer to a multi-get.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetObjectsResponse<T> {
    /// Records in request order; missing ones are `None`.
    pub results: Vec<Option<T>>,
}

/// Metadata of one index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexInfo {
    /// Index name.
    pub name: String,
    /// Creation time.
    #[serde(default)]
    pub created_at: String,
    /// Last update time.
    #[serde(default)]
    pub updated_at: String,
    /// Number of records.
    #[serde(default)]
    pub entries: u64,
    /// Size of the data in bytes.
    #[serde(default)]
    pub data_size: u64,
    /// Size of the files in bytes.
    #[serde(default)]
    pub file_size: u64,
    /// Pending tasks.
    #[serde(default)]
    pub number_of_pending_tasks: u64,
    /// Whether a task is pending.
    #[serde(default)]
    pub pending_task: bool,
    /// Primary index, for replicas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    /// Replicas, for primaries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<Vec<String>>,
}

/// Answer to `GET /1/indexes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListIndicesResponse {
    /// Indices of the application.
    pub items: Vec<IndexInfo>,
    /// Number of pages.
    #[serde(default)]
    pub nb_pages: u32,
}

/// Index operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationType {
    /// Copy an index.
    Copy,
    /// Move (rename) an index.
    Move,
}

/// What an index copy includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScopeType {
    /// Index settings.
    Settings,
    /// Synonyms.
    Synonyms,
    /// Rules.
    Rules,
}

/// Body of `POST /1/indexes/{index}/operation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationIndexParams {
    /// Copy or move.
    pub operation: OperationType,
    /// Destination index.
    pub destination: String,
    /// Restrict a copy to these resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<Vec<ScopeType>>,
}

/// Page of synonym or rule search hits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitsResponse<T> {
    /// Matching items.
    pub hits: Vec<T>,
    /// Total number of matches.
    #[serde(default)]
    pub nb_hits: u64,
}
