//! Operations on a single index.

use crate::batch::{self, BatchIndexingResponse};
use crate::browse::{self, BROWSE_PAGE_SIZE};
use crate::error::{AlgoliaError, Result};
use crate::models::search::{
    Action, BatchOperation, BatchRequest, BatchResponse, GetObjectsResponse, GetTaskResponse,
    HitsResponse, OperationIndexParams, OperationType, ScopeType, SearchForFacetValuesResponse,
    SearchParams, SearchResponse, TaskInfo,
};
use crate::request::{ApiRequest, RequestOptions, encode_segment};
use crate::task::{self, IndexingResponse, IndexingStep, MultiResponse};
use crate::tracker::StatsSnapshot;
use crate::transport::Transport;
use futures::Stream;
use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info};

/// Index resources saved through a batch endpoint of their own.
#[derive(Debug, Clone, Copy)]
enum Resource {
    Synonyms,
    Rules,
}

impl Resource {
    fn segment(self) -> &'static str {
        match self {
            Self::Synonyms => "synonyms",
            Self::Rules => "rules",
        }
    }

    fn replace_flag(self) -> &'static str {
        match self {
            Self::Synonyms => "replaceExistingSynonyms",
            Self::Rules => "clearExistingRules",
        }
    }
}

/// Handle on one index of an application.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    name: String,
    transport: Transport,
    options: Option<RequestOptions>,
}

impl SearchIndex {
    pub(crate) fn new(name: impl Into<String>, transport: Transport) -> Self {
        Self {
            name: name.into(),
            transport,
            options: None,
        }
    }

    /// Copy of this handle that merges `options` into every request.
    #[must_use]
    pub fn with_request_options(&self, options: RequestOptions) -> Self {
        Self {
            options: Some(options),
            ..self.clone()
        }
    }

    /// Index name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Request statistics of the client this index belongs to.
    pub fn stats(&self) -> StatsSnapshot {
        self.transport.stats()
    }

    fn path(&self, suffix: &str) -> String {
        format!("/1/indexes/{}{}", encode_segment(&self.name), suffix)
    }

    fn prepare(&self, request: ApiRequest) -> ApiRequest {
        match &self.options {
            Some(options) => request.with_options(options.clone()),
            None => request,
        }
    }

    /// Add the configured `forwardToReplicas` unless the call sets it.
    fn forwarded(&self, request: ApiRequest) -> ApiRequest {
        let request = self.prepare(request);
        if request.query.iter().any(|(k, _)| k == "forwardToReplicas") {
            return request;
        }
        let forward = self.transport.config().default_forward_to_replicas;
        request.with_opt_query("forwardToReplicas", forward)
    }

    async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        self.transport.execute(request).await
    }

    async fn send_task(&self, request: ApiRequest) -> Result<IndexingResponse> {
        let info: TaskInfo = self.send(request).await?;
        Ok(IndexingResponse::new(self.clone(), info))
    }

    // Search

    /// Search the index.
    pub async fn search<T: DeserializeOwned>(
        &self,
        query: &str,
        params: SearchParams,
    ) -> Result<SearchResponse<T>> {
        let body = serde_json::to_value(params.query(query))?;
        let request = ApiRequest::read(Method::POST, self.path("/query")).with_body(body);
        self.send(self.prepare(request)).await
    }

    /// Search the values of a facet.
    pub async fn search_for_facet_values(
        &self,
        facet: &str,
        facet_query: &str,
        params: SearchParams,
    ) -> Result<SearchForFacetValuesResponse> {
        super::require(facet, "facet", "search_for_facet_values")?;

        let body = serde_json::to_value(params.param("facetQuery", json!(facet_query)))?;
        let path = self.path(&format!("/facets/{}/query", encode_segment(facet)));
        let request = ApiRequest::read(Method::POST, path).with_body(body);
        self.send(self.prepare(request)).await
    }

    // Settings

    /// Fetch the index settings.
    pub async fn get_settings(&self) -> Result<Value> {
        let request =
            ApiRequest::read(Method::GET, self.path("/settings")).with_query("getVersion", 2);
        self.send(self.prepare(request)).await
    }

    /// Replace the given settings.
    pub async fn set_settings(&self, settings: &Value) -> Result<IndexingResponse> {
        let request =
            ApiRequest::write(Method::PUT, self.path("/settings")).with_body(settings.clone());
        self.send_task(self.forwarded(request)).await
    }

    // Records

    /// Fetch one record.
    pub async fn get_object<T: DeserializeOwned>(&self, object_id: &str) -> Result<T> {
        super::require(object_id, "object_id", "get_object")?;

        let path = self.path(&format!("/{}", encode_segment(object_id)));
        self.send(self.prepare(ApiRequest::read(Method::GET, path)))
            .await
    }

    /// Fetch several records in one call.
    ///
    /// Missing records come back as `None` at their position.
    pub async fn get_objects<T: DeserializeOwned>(
        &self,
        object_ids: &[&str],
        attributes_to_retrieve: Option<&[&str]>,
    ) -> Result<GetObjectsResponse<T>> {
        let requests: Vec<Value> = object_ids
            .iter()
            .map(|id| {
                let mut request = json!({"indexName": self.name, "objectID": id});
                if let Some(attributes) = attributes_to_retrieve {
                    request["attributesToRetrieve"] = json!(attributes);
                }
                request
            })
            .collect();

        let request = ApiRequest::read(Method::POST, "/1/indexes/*/objects")
            .with_body(json!({ "requests": requests }));
        self.send(self.prepare(request)).await
    }

    /// Add or replace one record.
    pub async fn save_object<T: Serialize>(&self, object: &T) -> Result<BatchIndexingResponse> {
        self.save_objects(std::slice::from_ref(object)).await
    }

    /// Add or replace records. Every record needs an `objectID`.
    pub async fn save_objects<T: Serialize>(&self, objects: &[T]) -> Result<BatchIndexingResponse> {
        self.split_and_send(Action::UpdateObject, to_values(objects)?)
            .await
    }

    /// Add or replace records whose primary key is the `id_key` attribute.
    ///
    /// The value of `id_key` is copied into `objectID` before the usual
    /// objectID check; records without that attribute keep whatever
    /// `objectID` they already carry.
    pub async fn save_objects_with_id_key<T: Serialize>(
        &self,
        objects: &[T],
        id_key: &str,
    ) -> Result<BatchIndexingResponse> {
        super::require(id_key, "id_key", "save_objects_with_id_key")?;

        let mut objects = to_values(objects)?;
        batch::map_object_ids(&mut objects, id_key);
        self.split_and_send(Action::UpdateObject, objects).await
    }

    /// Add records, letting the engine generate the missing objectIDs.
    pub async fn save_objects_auto_id<T: Serialize>(
        &self,
        objects: &[T],
    ) -> Result<BatchIndexingResponse> {
        self.split_and_send(Action::AddObject, to_values(objects)?)
            .await
    }

    /// Update some attributes of one record.
    pub async fn partial_update_object<T: Serialize>(
        &self,
        object: &T,
        create_if_not_exists: bool,
    ) -> Result<BatchIndexingResponse> {
        self.partial_update_objects(std::slice::from_ref(object), create_if_not_exists)
            .await
    }

    /// Update some attributes of records.
    ///
    /// Unknown objectIDs are skipped unless `create_if_not_exists` is set.
    pub async fn partial_update_objects<T: Serialize>(
        &self,
        objects: &[T],
        create_if_not_exists: bool,
    ) -> Result<BatchIndexingResponse> {
        let action = if create_if_not_exists {
            Action::PartialUpdateObject
        } else {
            Action::PartialUpdateObjectNoCreate
        };
        self.split_and_send(action, to_values(objects)?).await
    }

    /// Delete one record.
    pub async fn delete_object(&self, object_id: &str) -> Result<BatchIndexingResponse> {
        self.delete_objects(&[object_id]).await
    }

    /// Delete records by objectID.
    pub async fn delete_objects(&self, object_ids: &[&str]) -> Result<BatchIndexingResponse> {
        let objects = object_ids.iter().map(|id| json!({ "objectID": id })).collect();
        self.split_and_send(Action::DeleteObject, objects).await
    }

    /// Delete every record matching `filters`.
    pub async fn delete_by(&self, filters: SearchParams) -> Result<IndexingResponse> {
        let body = serde_json::to_value(filters)?;
        let request = ApiRequest::write(Method::POST, self.path("/deleteByQuery")).with_body(body);
        self.send_task(self.prepare(request)).await
    }

    /// Remove every record, keeping settings, synonyms and rules.
    pub async fn clear_objects(&self) -> Result<IndexingResponse> {
        let request = ApiRequest::write(Method::POST, self.path("/clear")).with_body(json!({}));
        self.send_task(self.prepare(request)).await
    }

    /// Send operations as one batch request, without splitting.
    pub async fn batch(&self, operations: Vec<BatchOperation>) -> Result<BatchIndexingResponse> {
        let response = self.send_batch(&BatchRequest {
            requests: operations,
        })
        .await?;
        Ok(BatchIndexingResponse::new(self.clone(), vec![response]))
    }

    async fn send_batch(&self, batch: &BatchRequest) -> Result<BatchResponse> {
        let body = serde_json::to_value(batch)?;
        let request = ApiRequest::write(Method::POST, self.path("/batch")).with_body(body);
        self.send(self.prepare(request)).await
    }

    /// Split `objects` into batches and send them one after another.
    async fn split_and_send(
        &self,
        action: Action,
        objects: Vec<Value>,
    ) -> Result<BatchIndexingResponse> {
        let batch_size = self.transport.config().batch_size;
        let batches = batch::split_into_batches(action, objects, batch_size)?;

        let mut responses = Vec::with_capacity(batches.len());
        for (i, batch) in batches.iter().enumerate() {
            let response = self.send_batch(batch).await?;
            debug!(
                index = %self.name,
                batch = i + 1,
                of = batches.len(),
                task_id = response.task_id,
                "Batch sent"
            );
            responses.push(response);
        }

        Ok(BatchIndexingResponse::new(self.clone(), responses))
    }

    /// Replace every record of the index without downtime.
    ///
    /// The records go to a temporary copy of the index (settings, synonyms
    /// and rules included) which is then moved over this one. With `safe`
    /// each step is published before the next starts.
    pub async fn replace_all_objects<T: Serialize>(
        &self,
        objects: &[T],
        safe: bool,
    ) -> Result<MultiResponse> {
        let tmp_name = format!("{}_tmp_{}", self.name, rand::random::<u32>());
        let tmp = Self {
            name: tmp_name.clone(),
            ..self.clone()
        };
        info!(index = %self.name, tmp = %tmp_name, safe, "Replacing all objects");

        let copy = self
            .copy_to(
                &tmp_name,
                Some(vec![ScopeType::Settings, ScopeType::Synonyms, ScopeType::Rules]),
            )
            .await?;
        if safe {
            copy.wait().await?;
        }

        let saved = tmp.save_objects(objects).await?;
        if safe {
            saved.wait().await?;
        }

        let moved = self.move_from(&tmp_name).await?;
        if safe {
            moved.wait().await?;
        }

        Ok(MultiResponse::new(vec![
            IndexingStep::Single(copy),
            IndexingStep::Batch(saved),
            IndexingStep::Single(moved),
        ]))
    }

    /// Stream every record of the index.
    pub fn browse_objects<T: DeserializeOwned>(
        &self,
        params: SearchParams,
    ) -> impl Stream<Item = Result<T>> {
        let index = self.clone();
        browse::cursor_stream(move |cursor| {
            let index = index.clone();
            let params = params.clone();
            async move { index.browse_page(params, cursor).await }
        })
    }

    async fn browse_page<T: DeserializeOwned>(
        &self,
        params: SearchParams,
        cursor: Option<String>,
    ) -> Result<(Vec<T>, Option<String>)> {
        let mut body = serde_json::to_value(params)?;
        if let (Some(cursor), Some(map)) = (cursor, body.as_object_mut()) {
            map.insert("cursor".to_string(), Value::String(cursor));
        }

        let request = ApiRequest::read(Method::POST, self.path("/browse")).with_body(body);
        let page: SearchResponse<T> = self.send(self.prepare(request)).await?;
        Ok((page.hits, page.cursor))
    }

    // Synonyms

    /// Search synonyms.
    pub async fn search_synonyms(
        &self,
        query: &str,
        params: SearchParams,
    ) -> Result<HitsResponse<Value>> {
        self.search_resource(Resource::Synonyms, params.query(query))
            .await
    }

    /// Fetch one synonym.
    pub async fn get_synonym(&self, object_id: &str) -> Result<Value> {
        self.get_resource(Resource::Synonyms, object_id).await
    }

    /// Add or replace one synonym.
    pub async fn save_synonym<T: Serialize>(&self, synonym: &T) -> Result<IndexingResponse> {
        self.save_resources(Resource::Synonyms, vec![serde_json::to_value(synonym)?], false)
            .await
    }

    /// Add or replace synonyms; `None` when there is nothing to send.
    pub async fn save_synonyms<T: Serialize>(
        &self,
        synonyms: &[T],
    ) -> Result<Option<IndexingResponse>> {
        self.save_resources_if_any(Resource::Synonyms, synonyms, false)
            .await
    }

    /// Replace every synonym of the index.
    pub async fn replace_all_synonyms<T: Serialize>(
        &self,
        synonyms: &[T],
    ) -> Result<Option<IndexingResponse>> {
        self.save_resources_if_any(Resource::Synonyms, synonyms, true)
            .await
    }

    /// Delete one synonym.
    pub async fn delete_synonym(&self, object_id: &str) -> Result<IndexingResponse> {
        self.delete_resource(Resource::Synonyms, object_id).await
    }

    /// Delete every synonym.
    pub async fn clear_synonyms(&self) -> Result<IndexingResponse> {
        self.clear_resource(Resource::Synonyms).await
    }

    /// Stream every synonym of the index.
    pub fn browse_synonyms(&self) -> impl Stream<Item = Result<Value>> {
        self.browse_resource(Resource::Synonyms)
    }

    // Rules

    /// Search rules.
    pub async fn search_rules(
        &self,
        query: &str,
        params: SearchParams,
    ) -> Result<HitsResponse<Value>> {
        self.search_resource(Resource::Rules, params.query(query))
            .await
    }

    /// Fetch one rule.
    pub async fn get_rule(&self, object_id: &str) -> Result<Value> {
        self.get_resource(Resource::Rules, object_id).await
    }

    /// Add or replace one rule.
    pub async fn save_rule<T: Serialize>(&self, rule: &T) -> Result<IndexingResponse> {
        self.save_resources(Resource::Rules, vec![serde_json::to_value(rule)?], false)
            .await
    }

    /// Add or replace rules; `None` when there is nothing to send.
    pub async fn save_rules<T: Serialize>(&self, rules: &[T]) -> Result<Option<IndexingResponse>> {
        self.save_resources_if_any(Resource::Rules, rules, false)
            .await
    }

    /// Replace every rule of the index.
    pub async fn replace_all_rules<T: Serialize>(
        &self,
        rules: &[T],
    ) -> Result<Option<IndexingResponse>> {
        self.save_resources_if_any(Resource::Rules, rules, true)
            .await
    }

    /// Delete one rule.
    pub async fn delete_rule(&self, object_id: &str) -> Result<IndexingResponse> {
        self.delete_resource(Resource::Rules, object_id).await
    }

    /// Delete every rule.
    pub async fn clear_rules(&self) -> Result<IndexingResponse> {
        self.clear_resource(Resource::Rules).await
    }

    /// Stream every rule of the index.
    pub fn browse_rules(&self) -> impl Stream<Item = Result<Value>> {
        self.browse_resource(Resource::Rules)
    }

    async fn search_resource(
        &self,
        resource: Resource,
        params: SearchParams,
    ) -> Result<HitsResponse<Value>> {
        let body = serde_json::to_value(params)?;
        let path = self.path(&format!("/{}/search", resource.segment()));
        let request = ApiRequest::read(Method::POST, path).with_body(body);
        self.send(self.prepare(request)).await
    }

    async fn get_resource(&self, resource: Resource, object_id: &str) -> Result<Value> {
        super::require(object_id, "object_id", "get")?;

        let path = self.path(&format!("/{}/{}", resource.segment(), encode_segment(object_id)));
        self.send(self.prepare(ApiRequest::read(Method::GET, path)))
            .await
    }

    async fn save_resources_if_any<T: Serialize>(
        &self,
        resource: Resource,
        items: &[T],
        replace: bool,
    ) -> Result<Option<IndexingResponse>> {
        if items.is_empty() {
            debug!(index = %self.name, resource = resource.segment(), "Nothing to save");
            return Ok(None);
        }
        self.save_resources(resource, to_values(items)?, replace)
            .await
            .map(Some)
    }

    async fn save_resources(
        &self,
        resource: Resource,
        items: Vec<Value>,
        replace: bool,
    ) -> Result<IndexingResponse> {
        batch::ensure_object_ids(&items)?;

        let path = self.path(&format!("/{}/batch", resource.segment()));
        let mut request = ApiRequest::write(Method::POST, path).with_body(Value::Array(items));
        if replace {
            request = request.with_query(resource.replace_flag(), true);
        }
        self.send_task(self.forwarded(request)).await
    }

    async fn delete_resource(&self, resource: Resource, object_id: &str) -> Result<IndexingResponse> {
        super::require(object_id, "object_id", "delete")?;

        let path = self.path(&format!("/{}/{}", resource.segment(), encode_segment(object_id)));
        self.send_task(self.forwarded(ApiRequest::write(Method::DELETE, path)))
            .await
    }

    async fn clear_resource(&self, resource: Resource) -> Result<IndexingResponse> {
        let path = self.path(&format!("/{}/clear", resource.segment()));
        let request = ApiRequest::write(Method::POST, path).with_body(json!({}));
        self.send_task(self.forwarded(request)).await
    }

    fn browse_resource(&self, resource: Resource) -> impl Stream<Item = Result<Value>> {
        let index = self.clone();
        browse::paged_stream(move |page| {
            let index = index.clone();
            async move {
                let params = SearchParams::new()
                    .page(page)
                    .hits_per_page(BROWSE_PAGE_SIZE);
                let response = index.search_resource(resource, params).await?;
                Ok::<_, AlgoliaError>(response.hits)
            }
        })
    }

    // Tasks

    /// Fetch the status of a task.
    pub async fn get_task(&self, task_id: i64) -> Result<GetTaskResponse> {
        if task_id == 0 {
            return Err(AlgoliaError::InvalidParameter {
                param: "task_id",
                reason: "cannot be 0".to_string(),
            });
        }

        let request = ApiRequest::read(Method::GET, self.path(&format!("/task/{task_id}")));
        self.send(self.prepare(request)).await
    }

    /// Wait until a task is published.
    pub async fn wait_task(&self, task_id: i64) -> Result<()> {
        let config = &self.transport.config().wait;
        task::wait_for_task(task_id, config, move || async move {
            Ok::<_, AlgoliaError>(self.get_task(task_id).await?.status)
        })
        .await
    }

    // Index management

    /// Delete the index.
    pub async fn delete(&self) -> Result<IndexingResponse> {
        let request = ApiRequest::write(Method::DELETE, self.path(""));
        self.send_task(self.prepare(request)).await
    }

    /// Copy this index to `destination`, optionally limited to `scope`.
    pub async fn copy_to(
        &self,
        destination: &str,
        scope: Option<Vec<ScopeType>>,
    ) -> Result<IndexingResponse> {
        self.operation(&self.name, OperationType::Copy, destination, scope)
            .await
    }

    /// Move `source` over this index.
    pub async fn move_from(&self, source: &str) -> Result<IndexingResponse> {
        self.operation(source, OperationType::Move, &self.name, None)
            .await
    }

    async fn operation(
        &self,
        source: &str,
        operation: OperationType,
        destination: &str,
        scope: Option<Vec<ScopeType>>,
    ) -> Result<IndexingResponse> {
        super::require(destination, "destination", "operation")?;

        let body = serde_json::to_value(OperationIndexParams {
            operation,
            destination: destination.to_string(),
            scope,
        })?;
        let path = format!("/1/indexes/{}/operation", encode_segment(source));
        let request = ApiRequest::write(Method::POST, path).with_body(body);
        self.send_task(self.prepare(request)).await
    }

    /// Send an arbitrary request through the failover transport.
    pub async fn custom_request(&self, request: ApiRequest) -> Result<Value> {
        self.transport.execute_value(self.prepare(request)).await
    }
}

fn to_values<T: Serialize>(items: &[T]) -> Result<Vec<Value>> {
    items
        .iter()
        .map(|item| serde_json::to_value(item).map_err(AlgoliaError::Json))
        .collect()
}
