//! Insights API client.
//!
//! Events are sent in requests of at most [`MAX_EVENTS_PER_REQUEST`].

use crate::batch;
use crate::config::{ClientConfig, HostConfig, Region};
use crate::error::{AlgoliaError, Result};
use crate::models::insights::{EventType, InsightEvent, InsightEvents, PushEventsResponse};
use crate::request::ApiRequest;
use crate::transport::Transport;
use reqwest::Method;
use std::sync::Arc;
use tracing::debug;

/// Largest number of events accepted in one request.
pub const MAX_EVENTS_PER_REQUEST: usize = 1000;

const REGIONS: &[Region] = &[Region::Us, Region::De];

/// Client of the Insights API.
#[derive(Debug, Clone)]
pub struct InsightsClient {
    transport: Transport,
}

impl InsightsClient {
    /// Create a client for the `us` region.
    pub fn new(app_id: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(app_id, api_key))
    }

    /// Create a client from a full configuration; the region defaults to `us`.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let hosts = if config.hosts.is_empty() {
            Self::default_hosts(config.region.unwrap_or(Region::Us))?
        } else {
            config.hosts.clone()
        };

        Ok(Self {
            transport: Transport::new(Arc::new(config), hosts)?,
        })
    }

    /// Host of the Insights API in `region`.
    pub fn default_hosts(region: Region) -> Result<Vec<HostConfig>> {
        let region = region.ensure_allowed(REGIONS)?;
        Ok(vec![HostConfig::new(format!("insights.{region}.algolia.io"))])
    }

    /// Helper sending events on behalf of one user.
    pub fn user(&self, user_token: impl Into<String>) -> UserInsightsClient {
        UserInsightsClient {
            client: self.clone(),
            user_token: user_token.into(),
        }
    }

    /// Send one event.
    pub async fn send_event(&self, event: InsightEvent) -> Result<PushEventsResponse> {
        self.push_events(vec![event])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AlgoliaError::InvalidResponse {
                message: "no answer for the event".to_string(),
            })
    }

    /// Send events, one request per [`MAX_EVENTS_PER_REQUEST`] events.
    ///
    /// Every event is checked before the first request goes out.
    pub async fn push_events(&self, events: Vec<InsightEvent>) -> Result<Vec<PushEventsResponse>> {
        for event in &events {
            validate_event(event)?;
        }

        let chunks = batch::chunked(events, MAX_EVENTS_PER_REQUEST)?;
        let mut responses = Vec::with_capacity(chunks.len());
        for (i, events) in chunks.into_iter().enumerate() {
            let count = events.len();
            let body = serde_json::to_value(InsightEvents { events })?;
            let response: PushEventsResponse = self
                .transport
                .execute(ApiRequest::write(Method::POST, "/1/events").with_body(body))
                .await?;
            debug!(chunk = i + 1, events = count, status = response.status, "Pushed events");
            responses.push(response);
        }

        Ok(responses)
    }

    /// Underlying transport.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }
}

fn validate_event(event: &InsightEvent) -> Result<()> {
    super::require(&event.event_name, "event_name", "push_events")?;
    super::require(&event.index, "index", "push_events")?;
    super::require(&event.user_token, "user_token", "push_events")
}

/// Insights client bound to a user token.
#[derive(Debug, Clone)]
pub struct UserInsightsClient {
    client: InsightsClient,
    user_token: String,
}

impl UserInsightsClient {
    fn event(&self, event_type: EventType, event_name: &str, index: &str) -> InsightEvent {
        InsightEvent::new(event_type, event_name, index, self.user_token.as_str())
    }

    async fn with_object_ids(
        &self,
        mut event: InsightEvent,
        object_ids: &[&str],
    ) -> Result<PushEventsResponse> {
        event.object_ids = Some(object_ids.iter().map(ToString::to_string).collect());
        self.client.send_event(event).await
    }

    async fn with_filters(
        &self,
        mut event: InsightEvent,
        filters: &[&str],
    ) -> Result<PushEventsResponse> {
        event.filters = Some(filters.iter().map(ToString::to_string).collect());
        self.client.send_event(event).await
    }

    /// User token of the events.
    pub fn user_token(&self) -> &str {
        &self.user_token
    }

    /// The user clicked records.
    pub async fn clicked_object_ids(
        &self,
        event_name: &str,
        index: &str,
        object_ids: &[&str],
    ) -> Result<PushEventsResponse> {
        let event = self.event(EventType::Click, event_name, index);
        self.with_object_ids(event, object_ids).await
    }

    /// The user clicked records at `positions` of a search result.
    pub async fn clicked_object_ids_after_search(
        &self,
        event_name: &str,
        index: &str,
        object_ids: &[&str],
        positions: &[u32],
        query_id: &str,
    ) -> Result<PushEventsResponse> {
        if positions.len() != object_ids.len() {
            return Err(AlgoliaError::InvalidParameter {
                param: "positions",
                reason: format!(
                    "{} positions for {} objectIDs",
                    positions.len(),
                    object_ids.len()
                ),
            });
        }
        super::require(query_id, "query_id", "clicked_object_ids_after_search")?;

        let mut event = self.event(EventType::Click, event_name, index);
        event.positions = Some(positions.to_vec());
        event.query_id = Some(query_id.to_string());
        self.with_object_ids(event, object_ids).await
    }

    /// The user clicked filters.
    pub async fn clicked_filters(
        &self,
        event_name: &str,
        index: &str,
        filters: &[&str],
    ) -> Result<PushEventsResponse> {
        let event = self.event(EventType::Click, event_name, index);
        self.with_filters(event, filters).await
    }

    /// The user converted on records.
    pub async fn converted_object_ids(
        &self,
        event_name: &str,
        index: &str,
        object_ids: &[&str],
    ) -> Result<PushEventsResponse> {
        let event = self.event(EventType::Conversion, event_name, index);
        self.with_object_ids(event, object_ids).await
    }

    /// The user converted on records found by a search.
    pub async fn converted_object_ids_after_search(
        &self,
        event_name: &str,
        index: &str,
        object_ids: &[&str],
        query_id: &str,
    ) -> Result<PushEventsResponse> {
        super::require(query_id, "query_id", "converted_object_ids_after_search")?;

        let mut event = self.event(EventType::Conversion, event_name, index);
        event.query_id = Some(query_id.to_string());
        self.with_object_ids(event, object_ids).await
    }

    /// The user converted after using filters.
    pub async fn converted_filters(
        &self,
        event_name: &str,
        index: &str,
        filters: &[&str],
    ) -> Result<PushEventsResponse> {
        let event = self.event(EventType::Conversion, event_name, index);
        self.with_filters(event, filters).await
    }

    /// The user viewed records.
    pub async fn viewed_object_ids(
        &self,
        event_name: &str,
        index: &str,
        object_ids: &[&str],
    ) -> Result<PushEventsResponse> {
        let event = self.event(EventType::View, event_name, index);
        self.with_object_ids(event, object_ids).await
    }

    /// The user viewed filters.
    pub async fn viewed_filters(
        &self,
        event_name: &str,
        index: &str,
        filters: &[&str],
    ) -> Result<PushEventsResponse> {
        let event = self.event(EventType::View, event_name, index);
        self.with_filters(event, filters).await
    }
}
