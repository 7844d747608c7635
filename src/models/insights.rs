//! Insights API models.

use serde::{Deserialize, Serialize};

/// Kind of user event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// The user clicked something.
    Click,
    /// The user converted.
    Conversion,
    /// The user viewed something.
    View,
}

/// One user event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightEvent {
    /// Kind of event.
    pub event_type: EventType,
    /// Free-form name, e.g. "Product Clicked".
    pub event_name: String,
    /// Index the event relates to.
    pub index: String,
    /// Pseudonymous user identifier.
    pub user_token: String,
    /// Unix time in milliseconds; the server time is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// Search the event follows.
    #[serde(rename = "queryID", default, skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
    /// Records involved.
    #[serde(rename = "objectIDs", default, skip_serializing_if = "Option::is_none")]
    pub object_ids: Option<Vec<String>>,
    /// Filters involved, as `attribute:value`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<String>>,
    /// Positions of the clicked records, 1-based.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positions: Option<Vec<u32>>,
}

impl InsightEvent {
    /// Event with only the required fields.
    pub fn new(
        event_type: EventType,
        event_name: impl Into<String>,
        index: impl Into<String>,
        user_token: impl Into<String>,
    ) -> Self {
        Self {
            event_type,
            event_name: event_name.into(),
            index: index.into(),
            user_token: user_token.into(),
            timestamp: None,
            query_id: None,
            object_ids: None,
            filters: None,
            positions: None,
        }
    }
}

/// Body of `POST /1/events`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightEvents {
    /// Events to record.
    pub events: Vec<InsightEvent>,
}

/// Answer to `POST /1/events`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushEventsResponse {
    /// Status message.
    pub message: String,
    /// HTTP-like status code.
    pub status: u16,
}
