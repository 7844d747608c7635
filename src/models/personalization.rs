//! Personalization API models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Weight of an insights event in the strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventScoring {
    /// Score between 1 and 100.
    pub score: i32,
    /// Event name, as sent to Insights.
    pub event_name: String,
    /// Event type, as sent to Insights.
    pub event_type: String,
}

/// Weight of a facet in the strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetScoring {
    /// Score between 1 and 100.
    pub score: i32,
    /// Facet attribute.
    pub facet_name: String,
}

/// Personalization strategy of an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizationStrategy {
    /// Event weights.
    pub event_scoring: Vec<EventScoring>,
    /// Facet weights.
    pub facet_scoring: Vec<FacetScoring>,
    /// Overall impact, 0 to 100.
    pub personalization_impact: i32,
}

/// Answer to `POST /1/strategies/personalization`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetPersonalizationStrategyResponse {
    /// Confirmation message.
    pub message: String,
}

/// Answer to `DELETE /1/profiles/{userToken}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUserProfileResponse {
    /// Deleted user.
    pub user_token: String,
    /// Date until which the profile may still be served.
    pub deleted_until: String,
}

/// Answer to `GET /1/profiles/personalization/{userToken}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUserTokenResponse {
    /// User.
    pub user_token: String,
    /// Time of the last event taken into account.
    pub last_event_at: String,
    /// Facet scores of the profile.
    pub scores: Value,
}
