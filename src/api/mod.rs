//! API clients.
//!
//! Each client owns a [`Transport`](crate::transport::Transport) bound to
//! the host cluster of its API.

pub mod analytics;
pub mod index;
pub mod insights;
pub mod personalization;
pub mod search;

pub use analytics::{AnalyticsClient, AnalyticsParams};
pub use index::SearchIndex;
pub use insights::{InsightsClient, UserInsightsClient};
pub use personalization::PersonalizationClient;
pub use search::SearchClient;

use crate::error::{AlgoliaError, Result};

/// Fail with `MissingParameter` when `value` is empty.
pub(crate) fn require(value: &str, param: &'static str, operation: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        Err(AlgoliaError::MissingParameter { param, operation })
    } else {
        Ok(())
    }
}
