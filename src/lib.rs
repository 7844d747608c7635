//! # Algolia client
//!
//! Async client for the Algolia Search, Analytics, Personalization and
//! Insights REST APIs.
//!
//! Every API is served by a cluster of hosts. Calls go to the best ranked
//! host and fail over to the next one on network errors, timeouts and 5xx
//! answers; hosts that failed stay deprioritized for a cooldown window.
//!
//! ## Features
//!
//! - **Host Failover**: Read/write aware host ranking with growing timeouts
//! - **Batch Splitting**: Large record lists are sent in fixed-size batches
//! - **Browsing**: Records, synonyms and rules as async streams
//! - **Task Polling**: Wait until indexing tasks are published
//! - **Rate Limiting**: Optional client-side request throttling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use algolia_client::{SearchClient, SearchParams};
//! use serde_json::{Value, json};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SearchClient::new("YourApplicationID", "YourAdminAPIKey")?;
//!     let index = client.init_index("products");
//!
//!     index
//!         .save_objects(&[json!({"objectID": "1", "name": "Running shoes"})])
//!         .await?
//!         .wait()
//!         .await?;
//!
//!     let results = index
//!         .search::<Value>("shoes", SearchParams::new().hits_per_page(5))
//!         .await?;
//!     println!("{} hits", results.nb_hits);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! Clients are built from a [`ClientConfig`], which can be loaded from a
//! JSON file or from the `ALGOLIA_APP_ID` and `ALGOLIA_API_KEY`
//! environment variables.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod batch;
pub mod browse;
pub mod cache;
pub mod config;
pub mod error;
pub mod host;
pub mod importer;
pub mod models;
pub mod request;
pub mod task;
pub mod tracker;
pub mod transport;

// Re-exports for convenience
pub use api::{
    AnalyticsClient, AnalyticsParams, InsightsClient, PersonalizationClient, SearchClient,
    SearchIndex, UserInsightsClient,
};
pub use batch::BatchIndexingResponse;
pub use cache::{NullCache, ResponseCache};
pub use config::{Args, ClientConfig, Command, HostConfig, Region, TimeoutConfig, WaitConfig};
pub use error::{AlgoliaError, Result};
pub use host::{Accept, CallType, HostRanker, Outcome, StatefulHost};
pub use importer::{ExportResult, ImportOptions, ImportResult, Importer};
pub use models::search::{Action, SearchParams, SearchResponse};
pub use request::{ApiRequest, RequestOptions};
pub use task::{IndexingResponse, IndexingStep, MultiResponse};
pub use tracker::{StatsSnapshot, StatsTracker};
pub use transport::Transport;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
