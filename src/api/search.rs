//! Search API client.

use crate::api::index::SearchIndex;
use crate::cache::ResponseCache;
use crate::config::{ClientConfig, HostConfig};
use crate::error::Result;
use crate::host::Accept;
use crate::models::search::{
    IndexQuery, ListIndicesResponse, MultipleQueriesRequest, MultipleQueriesResponse,
    MultipleQueriesStrategy,
};
use crate::request::ApiRequest;
use crate::tracker::StatsSnapshot;
use crate::transport::Transport;
use rand::seq::SliceRandom;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Client of the Search API.
#[derive(Debug, Clone)]
pub struct SearchClient {
    transport: Transport,
}

impl SearchClient {
    /// Create a client with default settings.
    pub fn new(app_id: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(app_id, api_key))
    }

    /// Create a client from a full configuration.
    ///
    /// Without explicit hosts the application's default cluster is used.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let hosts = if config.hosts.is_empty() {
            Self::default_hosts(&config.app_id)
        } else {
            config.hosts.clone()
        };

        Ok(Self {
            transport: Transport::new(Arc::new(config), hosts)?,
        })
    }

    /// Default cluster of an application.
    ///
    /// The DSN host serves reads, the main host serves writes, and the three
    /// fallback hosts, in random order, serve both.
    pub fn default_hosts(app_id: &str) -> Vec<HostConfig> {
        let mut fallback: Vec<HostConfig> = (1..=3)
            .map(|i| HostConfig::new(format!("{app_id}-{i}.algolianet.com")))
            .collect();
        fallback.shuffle(&mut rand::rng());

        let mut hosts = vec![
            HostConfig::new(format!("{app_id}-dsn.algolia.net")).with_accept(Accept::Read),
            HostConfig::new(format!("{app_id}.algolia.net")).with_accept(Accept::Write),
        ];
        hosts.extend(fallback);
        hosts
    }

    /// Use `cache` for read requests.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.transport = self.transport.with_cache(cache);
        self
    }

    /// Handle on one index.
    pub fn init_index(&self, name: impl Into<String>) -> SearchIndex {
        SearchIndex::new(name, self.transport.clone())
    }

    /// List the indices of the application.
    pub async fn list_indices(&self) -> Result<ListIndicesResponse> {
        self.transport
            .execute(ApiRequest::read(Method::GET, "/1/indexes"))
            .await
    }

    /// Run several queries, possibly on different indices, in one call.
    pub async fn multiple_queries<T: DeserializeOwned>(
        &self,
        queries: Vec<IndexQuery>,
        strategy: MultipleQueriesStrategy,
    ) -> Result<MultipleQueriesResponse<T>> {
        let body = serde_json::to_value(MultipleQueriesRequest {
            requests: queries,
            strategy,
        })?;

        self.transport
            .execute(ApiRequest::read(Method::POST, "/1/indexes/*/queries").with_body(body))
            .await
    }

    /// Send an arbitrary request through the failover transport.
    pub async fn custom_request(&self, request: ApiRequest) -> Result<Value> {
        self.transport.execute_value(request).await
    }

    /// Request statistics of this client.
    pub fn stats(&self) -> StatsSnapshot {
        self.transport.stats()
    }

    /// Underlying transport.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hosts() {
        let hosts = SearchClient::default_hosts("APPID");
        assert_eq!(hosts.len(), 5);
        assert_eq!(hosts[0].url, "APPID-dsn.algolia.net");
        assert_eq!(hosts[0].accept, Accept::Read);
        assert_eq!(hosts[1].url, "APPID.algolia.net");
        assert_eq!(hosts[1].accept, Accept::Write);

        let mut fallback: Vec<_> = hosts[2..].iter().map(|h| h.url.clone()).collect();
        fallback.sort();
        assert_eq!(
            fallback,
            vec![
                "APPID-1.algolianet.com",
                "APPID-2.algolianet.com",
                "APPID-3.algolianet.com"
            ]
        );
        assert!(hosts[2..].iter().all(|h| h.accept == Accept::ReadWrite));
    }

    #[test]
    fn test_rejects_empty_credentials() {
        assert!(SearchClient::new("", "key").is_err());
    }
}
