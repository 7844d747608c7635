//! Personalization API client.

use crate::config::{ClientConfig, HostConfig, Region};
use crate::error::{AlgoliaError, Result};
use crate::models::personalization::{
    DeleteUserProfileResponse, GetUserTokenResponse, PersonalizationStrategy,
    SetPersonalizationStrategyResponse,
};
use crate::request::{ApiRequest, encode_segment};
use crate::transport::Transport;
use reqwest::Method;
use std::sync::Arc;

const REGIONS: &[Region] = &[Region::Us, Region::Eu];

/// Client of the Personalization API.
#[derive(Debug, Clone)]
pub struct PersonalizationClient {
    transport: Transport,
}

impl PersonalizationClient {
    /// Create a client for `region`.
    pub fn new(
        app_id: impl Into<String>,
        api_key: impl Into<String>,
        region: Region,
    ) -> Result<Self> {
        Self::with_config(ClientConfig::new(app_id, api_key).with_region(region))
    }

    /// Create a client from a full configuration; a region is required.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let hosts = if config.hosts.is_empty() {
            let region = config.region.ok_or_else(|| {
                AlgoliaError::InvalidConfig(
                    "the Personalization API needs a region (us or eu)".to_string(),
                )
            })?;
            Self::default_hosts(region)?
        } else {
            config.hosts.clone()
        };

        Ok(Self {
            transport: Transport::new(Arc::new(config), hosts)?,
        })
    }

    /// Host of the Personalization API in `region`.
    pub fn default_hosts(region: Region) -> Result<Vec<HostConfig>> {
        let region = region.ensure_allowed(REGIONS)?;
        Ok(vec![HostConfig::new(format!(
            "personalization.{region}.algolia.com"
        ))])
    }

    /// Delete the profile of a user.
    pub async fn delete_user_profile(&self, user_token: &str) -> Result<DeleteUserProfileResponse> {
        super::require(user_token, "user_token", "delete_user_profile")?;

        let path = format!("/1/profiles/{}", encode_segment(user_token));
        self.transport
            .execute(ApiRequest::write(Method::DELETE, path))
            .await
    }

    /// Fetch the strategy of the application.
    pub async fn get_personalization_strategy(&self) -> Result<PersonalizationStrategy> {
        self.transport
            .execute(ApiRequest::read(Method::GET, "/1/strategies/personalization"))
            .await
    }

    /// Fetch the profile of a user.
    pub async fn get_user_token_profile(&self, user_token: &str) -> Result<GetUserTokenResponse> {
        super::require(user_token, "user_token", "get_user_token_profile")?;

        let path = format!("/1/profiles/personalization/{}", encode_segment(user_token));
        self.transport
            .execute(ApiRequest::read(Method::GET, path))
            .await
    }

    /// Replace the strategy of the application.
    pub async fn set_personalization_strategy(
        &self,
        strategy: &PersonalizationStrategy,
    ) -> Result<SetPersonalizationStrategyResponse> {
        let body = serde_json::to_value(strategy)?;
        self.transport
            .execute(ApiRequest::write(Method::POST, "/1/strategies/personalization").with_body(body))
            .await
    }

    /// Underlying transport.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }
}
