//! Analytics API client.

use crate::config::{ClientConfig, HostConfig, Region};
use crate::error::{AlgoliaError, Result};
use crate::models::analytics::{
    Direction, GetAverageClickPositionResponse, GetClickPositionsResponse,
    GetClickThroughRateResponse, GetConversationRateResponse, GetNoClickRateResponse,
    GetNoResultsRateResponse, GetSearchesCountResponse, GetSearchesNoClicksResponse,
    GetSearchesNoResultsResponse, GetStatusResponse, GetTopCountriesResponse,
    GetTopFilterAttributesResponse, GetTopFilterForAttributeResponse,
    GetTopFiltersNoResultsResponse, GetTopHitsResponse, GetTopSearchesResponse,
    GetUsersCountResponse, OrderBy,
};
use crate::request::{ApiRequest, encode_segment};
use crate::transport::Transport;
use chrono::NaiveDate;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

const REGIONS: &[Region] = &[Region::Us, Region::De];

/// Query parameters shared by the analytics endpoints.
///
/// Each endpoint only sends the parameters it understands.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsParams {
    /// Index to report on.
    pub index: String,
    /// First day, inclusive.
    pub start_date: Option<NaiveDate>,
    /// Last day, inclusive.
    pub end_date: Option<NaiveDate>,
    /// Analytics tags filter expression.
    pub tags: Option<String>,
    /// Restrict to searches matching this query.
    pub search: Option<String>,
    /// Include click and conversion metrics.
    pub click_analytics: Option<bool>,
    /// Sort key of the top searches.
    pub order_by: Option<OrderBy>,
    /// Sort direction of the top searches.
    pub direction: Option<Direction>,
    /// Number of items to return.
    pub limit: u32,
    /// Position of the first item.
    pub offset: u32,
}

impl AnalyticsParams {
    /// Parameters for `index` with default paging.
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            start_date: None,
            end_date: None,
            tags: None,
            search: None,
            click_analytics: None,
            order_by: None,
            direction: None,
            limit: 10,
            offset: 0,
        }
    }

    /// Restrict to a date range.
    #[must_use]
    pub fn dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    /// Filter on analytics tags.
    #[must_use]
    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// Restrict to searches matching `search`.
    #[must_use]
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Include click and conversion metrics.
    #[must_use]
    pub fn click_analytics(mut self, enabled: bool) -> Self {
        self.click_analytics = Some(enabled);
        self
    }

    /// Sort the top searches.
    #[must_use]
    pub fn order(mut self, order_by: OrderBy, direction: Direction) -> Self {
        self.order_by = Some(order_by);
        self.direction = Some(direction);
        self
    }

    /// Set the page window.
    #[must_use]
    pub fn page(mut self, limit: u32, offset: u32) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }

    fn validate(&self, operation: &'static str) -> Result<()> {
        super::require(&self.index, "index", operation)?;

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(AlgoliaError::InvalidParameter {
                    param: "start_date",
                    reason: format!("{start} is after end date {end}"),
                });
            }
        }
        Ok(())
    }
}

/// Parameter groups an endpoint accepts besides index, dates and tags.
#[derive(Debug, Clone, Copy, Default)]
struct Accepts {
    paging: bool,
    search: bool,
    click_analytics: bool,
    ordering: bool,
}

const DATED: Accepts = Accepts {
    paging: false,
    search: false,
    click_analytics: false,
    ordering: false,
};

const PAGED: Accepts = Accepts {
    paging: true,
    ..DATED
};

const FILTERED: Accepts = Accepts {
    search: true,
    ..PAGED
};

/// Client of the Analytics API.
#[derive(Debug, Clone)]
pub struct AnalyticsClient {
    transport: Transport,
}

impl AnalyticsClient {
    /// Create a client for `region`, or for the global host without one.
    pub fn new(
        app_id: impl Into<String>,
        api_key: impl Into<String>,
        region: Option<Region>,
    ) -> Result<Self> {
        let mut config = ClientConfig::new(app_id, api_key);
        config.region = region;
        Self::with_config(config)
    }

    /// Create a client from a full configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let hosts = if config.hosts.is_empty() {
            Self::default_hosts(config.region)?
        } else {
            config.hosts.clone()
        };

        Ok(Self {
            transport: Transport::new(Arc::new(config), hosts)?,
        })
    }

    /// Host of the Analytics API in `region`.
    pub fn default_hosts(region: Option<Region>) -> Result<Vec<HostConfig>> {
        let host = match region {
            Some(region) => format!("analytics.{}.algolia.com", region.ensure_allowed(REGIONS)?),
            None => "analytics.algolia.com".to_string(),
        };
        Ok(vec![HostConfig::new(host)])
    }

    /// Underlying transport.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    fn request(
        path: impl Into<String>,
        params: &AnalyticsParams,
        accepts: Accepts,
        operation: &'static str,
    ) -> Result<ApiRequest> {
        params.validate(operation)?;

        let mut request = ApiRequest::read(Method::GET, path)
            .with_query("index", &params.index)
            .with_opt_query("startDate", params.start_date.map(|d| d.format("%Y-%m-%d")))
            .with_opt_query("endDate", params.end_date.map(|d| d.format("%Y-%m-%d")));

        if accepts.search {
            request = request.with_opt_query("search", params.search.as_ref());
        }
        if accepts.click_analytics {
            request = request.with_opt_query("clickAnalytics", params.click_analytics);
        }
        if accepts.ordering {
            request = request
                .with_opt_query("orderBy", params.order_by.map(OrderBy::as_str))
                .with_opt_query("direction", params.direction.map(Direction::as_str));
        }
        if accepts.paging {
            request = request
                .with_query("limit", params.limit)
                .with_query("offset", params.offset);
        }

        Ok(request.with_opt_query("tags", params.tags.as_ref()))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &AnalyticsParams,
        accepts: Accepts,
        operation: &'static str,
    ) -> Result<T> {
        let request = Self::request(path, params, accepts, operation)?;
        self.transport.execute(request).await
    }

    /// Average position of clicks, per day.
    pub async fn get_average_click_position(
        &self,
        params: &AnalyticsParams,
    ) -> Result<GetAverageClickPositionResponse> {
        self.fetch("/2/clicks/averageClickPosition", params, DATED, "get_average_click_position")
            .await
    }

    /// Distribution of clicks over result positions.
    pub async fn get_click_positions(
        &self,
        params: &AnalyticsParams,
    ) -> Result<GetClickPositionsResponse> {
        self.fetch("/2/clicks/positions", params, DATED, "get_click_positions")
            .await
    }

    /// Click-through rate, per day.
    pub async fn get_click_through_rate(
        &self,
        params: &AnalyticsParams,
    ) -> Result<GetClickThroughRateResponse> {
        self.fetch("/2/clicks/clickThroughRate", params, DATED, "get_click_through_rate")
            .await
    }

    /// Conversion rate, per day.
    pub async fn get_conversation_rate(
        &self,
        params: &AnalyticsParams,
    ) -> Result<GetConversationRateResponse> {
        self.fetch("/2/conversions/conversionRate", params, DATED, "get_conversation_rate")
            .await
    }

    /// Share of searches without a click, per day.
    pub async fn get_no_click_rate(
        &self,
        params: &AnalyticsParams,
    ) -> Result<GetNoClickRateResponse> {
        self.fetch("/2/searches/noClickRate", params, DATED, "get_no_click_rate")
            .await
    }

    /// Share of searches without results, per day.
    pub async fn get_no_results_rate(
        &self,
        params: &AnalyticsParams,
    ) -> Result<GetNoResultsRateResponse> {
        self.fetch("/2/searches/noResultRate", params, DATED, "get_no_results_rate")
            .await
    }

    /// Number of searches, per day.
    pub async fn get_searches_count(
        &self,
        params: &AnalyticsParams,
    ) -> Result<GetSearchesCountResponse> {
        self.fetch("/2/searches/count", params, DATED, "get_searches_count")
            .await
    }

    /// Top searches without clicks.
    pub async fn get_searches_no_clicks(
        &self,
        params: &AnalyticsParams,
    ) -> Result<GetSearchesNoClicksResponse> {
        self.fetch("/2/searches/noClicks", params, PAGED, "get_searches_no_clicks")
            .await
    }

    /// Top searches without results.
    pub async fn get_searches_no_results(
        &self,
        params: &AnalyticsParams,
    ) -> Result<GetSearchesNoResultsResponse> {
        self.fetch("/2/searches/noResults", params, PAGED, "get_searches_no_results")
            .await
    }

    /// Time of the last analytics update of `index`.
    pub async fn get_status(&self, index: &str) -> Result<GetStatusResponse> {
        super::require(index, "index", "get_status")?;

        let request = ApiRequest::read(Method::GET, "/2/status").with_query("index", index);
        self.transport.execute(request).await
    }

    /// Countries with the most searches.
    pub async fn get_top_countries(
        &self,
        params: &AnalyticsParams,
    ) -> Result<GetTopCountriesResponse> {
        self.fetch("/2/countries", params, PAGED, "get_top_countries")
            .await
    }

    /// Most used filter attributes.
    pub async fn get_top_filter_attributes(
        &self,
        params: &AnalyticsParams,
    ) -> Result<GetTopFilterAttributesResponse> {
        self.fetch("/2/filters", params, FILTERED, "get_top_filter_attributes")
            .await
    }

    /// Most used values of one filter attribute.
    pub async fn get_top_filter_for_attribute(
        &self,
        attribute: &str,
        params: &AnalyticsParams,
    ) -> Result<GetTopFilterForAttributeResponse> {
        super::require(attribute, "attribute", "get_top_filter_for_attribute")?;

        let path = format!("/2/filters/{}", encode_segment(attribute));
        self.fetch(&path, params, FILTERED, "get_top_filter_for_attribute")
            .await
    }

    /// Most used filters of searches without results.
    pub async fn get_top_filters_no_results(
        &self,
        params: &AnalyticsParams,
    ) -> Result<GetTopFiltersNoResultsResponse> {
        self.fetch("/2/filters/noResults", params, FILTERED, "get_top_filters_no_results")
            .await
    }

    /// Most returned hits.
    pub async fn get_top_hits(&self, params: &AnalyticsParams) -> Result<GetTopHitsResponse> {
        let accepts = Accepts {
            click_analytics: true,
            ..FILTERED
        };
        self.fetch("/2/hits", params, accepts, "get_top_hits").await
    }

    /// Most frequent searches.
    pub async fn get_top_searches(
        &self,
        params: &AnalyticsParams,
    ) -> Result<GetTopSearchesResponse> {
        let accepts = Accepts {
            click_analytics: true,
            ordering: true,
            ..PAGED
        };
        self.fetch("/2/searches", params, accepts, "get_top_searches")
            .await
    }

    /// Number of distinct users, per day.
    pub async fn get_users_count(&self, params: &AnalyticsParams) -> Result<GetUsersCountResponse> {
        self.fetch("/2/users/count", params, DATED, "get_users_count")
            .await
    }

    /// Send a DELETE to `/1{path}`.
    pub async fn del(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.generic(Method::DELETE, path, params, None).await
    }

    /// Send a GET to `/1{path}`.
    pub async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        self.generic(Method::GET, path, params, None).await
    }

    /// Send a POST to `/1{path}`.
    pub async fn post(
        &self,
        path: &str,
        params: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<Value> {
        self.generic(Method::POST, path, params, body).await
    }

    /// Send a PUT to `/1{path}`.
    pub async fn put(
        &self,
        path: &str,
        params: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<Value> {
        self.generic(Method::PUT, path, params, body).await
    }

    async fn generic(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<Value> {
        self.transport
            .execute_value(generic_request(method, path, params, body)?)
            .await
    }
}

fn generic_request(
    method: Method,
    path: &str,
    params: &[(&str, &str)],
    body: Option<Value>,
) -> Result<ApiRequest> {
    super::require(path, "path", "custom analytics request")?;

    let path = if path.starts_with('/') {
        format!("/1{path}")
    } else {
        format!("/1/{path}")
    };
    let mut request = if method == Method::GET {
        ApiRequest::read(method, path)
    } else {
        ApiRequest::write(method, path)
    };
    for (name, value) in params {
        request = request.with_query(name, value);
    }
    if let Some(body) = body {
        request = request.with_body(body);
    }
    Ok(request)
}
