//! Analytics API models.

use serde::{Deserialize, Serialize};

/// Sort key of the top searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderBy {
    /// Number of searches.
    SearchCount,
    /// Click-through rate.
    ClickThroughRate,
    /// Average click position.
    AverageClickPosition,
    /// Conversion rate.
    ConversionRate,
}

impl OrderBy {
    /// Wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SearchCount => "searchCount",
            Self::ClickThroughRate => "clickThroughRate",
            Self::AverageClickPosition => "averageClickPosition",
            Self::ConversionRate => "conversionRate",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl Direction {
    /// Wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Average click position on one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageClickEvent {
    /// Average position.
    pub average: Option<f64>,
    /// Clicks counted.
    pub click_count: u64,
    /// Day, `YYYY-MM-DD`.
    pub date: String,
}

/// Answer to `GET /2/clicks/averageClickPosition`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetAverageClickPositionResponse {
    /// Average position over the period.
    pub average: Option<f64>,
    /// Clicks counted.
    pub click_count: u64,
    /// Per-day breakdown.
    #[serde(default)]
    pub dates: Vec<AverageClickEvent>,
}

/// Clicks within a range of positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickPosition {
    /// Position range, inclusive.
    pub position: Vec<i32>,
    /// Clicks in that range.
    pub click_count: u64,
}

/// Answer to `GET /2/clicks/positions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetClickPositionsResponse {
    /// Position buckets.
    pub positions: Vec<ClickPosition>,
}

/// Click-through rate on one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickThroughRateEvent {
    /// Rate.
    pub rate: Option<f64>,
    /// Clicks.
    pub click_count: u64,
    /// Searches with click analytics.
    pub tracked_search_count: u64,
    /// Day.
    pub date: String,
}

/// Answer to `GET /2/clicks/clickThroughRate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetClickThroughRateResponse {
    /// Rate over the period.
    pub rate: Option<f64>,
    /// Clicks.
    pub click_count: u64,
    /// Searches with click analytics.
    pub tracked_search_count: u64,
    /// Per-day breakdown.
    #[serde(default)]
    pub dates: Vec<ClickThroughRateEvent>,
}

/// Conversion rate on one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRateEvent {
    /// Rate.
    pub rate: Option<f64>,
    /// Searches with click analytics.
    pub tracked_search_count: u64,
    /// Conversions.
    pub conversion_count: u64,
    /// Day.
    pub date: String,
}

/// Answer to `GET /2/conversions/conversionRate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetConversationRateResponse {
    /// Rate over the period.
    pub rate: Option<f64>,
    /// Searches with click analytics.
    pub tracked_search_count: u64,
    /// Conversions.
    pub conversion_count: u64,
    /// Per-day breakdown.
    #[serde(default)]
    pub dates: Vec<ConversionRateEvent>,
}

/// No-click rate on one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoClickRateEvent {
    /// Rate.
    pub rate: Option<f64>,
    /// Searches.
    pub count: u64,
    /// Searches without clicks.
    pub no_click_count: u64,
    /// Day.
    pub date: String,
}

/// Answer to `GET /2/searches/noClickRate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetNoClickRateResponse {
    /// Rate over the period.
    pub rate: Option<f64>,
    /// Searches.
    pub count: u64,
    /// Searches without clicks.
    pub no_click_count: u64,
    /// Per-day breakdown.
    #[serde(default)]
    pub dates: Vec<NoClickRateEvent>,
}

/// No-results rate on one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoResultsRateEvent {
    /// Rate.
    pub rate: Option<f64>,
    /// Searches.
    pub count: u64,
    /// Searches without results.
    pub no_result_count: u64,
    /// Day.
    pub date: String,
}

/// Answer to `GET /2/searches/noResultRate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetNoResultsRateResponse {
    /// Rate over the period.
    pub rate: Option<f64>,
    /// Searches.
    pub count: u64,
    /// Searches without results.
    pub no_result_count: u64,
    /// Per-day breakdown.
    #[serde(default)]
    pub dates: Vec<NoResultsRateEvent>,
}

/// A count on one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCount {
    /// Day.
    pub date: String,
    /// Count.
    pub count: u64,
}

/// Answer to `GET /2/searches/count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSearchesCountResponse {
    /// Searches over the period.
    pub count: u64,
    /// Per-day breakdown.
    #[serde(default)]
    pub dates: Vec<DailyCount>,
}

/// Answer to `GET /2/users/count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetUsersCountResponse {
    /// Users over the period.
    pub count: u64,
    /// Per-day breakdown.
    #[serde(default)]
    pub dates: Vec<DailyCount>,
}

/// A search string with its counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchWithFilterCount {
    /// Search string.
    pub search: String,
    /// Occurrences.
    pub count: u64,
    /// Occurrences with filters applied.
    #[serde(default)]
    pub with_filter_count: u64,
}

/// Answer to `GET /2/searches/noClicks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSearchesNoClicksResponse {
    /// Searches without clicks.
    pub searches: Vec<SearchWithFilterCount>,
}

/// Answer to `GET /2/searches/noResults`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSearchesNoResultsResponse {
    /// Searches without results.
    pub searches: Vec<SearchWithFilterCount>,
}

/// Answer to `GET /2/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetStatusResponse {
    /// Last time the analytics data was updated.
    pub updated_at: Option<String>,
}

/// Searches from one country.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopCountry {
    /// ISO country code.
    pub country: String,
    /// Searches.
    pub count: u64,
}

/// Answer to `GET /2/countries`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetTopCountriesResponse {
    /// Countries by search count.
    pub countries: Vec<TopCountry>,
}

/// A filtered attribute with its count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopFilterAttribute {
    /// Attribute name.
    pub attribute: String,
    /// Occurrences.
    pub count: u64,
}

/// Answer to `GET /2/filters`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetTopFilterAttributesResponse {
    /// Attributes by usage.
    pub attributes: Vec<TopFilterAttribute>,
}

/// A filter value with its count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopFilterValue {
    /// Attribute name.
    pub attribute: String,
    /// Filter operator.
    pub operator: String,
    /// Filter value.
    pub value: String,
    /// Occurrences.
    pub count: u64,
}

/// Answer to `GET /2/filters/{attribute}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetTopFilterForAttributeResponse {
    /// Values by usage.
    pub values: Vec<TopFilterValue>,
}

/// One filter of a filter combination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterValue {
    /// Attribute name.
    pub attribute: String,
    /// Filter operator.
    pub operator: String,
    /// Filter value.
    pub value: String,
}

/// A filter combination that led to no results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FiltersNoResults {
    /// Filters used together.
    pub values: Vec<FilterValue>,
    /// Occurrences.
    pub count: u64,
}

/// Answer to `GET /2/filters/noResults`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetTopFiltersNoResultsResponse {
    /// Filter combinations.
    pub values: Vec<FiltersNoResults>,
}

/// A frequently returned record.
///
/// The rate fields are only present when click analytics was requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopHit {
    /// objectID of the record.
    pub hit: String,
    /// Times returned.
    pub count: u64,
    /// Click-through rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_through_rate: Option<f64>,
    /// Conversion rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_rate: Option<f64>,
    /// Searches with click analytics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracked_search_count: Option<u64>,
    /// Clicks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_count: Option<u64>,
    /// Conversions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_count: Option<u64>,
}

/// Answer to `GET /2/hits`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetTopHitsResponse {
    /// Records by frequency.
    pub hits: Vec<TopHit>,
}

/// A frequent search.
///
/// The rate fields are only present when click analytics was requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopSearch {
    /// Search string.
    pub search: String,
    /// Occurrences.
    pub count: u64,
    /// Average number of hits.
    #[serde(default)]
    pub nb_hits: u64,
    /// Click-through rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_through_rate: Option<f64>,
    /// Average click position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_click_position: Option<f64>,
    /// Conversion rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_rate: Option<f64>,
    /// Searches with click analytics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracked_search_count: Option<u64>,
    /// Clicks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_count: Option<u64>,
    /// Conversions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversion_count: Option<u64>,
}

/// Answer to `GET /2/searches`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetTopSearchesResponse {
    /// Searches by frequency.
    pub searches: Vec<TopSearch>,
}
