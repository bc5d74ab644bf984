//! Wire model of the traffic estimator service.
//!
//! The request side is the selector (campaign → ad group → keyword estimate requests). The response side
//! mirrors the same nesting; only the keyword estimates of the first ad group of the first campaign are
//! used by the report. Every estimate field is optional because the service omits whatever it declined
//! to compute.

use serde::{Deserialize, Serialize};

use crate::dedup::DedupKey;
use crate::types::MatchType;

/// An amount in micro-units (millionths of the account currency).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub micro_amount: Option<i64>,
}

impl Money {
    pub fn micros(micro_amount: i64) -> Self {
        Self {
            micro_amount: Some(micro_amount),
        }
    }
}

/// One bound (minimum or maximum) of a keyword estimate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsEstimate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_cpc: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_position: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clicks_per_day: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impressions_per_day: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<Money>,
}

/// Estimate for a single keyword request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KeywordEstimate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<StatsEstimate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<StatsEstimate>,
}

// ============================================================================
// Selector (request body)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyword {
    pub xsi_type: &'static str,
    pub text: String,
    pub match_type: MatchType,
}

impl From<&DedupKey> for Keyword {
    fn from(key: &DedupKey) -> Self {
        Self {
            xsi_type: "Keyword",
            text: key.text.clone(),
            match_type: key.match_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordEstimateRequest {
    pub keyword: Keyword,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdGroupEstimateRequest {
    pub keyword_estimate_requests: Vec<KeywordEstimateRequest>,
    pub max_cpc: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignEstimateRequest {
    pub ad_group_estimate_requests: Vec<AdGroupEstimateRequest>,
}

/// Body of one `TrafficEstimatorService.get` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficEstimatorSelector {
    pub campaign_estimate_requests: Vec<CampaignEstimateRequest>,
    pub platform_estimate_requested: bool,
}

impl TrafficEstimatorSelector {
    /// Wrap an ordered keyword batch in a single campaign / single ad group selector.
    pub fn for_keywords(keywords: &[DedupKey], max_cpc_micros: i64, platform_estimate_requested: bool) -> Self {
        let keyword_estimate_requests = keywords
            .iter()
            .map(|key| KeywordEstimateRequest { keyword: key.into() })
            .collect();

        Self {
            campaign_estimate_requests: vec![CampaignEstimateRequest {
                ad_group_estimate_requests: vec![AdGroupEstimateRequest {
                    keyword_estimate_requests,
                    max_cpc: Money::micros(max_cpc_micros),
                }],
            }],
            platform_estimate_requested,
        }
    }
}

// ============================================================================
// Response
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdGroupEstimate {
    #[serde(default)]
    pub keyword_estimates: Vec<KeywordEstimate>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub platform_name: String,
}

/// Per-device breakdown, present only when `platformEstimateRequested` was set.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformEstimate {
    #[serde(default)]
    pub platform: Platform,
    #[serde(default)]
    pub min_estimate: Option<StatsEstimate>,
    #[serde(default)]
    pub max_estimate: Option<StatsEstimate>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignEstimate {
    #[serde(default)]
    pub ad_group_estimates: Vec<AdGroupEstimate>,
    #[serde(default)]
    pub platform_estimates: Vec<PlatformEstimate>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficEstimatorResult {
    #[serde(default)]
    pub campaign_estimates: Vec<CampaignEstimate>,
}

impl TrafficEstimatorResult {
    /// The first campaign estimate, or `None` when the service produced nothing at all.
    pub fn first_campaign(&self) -> Option<&CampaignEstimate> {
        self.campaign_estimates.first()
    }
}

impl CampaignEstimate {
    /// Keyword estimates of the first ad group, in submission order.
    ///
    /// A campaign estimate without ad groups yields an empty slice; the caller's count check turns that
    /// into a contract violation.
    pub fn keyword_estimates(&self) -> &[KeywordEstimate] {
        self.ad_group_estimates
            .first()
            .map(|group| group.keyword_estimates.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_selector_serializes_service_nesting() {
        let keys = vec![
            DedupKey::new("shoes", MatchType::Broad),
            DedupKey::new("boots", MatchType::Exact),
        ];
        let selector = TrafficEstimatorSelector::for_keywords(&keys, 1_000_000, true);

        assert_eq!(
            serde_json::to_value(&selector).unwrap(),
            json!({
                "campaignEstimateRequests": [{
                    "adGroupEstimateRequests": [{
                        "keywordEstimateRequests": [
                            {"keyword": {"xsiType": "Keyword", "text": "shoes", "matchType": "BROAD"}},
                            {"keyword": {"xsiType": "Keyword", "text": "boots", "matchType": "EXACT"}}
                        ],
                        "maxCpc": {"microAmount": 1000000}
                    }]
                }],
                "platformEstimateRequested": true
            })
        );
    }

    #[test]
    fn test_result_keeps_absent_and_empty_distinct() {
        let result: TrafficEstimatorResult = serde_json::from_value(json!({
            "campaignEstimates": [{
                "adGroupEstimates": [{
                    "keywordEstimates": [
                        {"min": {"averageCpc": {}, "clicksPerDay": 1.5}, "max": {"averageCpc": {"microAmount": 2500000}}},
                        {}
                    ]
                }]
            }]
        }))
        .unwrap();

        let estimates = result.first_campaign().unwrap().keyword_estimates();
        assert_eq!(estimates.len(), 2);

        let min = estimates[0].min.as_ref().unwrap();
        assert_eq!(min.average_cpc, Some(Money { micro_amount: None }));
        assert_eq!(min.total_cost, None);
        assert_eq!(min.clicks_per_day, Some(1.5));
        assert_eq!(estimates[0].max.as_ref().unwrap().average_cpc, Some(Money::micros(2_500_000)));

        assert_eq!(estimates[1], KeywordEstimate::default());
    }

    #[test]
    fn test_missing_ad_groups_yield_no_keyword_estimates() {
        let result: TrafficEstimatorResult =
            serde_json::from_value(json!({"campaignEstimates": [{"platformEstimates": []}]})).unwrap();
        assert!(result.first_campaign().unwrap().keyword_estimates().is_empty());

        let empty: TrafficEstimatorResult = serde_json::from_value(json!({})).unwrap();
        assert!(empty.first_campaign().is_none());
    }
}
