//! Common type definitions for the input table.
//!
//! This module defines:
//! - [`MatchType`]: the keyword match strictness sent to the estimation service
//! - [`CampaignId`]: the grouping key read from the `campaign_id` column
//! - [`InputRow`] and [`InputTable`]: the immutable rows read from the input file
//!
//! Rows keep every source field in column order so they can be echoed verbatim into the report,
//! alongside the three parsed fields the estimation engine needs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How strictly a keyword must match a search query.
///
/// Parsing is case-insensitive; the canonical (serialized and displayed) form is uppercase, which is
/// what the estimation service expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchType {
    Broad,
    Phrase,
    Exact,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchType::Broad => "BROAD",
            MatchType::Phrase => "PHRASE",
            MatchType::Exact => "EXACT",
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a `match_type` cell is not one of the known match types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown match type '{0}' (expected BROAD, PHRASE or EXACT)")]
pub struct UnknownMatchType(pub String);

impl FromStr for MatchType {
    type Err = UnknownMatchType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BROAD" => Ok(MatchType::Broad),
            "PHRASE" => Ok(MatchType::Phrase),
            "EXACT" => Ok(MatchType::Exact),
            _ => Err(UnknownMatchType(s.to_string())),
        }
    }
}

/// Campaign identifier, kept as the raw cell text.
///
/// Ids are compared exactly as written in the input; `"1"` and `"01"` are different campaigns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CampaignId(pub String);

impl fmt::Display for CampaignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CampaignId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One record of the input table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRow {
    /// Every cell of the source record, in header order
    pub fields: Vec<String>,
    /// Keyword text, taken verbatim (case and whitespace are significant)
    pub keyword: String,
    pub match_type: MatchType,
    pub campaign_id: CampaignId,
}

impl InputRow {
    /// Build a row whose only fields are the three required columns, in the order
    /// `keyword, match_type, campaign_id`.
    pub fn new(keyword: impl Into<String>, match_type: MatchType, campaign_id: impl Into<String>) -> Self {
        let keyword = keyword.into();
        let campaign_id = campaign_id.into();
        Self {
            fields: vec![keyword.clone(), match_type.to_string(), campaign_id.clone()],
            keyword,
            match_type,
            campaign_id: CampaignId(campaign_id),
        }
    }
}

/// The parsed input file: header names plus rows, both in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputTable {
    pub headers: Vec<String>,
    pub rows: Vec<InputRow>,
}
