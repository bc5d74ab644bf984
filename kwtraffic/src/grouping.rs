//! Stable grouping of input rows by campaign.

use indexmap::IndexMap;

use crate::types::{CampaignId, InputRow};

/// Partition `rows` by campaign id.
///
/// Campaigns appear in order of first occurrence and each group keeps the relative input order of its
/// rows. Every row lands in exactly one group.
pub fn group_by_campaign(rows: &[InputRow]) -> IndexMap<CampaignId, Vec<&InputRow>> {
    let mut groups: IndexMap<CampaignId, Vec<&InputRow>> = IndexMap::new();
    for row in rows {
        groups.entry(row.campaign_id.clone()).or_default().push(row);
    }
    groups
}
