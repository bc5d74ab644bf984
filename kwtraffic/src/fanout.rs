//! Re-association of estimates with the rows that requested them.
//!
//! The estimation service answers positionally: estimate `i` belongs to request `i`. [`PairedEstimates`]
//! is the only place that assumption is checked; everything downstream works on explicit
//! `(request, estimate)` pairs.

use crate::dedup::{DedupKey, RequestPlan};
use crate::errors::{Error, Result};
use crate::estimate::KeywordEstimate;
use crate::format::estimate_cells;
use crate::types::InputRow;

/// Requests zipped with the estimates returned for them, same length and same order by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedEstimates {
    pairs: Vec<(DedupKey, KeywordEstimate)>,
}

impl PairedEstimates {
    /// Pair submitted requests with returned estimates.
    ///
    /// A count mismatch is a broken contract with the service and fails the whole group; nothing is
    /// truncated or padded.
    pub fn new(requests: Vec<DedupKey>, estimates: Vec<KeywordEstimate>) -> Result<Self> {
        if requests.len() != estimates.len() {
            return Err(Error::ContractViolation {
                requested: requests.len(),
                returned: estimates.len(),
            });
        }
        Ok(Self {
            pairs: requests.into_iter().zip(estimates).collect(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DedupKey, &KeywordEstimate)> {
        self.pairs.iter().map(|(key, estimate)| (key, estimate))
    }
}

/// One report line: the row's own cells followed by the ten estimate cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRecord {
    pub fields: Vec<String>,
    pub estimate: [String; 10],
}

impl OutputRecord {
    pub fn cells(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().chain(self.estimate.iter()).map(String::as_str)
    }
}

/// Expand paired estimates back over every row of the group, in original row order.
///
/// `rows` must be the slice the plan was built from. Each estimate is formatted once and copied to all
/// rows that share its request.
pub fn fan_out(rows: &[&InputRow], plan: &RequestPlan, paired: &PairedEstimates) -> Result<Vec<OutputRecord>> {
    if plan.row_count() != rows.len() {
        return Err(Error::Other(anyhow::anyhow!(
            "request plan covers {} rows but the group has {}",
            plan.row_count(),
            rows.len()
        )));
    }

    let mut slots: Vec<Option<OutputRecord>> = vec![None; rows.len()];

    for (key, estimate) in paired.iter() {
        let positions = plan.rows_for(key).ok_or_else(|| {
            Error::Other(anyhow::anyhow!(
                "estimate returned for keyword '{}' ({}) which was never requested",
                key.text,
                key.match_type
            ))
        })?;

        let cells = estimate_cells(estimate);
        for &position in positions {
            slots[position] = Some(OutputRecord {
                fields: rows[position].fields.clone(),
                estimate: cells.clone(),
            });
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(position, slot)| {
            slot.ok_or_else(|| Error::Other(anyhow::anyhow!("no estimate was paired with group row {position}")))
        })
        .collect()
}
