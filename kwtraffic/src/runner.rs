//! Report generation: group, deduplicate, estimate, fan out, emit.
//!
//! Groups are processed strictly one after another and each group makes exactly one estimator call.
//! Report lines are flushed after every group, so when a later group fails the lines of earlier groups
//! have already been delivered.

use std::io::Write;

use tracing::{debug, info, instrument, warn};

use crate::client::TrafficEstimator;
use crate::config::EstimateConfig;
use crate::dedup::RequestPlan;
use crate::errors::{Error, Result};
use crate::estimate::TrafficEstimatorSelector;
use crate::fanout::{OutputRecord, PairedEstimates, fan_out};
use crate::grouping::group_by_campaign;
use crate::report::{NO_ESTIMATES_MESSAGE, ReportWriter};
use crate::types::{CampaignId, InputRow, InputTable};

/// Totals for a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Campaign groups processed
    pub groups: usize,
    /// Report lines written, header excluded
    pub rows: usize,
    /// Unique keyword requests sent to the estimator
    pub requests: usize,
    /// Groups the estimator answered without any campaign estimate
    pub skipped: usize,
}

/// Result of estimating one campaign group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupOutcome {
    /// The group's records in row order, or `None` when the service returned no campaign estimate
    pub records: Option<Vec<OutputRecord>>,
    /// Unique keywords requested for the group
    pub requests: usize,
}

pub struct ReportRunner<E> {
    estimator: E,
    estimate: EstimateConfig,
}

impl<E: TrafficEstimator> ReportRunner<E> {
    pub fn new(estimator: E, estimate: EstimateConfig) -> Self {
        Self { estimator, estimate }
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    /// Write the full report for `table`.
    ///
    /// `report` receives the header and one line per input row (or one message line for a group the
    /// service returned nothing for); `diag` receives progress lines (the
    /// group count, then `index<TAB>campaign_id` before each group). The first error aborts the run.
    pub async fn run<W: Write, D: Write>(
        &self,
        table: &InputTable,
        report: &mut ReportWriter<W>,
        diag: &mut D,
    ) -> Result<RunSummary> {
        let groups = group_by_campaign(&table.rows);
        writeln!(diag, "{}", groups.len())?;
        info!(groups = groups.len(), rows = table.rows.len(), "Starting traffic estimate report");

        report.write_header(&table.headers)?;
        report.flush()?;

        let mut summary = RunSummary::default();
        for (index, (campaign_id, rows)) in groups.iter().enumerate() {
            writeln!(diag, "{index}\t{campaign_id}")?;
            diag.flush()?;

            let outcome = self.estimate_group(campaign_id, rows).await?;
            match &outcome.records {
                Some(records) => {
                    for record in records {
                        report.write_record(record)?;
                    }
                    summary.rows += records.len();
                }
                None => {
                    warn!(campaign_id = %campaign_id, "No traffic estimates were returned");
                    report.write_message(NO_ESTIMATES_MESSAGE)?;
                    summary.skipped += 1;
                }
            }
            report.flush()?;

            summary.groups += 1;
            summary.requests += outcome.requests;
        }

        info!(
            groups = summary.groups,
            rows = summary.rows,
            requests = summary.requests,
            skipped = summary.skipped,
            "Traffic estimate report complete"
        );
        Ok(summary)
    }

    /// Estimate one campaign group with a single estimator call.
    ///
    /// A response without any campaign estimate is not an error: the outcome carries no records and the
    /// run moves on to the next group.
    #[instrument(skip(self, campaign_id, rows), fields(campaign_id = %campaign_id, rows = rows.len()))]
    pub async fn estimate_group(&self, campaign_id: &CampaignId, rows: &[&InputRow]) -> Result<GroupOutcome> {
        let plan = RequestPlan::build(rows.iter().copied());
        if plan.is_empty() {
            return Ok(GroupOutcome {
                records: Some(Vec::new()),
                requests: 0,
            });
        }

        let limit = self.estimate.max_keywords_per_request;
        if plan.len() > limit {
            return Err(Error::BatchTooLarge { size: plan.len(), limit });
        }

        let requests = plan.requests();
        debug!(unique_keywords = requests.len(), "Requesting traffic estimates");

        let selector = TrafficEstimatorSelector::for_keywords(
            &requests,
            self.estimate.max_cpc_micros,
            self.estimate.platform_estimate_requested,
        );
        let result = self.estimator.estimate(&selector).await?;

        let request_count = requests.len();
        let Some(campaign) = result.first_campaign() else {
            return Ok(GroupOutcome {
                records: None,
                requests: request_count,
            });
        };
        if !campaign.platform_estimates.is_empty() {
            debug!(platforms = campaign.platform_estimates.len(), "Ignoring per-platform estimates");
        }

        let paired = PairedEstimates::new(requests, campaign.keyword_estimates().to_vec())?;
        let records = fan_out(rows, &plan, &paired)?;
        Ok(GroupOutcome {
            records: Some(records),
            requests: request_count,
        })
    }
}
