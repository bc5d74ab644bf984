//! # kwtraffic: keyword traffic estimate reports
//!
//! `kwtraffic` reads a table of keywords, each tagged with a match type and a campaign id, asks a traffic
//! estimator service how each keyword would perform, and prints the table back with ten estimate columns
//! appended.
//!
//! ## How a run works
//!
//! Rows are grouped by campaign id ([`grouping`]), groups in order of first appearance. Each group sends
//! exactly one request to the estimator. Before sending, repeated `(keyword, match type)` pairs are
//! collapsed ([`dedup`]) so the service is asked about every pair once; the plan built there remembers
//! which rows asked for which pair. The service answers positionally, so its estimates are paired with the
//! submitted keywords and checked for a matching count ([`fanout::PairedEstimates`]) before being copied
//! back to every row that asked for them, in the group's original row order ([`fanout::fan_out`]).
//! Values are rendered by [`format`] and written line by line by [`report`].
//!
//! Any failure stops the run. Groups already written stay in the output.
//!
//! ## Example
//!
//! ```ignore
//! use kwtraffic::{Config, ReportRunner, ReportWriter, ReqwestTrafficEstimator, input};
//!
//! let table = input::read_table(&args.input)?;
//! let estimator = ReqwestTrafficEstimator::new(&config.api)?;
//! let runner = ReportRunner::new(estimator, config.estimate.clone());
//!
//! let mut report = ReportWriter::new(std::io::stdout().lock());
//! runner.run(&table, &mut report, &mut std::io::stderr()).await?;
//! ```

pub mod client;
pub mod config;
pub mod dedup;
pub mod errors;
pub mod estimate;
pub mod fanout;
pub mod format;
pub mod grouping;
pub mod input;
pub mod report;
pub mod runner;
pub mod telemetry;
pub mod types;

#[cfg(test)]
mod test;

pub use client::{ReqwestTrafficEstimator, TrafficEstimator};
pub use config::{Args, Config};
pub use errors::{Error, Result};
pub use report::ReportWriter;
pub use runner::{ReportRunner, RunSummary};
