//! Input table loading.
//!
//! Uses the `csv` crate so quoted cells with embedded commas or newlines are read correctly. The header
//! row is kept verbatim for the report; only the `keyword`, `match_type` and `campaign_id` columns are
//! interpreted.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, instrument};

use crate::errors::{Error, Result};
use crate::types::{CampaignId, InputRow, InputTable, MatchType};

pub const KEYWORD_COLUMN: &str = "keyword";
pub const MATCH_TYPE_COLUMN: &str = "match_type";
pub const CAMPAIGN_ID_COLUMN: &str = "campaign_id";

/// Positions of the required columns within a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    keyword: usize,
    match_type: usize,
    campaign_id: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self> {
        Ok(Self {
            keyword: find_column(headers, KEYWORD_COLUMN)?,
            match_type: find_column(headers, MATCH_TYPE_COLUMN)?,
            campaign_id: find_column(headers, CAMPAIGN_ID_COLUMN)?,
        })
    }
}

/// Normalize a header the way spreadsheet exports tend to vary it: `Campaign ID` → `campaign_id`.
fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace([' ', '-'], "_")
}

/// Find `name` by exact match first, then by normalized match.
fn find_column(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .or_else(|| headers.iter().position(|h| normalize_header(h) == name))
        .ok_or_else(|| Error::Input {
            message: format!(
                "missing required column '{}' (found: {})",
                name,
                headers.iter().collect::<Vec<_>>().join(", ")
            ),
        })
}

/// Read an input table from a CSV file on disk.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_table(path: &Path) -> Result<InputTable> {
    let file = File::open(path).map_err(|e| Error::Input {
        message: format!("cannot open {}: {}", path.display(), e),
    })?;
    read_table_from(BufReader::new(file))
}

/// Read an input table from any CSV source.
pub fn read_table_from<R: Read>(source: R) -> Result<InputTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false) // rows must have as many cells as the header
        .from_reader(source);

    let header_record = reader.headers()?.clone();
    if header_record.is_empty() {
        return Err(Error::Input {
            message: "input has no header row".to_string(),
        });
    }
    let columns = Columns::locate(&header_record)?;
    let headers: Vec<String> = header_record.iter().map(String::from).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let match_type_cell = &record[columns.match_type];
        let match_type: MatchType = match_type_cell.parse().map_err(|e| Error::Input {
            message: format!("line {line}: {e}"),
        })?;

        rows.push(InputRow {
            fields: record.iter().map(String::from).collect(),
            keyword: record[columns.keyword].to_string(),
            match_type,
            campaign_id: CampaignId(record[columns.campaign_id].to_string()),
        });
    }

    debug!(columns = headers.len(), rows = rows.len(), "Read input table");
    Ok(InputTable { headers, rows })
}
