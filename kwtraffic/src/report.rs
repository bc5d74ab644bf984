//! Comma-separated report output.
//!
//! Cells are joined with `,` and written as-is. Values containing commas are not quoted, so such
//! inputs produce lines with extra columns.

use std::io::Write;

use crate::errors::Result;
use crate::fanout::OutputRecord;
use crate::format::ESTIMATE_COLUMNS;

/// Written instead of a group's records when the service returned no campaign estimate.
pub const NO_ESTIMATES_MESSAGE: &str = "No traffic estimates were returned.";

/// Streams report lines to an underlying writer.
pub struct ReportWriter<W: Write> {
    out: W,
    lines: usize,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, lines: 0 }
    }

    /// Write the header: input column names followed by the estimate columns.
    pub fn write_header(&mut self, input_headers: &[String]) -> Result<()> {
        let cells = input_headers.iter().map(String::as_str).chain(ESTIMATE_COLUMNS);
        self.write_line(cells)
    }

    pub fn write_record(&mut self, record: &OutputRecord) -> Result<()> {
        self.write_line(record.cells())
    }

    /// Write a free-text line in place of a group's records.
    pub fn write_message(&mut self, message: &str) -> Result<()> {
        self.write_line(std::iter::once(message))
    }

    /// Flush buffered lines, so a later failure cannot discard groups already reported.
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Lines written so far, header included.
    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line<'a>(&mut self, cells: impl Iterator<Item = &'a str>) -> Result<()> {
        let line = cells.collect::<Vec<_>>().join(",");
        writeln!(self.out, "{line}")?;
        self.lines += 1;
        Ok(())
    }
}
