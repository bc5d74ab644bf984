//! Keyword deduplication within one campaign group.
//!
//! A campaign group can reference the same `(keyword, match type)` pair many times. Only the first
//! occurrence becomes a request to the estimation service; [`RequestPlan`] remembers which rows asked for
//! each request so the answer can be copied back to all of them.

use indexmap::IndexMap;

use crate::types::{InputRow, MatchType};

/// Identity of an estimation request.
///
/// Keyword text is compared exactly, case included: `shoes` and `SHOES` are two requests. Only the match
/// type is case-normalized, which happens when it is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub text: String,
    pub match_type: MatchType,
}

impl DedupKey {
    pub fn new(text: impl Into<String>, match_type: MatchType) -> Self {
        Self {
            text: text.into(),
            match_type,
        }
    }
}

impl From<&InputRow> for DedupKey {
    fn from(row: &InputRow) -> Self {
        Self::new(row.keyword.clone(), row.match_type)
    }
}

/// Unique requests of a group and the rows that share each of them.
///
/// Iteration order is submission order (first occurrence of each key in the group). Row positions are
/// indices into the group's row slice, ascending within each key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestPlan {
    rows_by_key: IndexMap<DedupKey, Vec<usize>>,
    row_count: usize,
}

impl RequestPlan {
    /// Build the plan in a single pass over the group's rows.
    pub fn build<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a InputRow>,
    {
        let mut rows_by_key: IndexMap<DedupKey, Vec<usize>> = IndexMap::new();
        let mut row_count = 0;
        for (position, row) in rows.into_iter().enumerate() {
            rows_by_key.entry(DedupKey::from(row)).or_default().push(position);
            row_count += 1;
        }
        Self { rows_by_key, row_count }
    }

    /// Keys to submit, in submission order.
    pub fn requests(&self) -> Vec<DedupKey> {
        self.rows_by_key.keys().cloned().collect()
    }

    /// Number of unique requests.
    pub fn len(&self) -> usize {
        self.rows_by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows_by_key.is_empty()
    }

    /// Number of group rows the plan covers.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Row positions that asked for `key`.
    pub fn rows_for(&self, key: &DedupKey) -> Option<&[usize]> {
        self.rows_by_key.get(key).map(Vec::as_slice)
    }

    /// `(key, row positions)` in submission order.
    pub fn iter(&self) -> impl Iterator<Item = (&DedupKey, &[usize])> {
        self.rows_by_key.iter().map(|(key, rows)| (key, rows.as_slice()))
    }
}
