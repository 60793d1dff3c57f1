//! Reshaping of raw spreadsheet grids into grouped records.
//!
//! `normalize` names the columns and builds one record per data row;
//! `group_by_column` buckets those records by one column's value.

pub mod cell;
pub mod group;
pub mod normalize;

pub use cell::CellValue;
pub use group::group_by_column;
pub use normalize::normalize;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Rows of cells, header row first.
pub type RawGrid = Vec<Vec<CellValue>>;

/// Group key -> records sharing that key, in first-seen order.
pub type GroupedRecords = IndexMap<String, Vec<Record>>;

/// Name of the synthetic row index written into every record.
pub const RECORD_ID_FIELD: &str = "id";

/// One data row keyed by resolved header name.
///
/// The synthetic `id` entry comes first; a column literally named `id`
/// replaces its value but keeps the position.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(IndexMap<String, CellValue>);

impl Record {
    pub fn with_id(index: usize) -> Self {
        let mut fields = IndexMap::new();
        fields.insert(RECORD_ID_FIELD.to_string(), CellValue::Number(index as f64));
        Self(fields)
    }

    pub fn insert(&mut self, name: String, value: CellValue) {
        self.0.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.0.get(name)
    }

    /// Row index, if the `id` entry is still the synthetic one.
    #[cfg(test)]
    pub(crate) fn id(&self) -> Option<usize> {
        match self.0.get(RECORD_ID_FIELD) {
            Some(CellValue::Number(n)) if *n >= 0.0 && n.fract() == 0.0 => Some(*n as usize),
            _ => None,
        }
    }

    #[cfg(test)]
    pub(crate) fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

/// Output of [`normalize`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedSheet {
    pub records: Vec<Record>,
    pub headers: Vec<String>,
}

impl NormalizedSheet {
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }
}
