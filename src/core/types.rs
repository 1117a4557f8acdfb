use super::Value;
use serde::{Deserialize, Serialize};

pub type Row = Vec<Value>;

/// One result column: the label the query produced and its 0-based ordinal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub label: String,
    pub ordinal: usize,
}

impl Column {
    pub fn new(label: impl Into<String>, ordinal: usize) -> Self {
        Self {
            label: label.into(),
            ordinal,
        }
    }
}

/// Ordered column labels of a single query result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    columns: Vec<Column>,
}

impl ColumnDescriptor {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Builds a descriptor whose ordinals follow label order.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = labels
            .into_iter()
            .enumerate()
            .map(|(ordinal, label)| Column::new(label, ordinal))
            .collect();
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    pub fn find_ordinal(&self, label: &str) -> Option<usize> {
        self.columns
            .iter()
            .find(|col| col.label.eq_ignore_ascii_case(label))
            .map(|col| col.ordinal)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<'a> IntoIterator for &'a ColumnDescriptor {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
