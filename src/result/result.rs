use super::source::{RowCursor, RowSource};
use crate::core::{ColumnDescriptor, MapError, Result, Row, Value};
use std::cell::Cell;

/// A fully materialized query result: column labels plus rows.
#[derive(Debug, Clone)]
pub struct QueryResult {
    columns: ColumnDescriptor,
    rows: Vec<Row>,
}

impl QueryResult {
    pub fn empty() -> Self {
        Self {
            columns: ColumnDescriptor::default(),
            rows: Vec::new(),
        }
    }

    pub fn new(columns: ColumnDescriptor, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn from_labels<I, S>(labels: I, rows: Vec<Row>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(ColumnDescriptor::from_labels(labels), rows)
    }

    pub fn columns(&self) -> &ColumnDescriptor {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Forward-only cursor positioned before the first row.
    pub fn cursor(&self) -> ResultCursor<'_> {
        ResultCursor::new(self)
    }
}

/// Forward-only cursor over a [`QueryResult`].
pub struct ResultCursor<'a> {
    result: &'a QueryResult,
    position: Option<usize>,
    last_null: Cell<bool>,
}

impl<'a> ResultCursor<'a> {
    pub fn new(result: &'a QueryResult) -> Self {
        Self {
            result,
            position: None,
            last_null: Cell::new(false),
        }
    }

    fn current(&self) -> Result<&'a Row> {
        self.position
            .and_then(|pos| self.result.rows.get(pos))
            .ok_or_else(|| MapError::conversion(0, "cursor is not positioned on a row"))
    }
}

impl RowSource for ResultCursor<'_> {
    fn column_count(&self) -> usize {
        self.result.columns.column_count()
    }

    fn get_value(&self, ordinal: usize) -> Result<Value> {
        let row = self.current()?;
        let value = row.get(ordinal).ok_or(MapError::ColumnOutOfRange {
            ordinal,
            count: row.len(),
        })?;
        self.last_null.set(value.is_null());
        Ok(value.clone())
    }

    fn was_null(&self) -> bool {
        self.last_null.get()
    }
}

impl RowCursor for ResultCursor<'_> {
    fn columns(&self) -> &ColumnDescriptor {
        &self.result.columns
    }

    fn advance(&mut self) -> Result<bool> {
        let next = self.position.map_or(0, |pos| pos + 1);
        if next < self.result.rows.len() {
            self.position = Some(next);
            self.last_null.set(false);
            Ok(true)
        } else {
            // Parked past the end so an exhausted cursor stays exhausted.
            self.position = Some(self.result.rows.len());
            Ok(false)
        }
    }
}
