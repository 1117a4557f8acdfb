use crate::core::{ColumnDescriptor, MapError, Result, Value};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::cell::Cell;

/// Column access on the current row of a forward-only result.
///
/// Only [`get_value`](RowSource::get_value) and [`was_null`](RowSource::was_null)
/// are required. The typed getters coerce the native value the way a driver's
/// typed accessors do: numeric and boolean reads yield zero/`false` for SQL
/// NULL, everything else yields `None`. Every getter updates the "last read was
/// NULL" flag through `get_value`.
pub trait RowSource {
    fn column_count(&self) -> usize;

    /// Native value at `ordinal` (0-based), with no coercion.
    fn get_value(&self, ordinal: usize) -> Result<Value>;

    /// Whether the last value read from this row was SQL NULL.
    fn was_null(&self) -> bool;

    fn get_string(&self, ordinal: usize) -> Result<Option<String>> {
        Ok(self.get_value(ordinal)?.to_text())
    }

    fn get_bool(&self, ordinal: usize) -> Result<bool> {
        let value = self.get_value(ordinal)?;
        if value.is_null() {
            return Ok(false);
        }
        value
            .to_bool()
            .ok_or_else(|| mismatch(ordinal, &value, "BOOLEAN"))
    }

    fn get_i8(&self, ordinal: usize) -> Result<i8> {
        narrow(ordinal, self.get_i64(ordinal)?, "TINYINT")
    }

    fn get_i16(&self, ordinal: usize) -> Result<i16> {
        narrow(ordinal, self.get_i64(ordinal)?, "SMALLINT")
    }

    fn get_i32(&self, ordinal: usize) -> Result<i32> {
        narrow(ordinal, self.get_i64(ordinal)?, "INTEGER")
    }

    fn get_i64(&self, ordinal: usize) -> Result<i64> {
        let value = self.get_value(ordinal)?;
        if value.is_null() {
            return Ok(0);
        }
        value
            .to_i64()
            .ok_or_else(|| mismatch(ordinal, &value, "BIGINT"))
    }

    fn get_f32(&self, ordinal: usize) -> Result<f32> {
        Ok(self.get_f64(ordinal)? as f32)
    }

    fn get_f64(&self, ordinal: usize) -> Result<f64> {
        let value = self.get_value(ordinal)?;
        if value.is_null() {
            return Ok(0.0);
        }
        value
            .to_f64()
            .ok_or_else(|| mismatch(ordinal, &value, "DOUBLE"))
    }

    fn get_date(&self, ordinal: usize) -> Result<Option<NaiveDate>> {
        let value = self.get_value(ordinal)?;
        if value.is_null() {
            return Ok(None);
        }
        value
            .to_date()
            .map(Some)
            .ok_or_else(|| mismatch(ordinal, &value, "DATE"))
    }

    fn get_time(&self, ordinal: usize) -> Result<Option<NaiveTime>> {
        let value = self.get_value(ordinal)?;
        if value.is_null() {
            return Ok(None);
        }
        value
            .to_time()
            .map(Some)
            .ok_or_else(|| mismatch(ordinal, &value, "TIME"))
    }

    fn get_timestamp(&self, ordinal: usize) -> Result<Option<NaiveDateTime>> {
        let value = self.get_value(ordinal)?;
        if value.is_null() {
            return Ok(None);
        }
        value
            .to_timestamp()
            .map(Some)
            .ok_or_else(|| mismatch(ordinal, &value, "TIMESTAMP"))
    }
}

/// A row source that can move forward through a result, one row at a time.
pub trait RowCursor: RowSource {
    fn columns(&self) -> &ColumnDescriptor;

    /// Moves to the next row. Returns `false` once the result is exhausted.
    fn advance(&mut self) -> Result<bool>;
}

pub(crate) fn mismatch(ordinal: usize, value: &Value, target: &str) -> MapError {
    MapError::conversion(
        ordinal,
        format!("cannot read {} '{}' as {}", value.type_name(), value, target),
    )
}

fn narrow<T: TryFrom<i64>>(ordinal: usize, value: i64, target: &str) -> Result<T> {
    T::try_from(value)
        .map_err(|_| MapError::conversion(ordinal, format!("{} is out of range for {}", value, target)))
}

/// A single row held as a slice of values.
pub struct ValueRow<'a> {
    values: &'a [Value],
    last_null: Cell<bool>,
}

impl<'a> ValueRow<'a> {
    pub fn new(values: &'a [Value]) -> Self {
        Self {
            values,
            last_null: Cell::new(false),
        }
    }
}

impl RowSource for ValueRow<'_> {
    fn column_count(&self) -> usize {
        self.values.len()
    }

    fn get_value(&self, ordinal: usize) -> Result<Value> {
        let value = self
            .values
            .get(ordinal)
            .ok_or(MapError::ColumnOutOfRange {
                ordinal,
                count: self.values.len(),
            })?;
        self.last_null.set(value.is_null());
        Ok(value.clone())
    }

    fn was_null(&self) -> bool {
        self.last_null.get()
    }
}
