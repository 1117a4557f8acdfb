//! Row-to-value mappers.
//!
//! A [`Mapper`] turns the current row of a result into one value.
//! [`map_one`](Mapper::map_one) and [`map_all`](Mapper::map_all) drive a
//! forward-only cursor and call [`map`](Mapper::map) once per row.

mod annotation;
mod function;
mod map;
mod property;

pub use annotation::AnnotationMapper;
pub use function::{FnMapper, from_fn};
pub use map::MapMapper;
pub use property::PropertyMapper;

use crate::core::{ColumnDescriptor, Result};
use crate::result::{QueryResult, RowCursor, RowSource};
use std::sync::Arc;

pub trait Mapper<T>: Send + Sync {
    /// Builds one value from the current row.
    fn map(&self, row: &dyn RowSource, columns: &ColumnDescriptor) -> Result<T>;

    /// Advances the cursor once and maps that row, or returns `None` when the
    /// cursor is exhausted.
    fn map_one<C: RowCursor>(&self, cursor: &mut C) -> Result<Option<T>>
    where
        Self: Sized,
    {
        if !cursor.advance()? {
            return Ok(None);
        }
        self.map(&*cursor, cursor.columns()).map(Some)
    }

    /// Maps every remaining row in order. The cursor is left exhausted.
    fn map_all<C: RowCursor>(&self, cursor: &mut C) -> Result<Vec<T>>
    where
        Self: Sized,
    {
        let mut out = Vec::new();
        while cursor.advance()? {
            out.push(self.map(&*cursor, cursor.columns())?);
        }
        Ok(out)
    }

    /// Maps every row of a materialized result.
    fn map_result(&self, result: &QueryResult) -> Result<Vec<T>>
    where
        Self: Sized,
    {
        self.map_all(&mut result.cursor())
    }
}

impl<T, M> Mapper<T> for Arc<M>
where
    M: Mapper<T> + ?Sized,
{
    fn map(&self, row: &dyn RowSource, columns: &ColumnDescriptor) -> Result<T> {
        (**self).map(row, columns)
    }
}

impl<T, M> Mapper<T> for &M
where
    M: Mapper<T> + ?Sized,
{
    fn map(&self, row: &dyn RowSource, columns: &ColumnDescriptor) -> Result<T> {
        (**self).map(row, columns)
    }
}
